//! Frame-rate, memory and node-count sampling for virtualized list renderers.
//!
//! A [`TelemetrySampler`] runs a cooperative loop on the host's frame scheduler and produces one
//! [`Metrics`] snapshot per tick:
//!
//! - `fps`: ticks observed in the trailing one-second window (a count, not `1 / Δt`)
//! - `memory_usage_mb`: process memory, or `0` without a memory probe
//! - `dom_node_count`: nodes in the observed container, or `0` without one
//! - `render_time_ms`: the last duration measured by the mark pair or recorded out-of-band
//!
//! Host facilities are traits ([`Clock`], [`FrameScheduler`], [`MemoryProbe`],
//! [`NodeContainer`], [`MarkTimer`]); each is probed once and degrades to a safe default when
//! absent. This crate is intentionally framework-agnostic: [`ManualFrameScheduler`] lets any
//! event loop (or a test) drive the ticks explicitly.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod clock;
mod container;
mod error;
mod memory;
mod metrics;
mod sampler;
mod scheduler;
mod timing;

#[cfg(test)]
mod tests;

pub use clock::{Clock, SystemClock};
pub use container::{ContainerHandle, CountFn, NodeContainer, container_fn, weak_container};
pub use error::PlatformError;
pub use memory::{MemoryProbe, NoMemoryProbe, ProcessMemoryProbe};
pub use metrics::{BYTES_PER_MB, Metrics, bytes_to_mb};
pub use sampler::{
    Capabilities, FPS_WINDOW_MS, Observer, SamplerState, StartOutcome, TelemetrySampler,
};
pub use scheduler::{FrameCallback, FrameHandle, FrameScheduler, ManualFrameScheduler};
pub use timing::{MarkTable, MarkTimer, NoMarkTimer};
