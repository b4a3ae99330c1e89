//! Headless range and position arithmetic for fixed-height virtual lists.
//!
//! Given a scroll offset and the list geometry, this crate answers three questions every frame:
//! which rows must exist in the render tree (an overscanned, inclusive index range), where each
//! of those rows sits, and how tall the scroll track must be. The answer never depends on more
//! than a bounded number of rows, so lists of 100,000+ items render with a roughly constant
//! node count.
//!
//! All calculator operations are total: NaN, infinite, negative and oversized inputs are
//! sanitized per argument (see [`sanitize`]) and a well-formed value is always returned.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - viewport height
//! - scroll offset
//! - item count and the (uniform) item height
//!
//! For frame-rate/memory/node-count sampling, see the `rowport-telemetry` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod calculator;
mod config;
mod defaults;
mod list;
pub mod sanitize;
mod types;


pub use calculator::{
    FixedHeightCalculator, RangeCalculator, clamp_scroll_offset, compute_item_position,
    compute_total_extent, compute_visible_range, for_each_visible_item, index_at_offset,
    max_scroll_offset, scroll_to_index_offset,
};
pub use config::ListConfig;
pub use defaults::{DEFAULT_ITEM_HEIGHT, DEFAULT_OVERSCAN, DEFAULTS, Defaults};
pub use list::{OnRangeChange, VirtualList};
pub use sanitize::effective_item_height;
pub use types::{Align, ItemPosition, VisibleItem, VisibleRange};
