pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One complete set of measurements delivered to an observer.
///
/// Every field is finite and non-negative. `memory_usage_mb` and `dom_node_count` are `0` when
/// the host cannot measure them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Metrics {
    /// Ticks observed within the trailing one-second window.
    pub fps: f64,
    #[cfg_attr(feature = "serde", serde(rename = "memoryUsageMB"))]
    pub memory_usage_mb: f64,
    /// Nodes in the observed container, the container itself included.
    pub dom_node_count: u64,
    /// Duration of the most recent measured render.
    pub render_time_ms: f64,
}

impl Metrics {
    pub const ZERO: Self = Self {
        fps: 0.0,
        memory_usage_mb: 0.0,
        dom_node_count: 0,
        render_time_ms: 0.0,
    };

    /// Replaces any non-finite or negative float with `0`.
    pub fn sanitized(self) -> Self {
        Self {
            fps: finite_or_zero(self.fps),
            memory_usage_mb: finite_or_zero(self.memory_usage_mb),
            dom_node_count: self.dom_node_count,
            render_time_ms: finite_or_zero(self.render_time_ms),
        }
    }
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() && v > 0.0 { v } else { 0.0 }
}
