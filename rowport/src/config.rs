use crate::defaults::{DEFAULT_ITEM_HEIGHT, DEFAULT_OVERSCAN};

/// Geometry and behavior of one virtual list.
///
/// `viewport_height` has no default and is a constructor argument; the remaining fields fall back
/// to [`crate::DEFAULTS`]. Values are stored as given and sanitized at the point of use, so a
/// transiently invalid reading (e.g. a resize observer reporting `NaN`) never panics.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize` and the optional
/// fields may be omitted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub item_count: usize,
    #[cfg_attr(feature = "serde", serde(default = "default_item_height"))]
    pub item_height: f64,
    pub viewport_height: f64,
    #[cfg_attr(feature = "serde", serde(default = "default_overscan"))]
    pub overscan: usize,
    /// Whether the host should run a telemetry sampler alongside this list.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enable_telemetry: bool,
}

#[cfg(feature = "serde")]
fn default_item_height() -> f64 {
    DEFAULT_ITEM_HEIGHT
}

#[cfg(feature = "serde")]
fn default_overscan() -> usize {
    DEFAULT_OVERSCAN
}

impl ListConfig {
    pub fn new(item_count: usize, item_height: f64, viewport_height: f64) -> Self {
        Self {
            item_count,
            item_height,
            viewport_height,
            overscan: DEFAULT_OVERSCAN,
            enable_telemetry: false,
        }
    }

    /// A list of default-height rows.
    pub fn with_viewport(viewport_height: f64) -> Self {
        Self::new(0, DEFAULT_ITEM_HEIGHT, viewport_height)
    }

    pub fn with_item_count(mut self, item_count: usize) -> Self {
        self.item_count = item_count;
        self
    }

    pub fn with_item_height(mut self, item_height: f64) -> Self {
        self.item_height = item_height;
        self
    }

    pub fn with_viewport_height(mut self, viewport_height: f64) -> Self {
        self.viewport_height = viewport_height;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_enable_telemetry(mut self, enable_telemetry: bool) -> Self {
        self.enable_telemetry = enable_telemetry;
        self
    }
}
