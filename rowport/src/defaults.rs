/// Process-wide defaults and sanity ceilings used when sanitizing caller input.
///
/// [`DEFAULTS`] is the single immutable instance read by every calculator operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Defaults {
    /// Fallback row height in pixels for non-finite or non-positive heights.
    pub item_height: f64,
    pub overscan: usize,
    pub max_item_count: f64,
    /// Ceiling for scroll offsets and viewport heights, in pixels.
    pub max_offset: f64,
    pub max_item_height: f64,
    pub max_overscan: f64,
}

impl Defaults {
    pub const STANDARD: Self = Self {
        item_height: 50.0,
        overscan: 3,
        max_item_count: 1e9,
        max_offset: 1e12,
        max_item_height: 1e6,
        max_overscan: 1e6,
    };
}

impl Default for Defaults {
    fn default() -> Self {
        Self::STANDARD
    }
}

pub static DEFAULTS: Defaults = Defaults::STANDARD;

pub const DEFAULT_ITEM_HEIGHT: f64 = Defaults::STANDARD.item_height;
pub const DEFAULT_OVERSCAN: usize = Defaults::STANDARD.overscan;
