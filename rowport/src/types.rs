use core::ops::Range;

/// Inclusive range of item indexes to render, overscan included.
///
/// An empty list is represented by the canonical value `{ start: 0, end: -1 }`
/// ([`VisibleRange::EMPTY`]), so that `end - start + 1 == 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub start: i64,
    pub end: i64, // inclusive
}

impl VisibleRange {
    pub const EMPTY: Self = Self { start: 0, end: -1 };

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Number of indexes in the range.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.end - self.start + 1) as usize
    }

    pub fn contains(&self, index: usize) -> bool {
        let i = index as i64;
        i >= self.start && i <= self.end
    }

    /// The range as a half-open `start..end + 1`, suitable for slicing and iteration.
    pub fn indices(&self) -> Range<usize> {
        if self.is_empty() {
            return 0..0;
        }
        self.start.max(0) as usize..(self.end + 1) as usize
    }
}

impl Default for VisibleRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Pixel placement of one row inside the scroll track.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemPosition {
    pub top: f64,
    pub height: f64,
}

impl ItemPosition {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// A row the renderer should instantiate, with its placement.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleItem {
    pub index: usize,
    pub position: ItemPosition,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    #[default]
    Auto,
}
