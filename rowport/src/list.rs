use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::calculator::{self, FixedHeightCalculator, RangeCalculator};
use crate::sanitize;
use crate::{Align, ItemPosition, ListConfig, VisibleItem, VisibleRange};

/// A callback fired from [`VirtualList::flush_frame`] when the rendered range changed.
pub type OnRangeChange = Arc<dyn Fn(VisibleRange) + Send + Sync>;

/// A framework-neutral driver for one fixed-height virtual list.
///
/// This type does not hold any UI objects. Your adapter drives it:
/// - call `on_scroll` / `on_resize` / `set_item_count` as UI events arrive (cheap: they only
///   record the new value and mark the frame dirty);
/// - call `flush_frame` once per display refresh to recompute the range at most once, no matter
///   how many events arrived since the last frame.
///
/// Recomputing with the newest offset is always correct since the calculator is pure, so
/// coalescing never renders a stale range.
#[derive(Clone)]
pub struct VirtualList<C = FixedHeightCalculator> {
    config: ListConfig,
    calculator: C,
    scroll_offset: f64,
    range: VisibleRange,
    dirty: bool,
    on_change: Option<OnRangeChange>,
}

impl VirtualList<FixedHeightCalculator> {
    pub fn new(config: ListConfig) -> Self {
        Self::with_calculator(config, FixedHeightCalculator)
    }
}

impl<C: RangeCalculator> VirtualList<C> {
    /// Creates a list that delegates its arithmetic to `calculator`.
    ///
    /// The initial range (at scroll offset 0) is computed immediately.
    pub fn with_calculator(config: ListConfig, calculator: C) -> Self {
        rdebug!(
            item_count = config.item_count,
            item_height = config.item_height,
            viewport_height = config.viewport_height,
            overscan = config.overscan,
            "VirtualList::new"
        );
        let mut list = Self {
            config,
            calculator,
            scroll_offset: 0.0,
            range: VisibleRange::EMPTY,
            dirty: false,
            on_change: None,
        };
        list.range = list.compute_range();
        list
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn calculator(&self) -> &C {
        &self.calculator
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// The range computed by the last `flush_frame` (or construction).
    pub fn visible_range(&self) -> VisibleRange {
        self.range
    }

    /// Whether an update was recorded since the last flush.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_on_change(&mut self, on_change: Option<impl Fn(VisibleRange) + Send + Sync + 'static>) {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    /// Records a scroll offset reported by the UI.
    pub fn on_scroll(&mut self, scroll_offset: f64) {
        let offset = sanitize::scroll_offset(scroll_offset);
        if offset == self.scroll_offset {
            return;
        }
        rtrace!(offset, "VirtualList::on_scroll");
        self.scroll_offset = offset;
        self.dirty = true;
    }

    /// Records a new viewport height reported by the UI.
    pub fn on_resize(&mut self, viewport_height: f64) {
        if viewport_height.to_bits() == self.config.viewport_height.to_bits() {
            return;
        }
        self.config.viewport_height = viewport_height;
        self.dirty = true;
    }

    pub fn set_item_count(&mut self, item_count: usize) {
        if self.config.item_count == item_count {
            return;
        }
        self.config.item_count = item_count;
        self.dirty = true;
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        if self.config.overscan == overscan {
            return;
        }
        self.config.overscan = overscan;
        self.dirty = true;
    }

    /// Clones the current config, applies `f`, then marks the frame dirty.
    ///
    /// Use this to change several fields at once; the range is still recomputed only on the next
    /// `flush_frame`.
    pub fn update_config(&mut self, f: impl FnOnce(&mut ListConfig)) {
        let mut next = self.config.clone();
        f(&mut next);
        if next != self.config {
            self.config = next;
            self.dirty = true;
        }
    }

    /// Recomputes the range if anything changed since the last call.
    ///
    /// Returns the new range when a recomputation happened, `None` otherwise. The `on_change`
    /// callback fires only when the recomputed range differs from the previous one.
    pub fn flush_frame(&mut self) -> Option<VisibleRange> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        let next = self.compute_range();
        let changed = next != self.range;
        self.range = next;
        if changed {
            rtrace!(start = next.start, end = next.end, "VirtualList range changed");
            if let Some(cb) = &self.on_change {
                cb(next);
            }
        }
        Some(next)
    }

    /// Full scrollable height for sizing the scroll track.
    pub fn total_extent(&self) -> f64 {
        self.calculator
            .total_extent(self.config.item_count as f64, self.config.item_height)
    }

    pub fn item_position(&self, index: usize) -> ItemPosition {
        self.calculator
            .item_position(index as f64, self.config.item_height)
    }

    /// Visits every row of the current range with its placement.
    pub fn for_each_visible_item(&self, mut f: impl FnMut(VisibleItem)) {
        for index in self.range.indices() {
            f(VisibleItem {
                index,
                position: self.item_position(index),
            });
        }
    }

    /// Collects the current rows into `out` (clears `out` first).
    ///
    /// Prefer `for_each_visible_item` with a reused buffer in hot paths.
    pub fn collect_visible_items(&self, out: &mut Vec<VisibleItem>) {
        out.clear();
        out.reserve(self.range.len());
        self.for_each_visible_item(|item| out.push(item));
    }

    /// Scrolls so `index` is in view and returns the applied offset.
    ///
    /// The frame is marked dirty when the offset changes; call `flush_frame` to pick it up.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> f64 {
        let offset = match self.config.item_count.checked_sub(1) {
            None => 0.0,
            Some(last) => {
                let item = self.item_position(index.min(last));
                let view = sanitize::viewport_height(self.config.viewport_height);
                let target = calculator::align_offset(item, align, self.scroll_offset, view);
                sanitize::scroll_offset(target).min(self.max_scroll_offset())
            }
        };
        self.on_scroll(offset);
        self.scroll_offset
    }

    pub fn max_scroll_offset(&self) -> f64 {
        let view = sanitize::viewport_height(self.config.viewport_height);
        (self.total_extent() - view).max(0.0)
    }

    fn compute_range(&self) -> VisibleRange {
        self.calculator.visible_range(
            self.scroll_offset,
            self.config.viewport_height,
            self.config.item_count as f64,
            self.config.item_height,
            self.config.overscan as f64,
        )
    }
}

impl<C: core::fmt::Debug> core::fmt::Debug for VirtualList<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualList")
            .field("config", &self.config)
            .field("calculator", &self.calculator)
            .field("scroll_offset", &self.scroll_offset)
            .field("range", &self.range)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
