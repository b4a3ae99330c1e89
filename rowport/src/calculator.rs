use crate::sanitize;
use crate::{Align, ItemPosition, VisibleItem, VisibleRange};

/// Computes the inclusive range of item indexes to render for a scroll position.
///
/// Every argument is sanitized independently (see [`crate::sanitize`]), so this never panics and
/// always returns a well-formed range:
/// - an empty list yields [`VisibleRange::EMPTY`];
/// - otherwise `0 <= start <= end <= item_count - 1`.
///
/// `overscan` extra items are added symmetrically before the first and after the last visible
/// item, then clamped to the list bounds.
pub fn compute_visible_range(
    scroll_offset: f64,
    viewport_height: f64,
    item_count: f64,
    item_height: f64,
    overscan: f64,
) -> VisibleRange {
    let count = sanitize::item_count(item_count) as i64;
    if count == 0 {
        return VisibleRange::EMPTY;
    }
    let offset = sanitize::scroll_offset(scroll_offset);
    let viewport = sanitize::viewport_height(viewport_height);
    let height = sanitize::effective_item_height(item_height);
    let overscan = sanitize::overscan(overscan) as i64;

    let first_visible = (offset / height) as i64;
    let last_visible = ((offset + viewport) / height) as i64;

    let end = last_visible.saturating_add(overscan).min(count - 1);
    // An offset past the end of the list would otherwise leave `start > end`.
    let start = first_visible.saturating_sub(overscan).max(0).min(end);

    rtrace!(
        offset,
        viewport,
        count,
        height,
        first_visible,
        last_visible,
        start,
        end,
        "compute_visible_range"
    );
    VisibleRange { start, end }
}

/// Computes where the row at `index` sits in the scroll track.
///
/// Negative or non-finite indexes resolve to `0`.
pub fn compute_item_position(index: f64, item_height: f64) -> ItemPosition {
    let index = sanitize::index(index);
    let height = sanitize::effective_item_height(item_height);
    ItemPosition {
        top: index * height,
        height,
    }
}

/// Computes the full scrollable height, `item_count * effective_height`.
pub fn compute_total_extent(item_count: f64, item_height: f64) -> f64 {
    sanitize::item_count(item_count) * sanitize::effective_item_height(item_height)
}

/// Returns the index of the row under `offset`, or `None` for an empty list.
///
/// Offsets past the end map to the last row.
pub fn index_at_offset(offset: f64, item_count: f64, item_height: f64) -> Option<usize> {
    let count = sanitize::item_count(item_count);
    if count == 0.0 {
        return None;
    }
    let offset = sanitize::scroll_offset(offset);
    let height = sanitize::effective_item_height(item_height);
    let index = sanitize::index(offset / height).min(count - 1.0);
    Some(index as usize)
}

/// The largest scroll offset that still keeps the viewport inside the track.
pub fn max_scroll_offset(item_count: f64, item_height: f64, viewport_height: f64) -> f64 {
    let total = compute_total_extent(item_count, item_height);
    (total - sanitize::viewport_height(viewport_height)).max(0.0)
}

pub fn clamp_scroll_offset(
    offset: f64,
    item_count: f64,
    item_height: f64,
    viewport_height: f64,
) -> f64 {
    sanitize::scroll_offset(offset).min(max_scroll_offset(
        item_count,
        item_height,
        viewport_height,
    ))
}

/// Computes the (clamped) scroll offset that brings `index` into view with the given alignment.
///
/// `Align::Auto` keeps `current_offset` when the row is already fully visible, otherwise scrolls
/// the minimal distance (row at the top when it is above the viewport, at the bottom when
/// below).
pub fn scroll_to_index_offset(
    index: f64,
    align: Align,
    current_offset: f64,
    viewport_height: f64,
    item_count: f64,
    item_height: f64,
) -> f64 {
    let count = sanitize::item_count(item_count);
    if count == 0.0 {
        return 0.0;
    }
    let index = sanitize::index(index).min(count - 1.0);
    let item = compute_item_position(index, item_height);
    let view = sanitize::viewport_height(viewport_height);
    let target = align_offset(item, align, current_offset, view);
    clamp_scroll_offset(target, count, item_height, view)
}

/// Unclamped offset that places `item` in a viewport of height `view` per `align`.
pub(crate) fn align_offset(
    item: ItemPosition,
    align: Align,
    current_offset: f64,
    view: f64,
) -> f64 {
    match align {
        Align::Start => item.top,
        Align::End => item.bottom() - view,
        Align::Center => item.top + item.height / 2.0 - view / 2.0,
        Align::Auto => {
            let cur = sanitize::scroll_offset(current_offset);
            if item.top >= cur && item.bottom() <= cur + view {
                cur
            } else if item.top < cur {
                item.top
            } else {
                item.bottom() - view
            }
        }
    }
}

/// Visits every row of `range` with its placement, in ascending index order.
pub fn for_each_visible_item(range: VisibleRange, item_height: f64, mut f: impl FnMut(VisibleItem)) {
    let height = sanitize::effective_item_height(item_height);
    for index in range.indices() {
        f(VisibleItem {
            index,
            position: ItemPosition {
                top: index as f64 * height,
                height,
            },
        });
    }
}

/// The three range/position operations as a swappable capability.
///
/// Consumers that hold a calculator (e.g. [`crate::VirtualList`]) are generic over this trait so
/// tests or hosts can substitute their own arithmetic. The provided methods delegate to the free
/// functions in this module.
pub trait RangeCalculator {
    fn visible_range(
        &self,
        scroll_offset: f64,
        viewport_height: f64,
        item_count: f64,
        item_height: f64,
        overscan: f64,
    ) -> VisibleRange {
        compute_visible_range(
            scroll_offset,
            viewport_height,
            item_count,
            item_height,
            overscan,
        )
    }

    fn item_position(&self, index: f64, item_height: f64) -> ItemPosition {
        compute_item_position(index, item_height)
    }

    fn total_extent(&self, item_count: f64, item_height: f64) -> f64 {
        compute_total_extent(item_count, item_height)
    }
}

/// The default calculator: uniform row height, arithmetic only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedHeightCalculator;

impl RangeCalculator for FixedHeightCalculator {}

impl<C: RangeCalculator + ?Sized> RangeCalculator for &C {
    fn visible_range(
        &self,
        scroll_offset: f64,
        viewport_height: f64,
        item_count: f64,
        item_height: f64,
        overscan: f64,
    ) -> VisibleRange {
        (**self).visible_range(
            scroll_offset,
            viewport_height,
            item_count,
            item_height,
            overscan,
        )
    }

    fn item_position(&self, index: f64, item_height: f64) -> ItemPosition {
        (**self).item_position(index, item_height)
    }

    fn total_extent(&self, item_count: f64, item_height: f64) -> f64 {
        (**self).total_extent(item_count, item_height)
    }
}
