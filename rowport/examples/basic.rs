// Example: minimal usage of the pure calculator functions.
use rowport::{
    Align, compute_item_position, compute_total_extent, compute_visible_range,
    for_each_visible_item, scroll_to_index_offset,
};

fn main() {
    let count = 100_000.0;
    let row = 32.0;
    let viewport = 720.0;

    let range = compute_visible_range(123_456.0, viewport, count, row, 3.0);
    println!("total_extent={}", compute_total_extent(count, row));
    println!("range={range:?} rendered={}", range.len());
    println!("first={:?}", compute_item_position(range.start as f64, row));

    let mut rows = Vec::new();
    for_each_visible_item(range, row, |it| rows.push(it.index));
    println!("indexes={rows:?}");

    let off = scroll_to_index_offset(99_999.0, Align::End, 123_456.0, viewport, count, row);
    println!("after scroll_to_index: offset={off}");
}
