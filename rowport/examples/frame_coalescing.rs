// Example: a host frame loop that receives many scroll events per frame but recomputes the
// rendered range at most once per display refresh.
use rowport::{ListConfig, VirtualList, VisibleRange};

fn main() {
    let mut list = VirtualList::new(ListConfig::new(250_000, 24.0, 600.0).with_overscan(5));
    list.set_on_change(Some(|r: VisibleRange| {
        println!("  range changed -> {}..={} ({} rows)", r.start, r.end, r.len());
    }));

    let mut offset = 0.0;
    for frame in 0..8 {
        // Simulate a fling: several wheel events land between two refreshes.
        for _ in 0..4 {
            offset += 37.5;
            list.on_scroll(offset);
        }
        if frame == 5 {
            list.on_resize(900.0);
        }
        match list.flush_frame() {
            Some(r) => println!("frame {frame}: offset={} range={r:?}", list.scroll_offset()),
            None => println!("frame {frame}: idle"),
        }
    }

    println!(
        "track height={} max offset={}",
        list.total_extent(),
        list.max_scroll_offset()
    );
}
