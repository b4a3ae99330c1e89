// Example: a host loop that renders a virtual list and samples telemetry alongside it.
//
// The host owns both pieces; they never talk to each other directly:
// - `VirtualList` decides which rows exist in the "render tree" each frame
// - `TelemetrySampler` counts those nodes, frames and render time
use std::cell::Cell;
use std::rc::Rc;

use rowport::{ListConfig, VirtualList};
use rowport_telemetry::{
    ManualFrameScheduler, Metrics, NodeContainer, SystemClock, TelemetrySampler, weak_container,
};

/// Stand-in for a rendered subtree: one container node plus one node per row.
struct RenderedRows(Cell<usize>);

impl NodeContainer for RenderedRows {
    fn node_count(&self) -> Option<usize> {
        Some(1 + self.0.get())
    }
}

fn main() {
    let config = ListConfig::new(100_000, 32.0, 720.0).with_enable_telemetry(true);
    let mut list = VirtualList::new(config);

    let scheduler = Rc::new(ManualFrameScheduler::new());
    let sampler = TelemetrySampler::new(Rc::new(SystemClock::new()), scheduler.clone());
    let rows = Rc::new(RenderedRows(Cell::new(list.visible_range().len())));

    if list.config().enable_telemetry {
        sampler.start(
            |m: Metrics| {
                println!(
                    "  fps={:>3} mem={:>7.2}MB nodes={:>3} render={:.3}ms",
                    m.fps, m.memory_usage_mb, m.dom_node_count, m.render_time_ms
                );
            },
            Some(weak_container(&rows)),
        );
    }

    let frame_ms = 1000.0 / 60.0;
    for frame in 0..12u32 {
        // Scroll handler: many events per refresh, one recompute per refresh.
        for _ in 0..3 {
            list.on_scroll(list.scroll_offset() + 420.0);
        }

        sampler.mark_render_start("rows");
        if let Some(range) = list.flush_frame() {
            let mut built = 0;
            list.for_each_visible_item(|_item| built += 1);
            rows.0.set(built);
            println!("frame {frame}: rows {}..={} ({built} built)", range.start, range.end);
        }
        sampler.mark_render_end("rows");

        scheduler.run_frame(f64::from(frame) * frame_ms);
    }

    sampler.stop();
    println!("final snapshot: {:?}", sampler.snapshot());
    println!("list of {} rows, track height {}px", list.config().item_count, list.total_extent());
}
