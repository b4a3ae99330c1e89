use crate::*;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct FakeClock(Cell<f64>);

impl FakeClock {
    fn set(&self, now_ms: f64) {
        self.0.set(now_ms);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> f64 {
        self.0.get()
    }
}

struct FixedMemory(u64);

impl MemoryProbe for FixedMemory {
    fn used_bytes(&self) -> Result<u64, PlatformError> {
        Ok(self.0)
    }
}

/// Answers the start-up probe, then fails every later reading.
struct FlakyMemory(Cell<usize>);

impl MemoryProbe for FlakyMemory {
    fn used_bytes(&self) -> Result<u64, PlatformError> {
        let calls = self.0.get();
        self.0.set(calls + 1);
        if calls == 0 {
            Ok(1 << 20)
        } else {
            Err(PlatformError::Unsupported)
        }
    }
}

struct Tree(usize);

impl NodeContainer for Tree {
    fn node_count(&self) -> Option<usize> {
        Some(self.0)
    }
}

fn harness() -> (Rc<FakeClock>, Rc<ManualFrameScheduler>, TelemetrySampler) {
    let clock = Rc::new(FakeClock::default());
    let scheduler = Rc::new(ManualFrameScheduler::new());
    let sampler =
        TelemetrySampler::new(clock.clone(), scheduler.clone()).with_memory_probe(NoMemoryProbe);
    (clock, scheduler, sampler)
}

fn recorder() -> (Rc<RefCell<Vec<Metrics>>>, impl FnMut(Metrics) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, move |m: Metrics| sink.borrow_mut().push(m))
}

#[test]
fn snapshot_is_zero_before_start() {
    let (_clock, scheduler, sampler) = harness();
    assert_eq!(sampler.state(), SamplerState::Idle);
    assert_eq!(sampler.snapshot(), Metrics::ZERO);
    assert_eq!(scheduler.pending_len(), 0);
    assert_eq!(sampler.monitoring_since_ms(), None);
}

#[test]
fn start_delivers_one_snapshot_per_tick() {
    let (clock, scheduler, sampler) = harness();
    clock.set(5.0);
    let (seen, observer) = recorder();

    assert_eq!(sampler.start(observer, None), StartOutcome::Started);
    assert!(sampler.is_monitoring());
    assert_eq!(sampler.monitoring_since_ms(), Some(5.0));
    assert_eq!(scheduler.pending_len(), 1);

    scheduler.run_frame(16.0);
    scheduler.run_frame(32.0);
    assert_eq!(scheduler.pending_len(), 1);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].fps, 1.0);
    assert_eq!(seen[1].fps, 2.0);
    assert_eq!(sampler.snapshot(), seen[1]);
}

#[test]
fn fps_counts_ticks_in_the_trailing_window() {
    let (_clock, scheduler, sampler) = harness();
    sampler.start(|_| {}, None);

    for i in 0..=10 {
        scheduler.run_frame(i as f64 * 100.0);
    }
    // 0, 100, ..., 1000: the tick exactly one window old is still counted.
    assert_eq!(sampler.snapshot().fps, 11.0);

    for i in 11..=15 {
        scheduler.run_frame(i as f64 * 100.0);
    }
    // 500..=1500
    assert_eq!(sampler.snapshot().fps, 11.0);

    // Irregular spacing: a long stall empties the window down to the current tick.
    scheduler.run_frame(5_000.0);
    assert_eq!(sampler.snapshot().fps, 1.0);
    scheduler.run_frame(5_001.0);
    scheduler.run_frame(5_003.0);
    assert_eq!(sampler.snapshot().fps, 3.0);
}

#[test]
fn non_finite_tick_is_skipped() {
    let (_clock, scheduler, sampler) = harness();
    let (seen, observer) = recorder();
    sampler.start(observer, None);

    scheduler.run_frame(0.0);
    scheduler.run_frame(f64::NAN);
    scheduler.run_frame(f64::INFINITY);
    // Nothing delivered for the bad ticks, but the sampler keeps rescheduling.
    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(scheduler.pending_len(), 1);
    assert_eq!(sampler.snapshot().fps, 1.0);

    for i in 1..=600 {
        scheduler.run_frame(i as f64 * 16.0);
    }
    // 1000ms / 16ms: at most 63 ticks fall inside one window.
    assert!(sampler.snapshot().fps <= 63.0, "fps = {}", sampler.snapshot().fps);
    assert!(sampler.snapshot().fps >= 62.0);
}

#[test]
fn ticks_from_before_a_clock_reset_leave_the_window() {
    let (_clock, scheduler, sampler) = harness();
    sampler.start(|_| {}, None);

    scheduler.run_frame(1_000_000.0);
    for i in 0..300 {
        scheduler.run_frame(i as f64 * 16.0);
    }
    let fps = sampler.snapshot().fps;
    assert!(fps <= 63.0, "fps = {fps}");
    assert!(fps >= 62.0, "fps = {fps}");

    // A step backwards drops every later timestamp: 0, 16, ..., 96 survive with the new tick.
    scheduler.run_frame(100.0);
    assert_eq!(sampler.snapshot().fps, 8.0);
}

#[test]
fn no_observer_calls_after_stop() {
    let (_clock, scheduler, sampler) = harness();
    let (seen, observer) = recorder();
    sampler.start(observer, None);
    for t in [0.0, 16.0, 32.0] {
        scheduler.run_frame(t);
    }
    assert_eq!(seen.borrow().len(), 3);

    sampler.stop();
    assert_eq!(sampler.state(), SamplerState::Idle);
    assert_eq!(scheduler.pending_len(), 0);

    for t in [48.0, 64.0, 80.0, 96.0, 112.0] {
        scheduler.run_frame(t);
    }
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn stop_is_idempotent() {
    let (_clock, scheduler, sampler) = harness();
    sampler.stop();
    sampler.stop();
    assert_eq!(sampler.state(), SamplerState::Idle);

    sampler.start(|_| {}, None);
    sampler.stop();
    sampler.stop();
    assert_eq!(sampler.state(), SamplerState::Idle);
    assert_eq!(scheduler.pending_len(), 0);
}

#[test]
fn second_start_is_a_no_op() {
    let (_clock, scheduler, sampler) = harness();
    let (first, a) = recorder();
    let (second, b) = recorder();
    let container_calls = Rc::new(Cell::new(0usize));
    let calls = Rc::clone(&container_calls);

    assert_eq!(sampler.start(a, None), StartOutcome::Started);
    assert_eq!(
        sampler.start(
            b,
            Some(container_fn(move || {
                calls.set(calls.get() + 1);
                Some(1)
            }))
        ),
        StartOutcome::AlreadyMonitoring
    );
    // Still a single loop.
    assert_eq!(scheduler.pending_len(), 1);

    scheduler.run_frame(0.0);
    scheduler.run_frame(16.0);
    assert_eq!(first.borrow().len(), 2);
    assert!(second.borrow().is_empty());
    assert_eq!(container_calls.get(), 0);
    assert_eq!(sampler.snapshot().fps, 2.0);
    assert_eq!(sampler.snapshot().dom_node_count, 0);
}

#[test]
fn observer_may_stop_the_sampler_from_its_callback() {
    let clock = Rc::new(FakeClock::default());
    let scheduler = Rc::new(ManualFrameScheduler::new());
    let sampler = Rc::new(
        TelemetrySampler::new(clock.clone(), scheduler.clone()).with_memory_probe(NoMemoryProbe),
    );
    let calls = Rc::new(Cell::new(0usize));

    let weak = Rc::downgrade(&sampler);
    let counter = Rc::clone(&calls);
    sampler.start(
        move |m| {
            counter.set(counter.get() + 1);
            if m.fps >= 2.0 {
                if let Some(s) = weak.upgrade() {
                    s.stop();
                }
            }
        },
        None,
    );

    for t in [0.0, 16.0, 32.0, 48.0] {
        scheduler.run_frame(t);
    }
    assert_eq!(calls.get(), 2);
    assert!(!sampler.is_monitoring());
    assert_eq!(scheduler.pending_len(), 0);
}

#[test]
fn a_tick_already_dequeued_is_inert_after_stop() {
    let clock = Rc::new(FakeClock::default());
    let scheduler = Rc::new(ManualFrameScheduler::new());
    let first = TelemetrySampler::new(clock.clone(), scheduler.clone())
        .with_memory_probe(NoMemoryProbe);
    let second = Rc::new(
        TelemetrySampler::new(clock.clone(), scheduler.clone()).with_memory_probe(NoMemoryProbe),
    );

    let target = Rc::downgrade(&second);
    first.start(
        move |_| {
            if let Some(s) = target.upgrade() {
                s.stop();
            }
        },
        None,
    );
    let (seen, observer) = recorder();
    second.start(observer, None);

    // Both ticks are dequeued together; the first stops the second before it runs.
    assert_eq!(scheduler.run_frame(0.0), 2);
    assert!(seen.borrow().is_empty());
    assert!(!second.is_monitoring());
    assert!(first.is_monitoring());
    assert_eq!(scheduler.pending_len(), 1);
}

#[test]
fn restart_uses_the_new_observer_and_a_fresh_window() {
    let (clock, scheduler, sampler) = harness();
    let (a_seen, a) = recorder();
    sampler.start(a, None);
    for t in [0.0, 16.0, 32.0] {
        scheduler.run_frame(t);
    }
    sampler.stop();
    // The last snapshot survives the stop.
    assert_eq!(sampler.snapshot().fps, 3.0);

    clock.set(40.0);
    let (b_seen, b) = recorder();
    assert_eq!(sampler.start(b, None), StartOutcome::Started);
    assert_eq!(sampler.monitoring_since_ms(), Some(40.0));
    scheduler.run_frame(48.0);

    assert_eq!(a_seen.borrow().len(), 3);
    assert_eq!(b_seen.borrow().len(), 1);
    assert_eq!(b_seen.borrow()[0].fps, 1.0);
}

#[test]
fn memory_is_reported_in_megabytes() {
    let (_clock, scheduler, sampler) = harness();
    let sampler = sampler.with_memory_probe(FixedMemory(3 * 1024 * 1024));
    sampler.start(|_| {}, None);
    assert!(sampler.capabilities().memory);
    scheduler.run_frame(0.0);
    assert_eq!(sampler.snapshot().memory_usage_mb, 3.0);
}

#[test]
fn missing_memory_facility_reports_zero() {
    let (_clock, scheduler, sampler) = harness();
    sampler.start(|_| {}, None);
    assert!(!sampler.capabilities().memory);
    scheduler.run_frame(0.0);
    assert_eq!(sampler.snapshot().memory_usage_mb, 0.0);
    assert_eq!(sampler.snapshot().fps, 1.0);
}

#[test]
fn memory_failure_mid_session_degrades_that_sample_only() {
    let (_clock, scheduler, sampler) = harness();
    let sampler = sampler.with_memory_probe(FlakyMemory(Cell::new(0)));
    let (seen, observer) = recorder();
    sampler.start(observer, None);
    assert!(sampler.capabilities().memory);

    scheduler.run_frame(0.0);
    scheduler.run_frame(16.0);
    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|m| m.memory_usage_mb == 0.0));
    assert_eq!(seen[1].fps, 2.0);
}

#[test]
fn node_count_comes_from_the_container() {
    let (_clock, scheduler, sampler) = harness();
    sampler.start(|_| {}, Some(container_fn(|| Some(42))));
    scheduler.run_frame(0.0);
    assert_eq!(sampler.snapshot().dom_node_count, 42);
    sampler.stop();

    sampler.start(|_| {}, None);
    scheduler.run_frame(16.0);
    assert_eq!(sampler.snapshot().dom_node_count, 0);
}

#[test]
fn invalidated_container_reports_zero() {
    let (_clock, scheduler, sampler) = harness();
    let tree = Rc::new(Tree(120));
    sampler.start(|_| {}, Some(weak_container(&tree)));

    scheduler.run_frame(0.0);
    assert_eq!(sampler.snapshot().dom_node_count, 120);

    drop(tree);
    scheduler.run_frame(16.0);
    assert_eq!(sampler.snapshot().dom_node_count, 0);
    assert!(sampler.is_monitoring());

    sampler.stop();
    sampler.start(|_| {}, Some(container_fn(|| None)));
    scheduler.run_frame(32.0);
    assert_eq!(sampler.snapshot().dom_node_count, 0);
}

#[test]
fn stop_releases_observer_and_container() {
    let (_clock, scheduler, sampler) = harness();
    let tree = Rc::new(Tree(7));
    let token = Rc::new(());
    let held = Rc::clone(&token);

    sampler.start(
        move |_| {
            let _token = &held;
        },
        Some(tree.clone()),
    );
    scheduler.run_frame(0.0);
    assert_eq!(Rc::strong_count(&tree), 2);
    assert_eq!(Rc::strong_count(&token), 2);

    sampler.stop();
    assert_eq!(Rc::strong_count(&tree), 1);
    assert_eq!(Rc::strong_count(&token), 1);
}

#[test]
fn dropping_the_sampler_cancels_its_tick() {
    let (_clock, scheduler, sampler) = harness();
    let (seen, observer) = recorder();
    sampler.start(observer, None);
    scheduler.run_frame(0.0);
    drop(sampler);

    assert_eq!(scheduler.pending_len(), 0);
    scheduler.run_frame(16.0);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn observers_receive_copies() {
    let (_clock, scheduler, sampler) = harness();
    let (seen, observer) = recorder();
    sampler.start(observer, None);

    scheduler.run_frame(0.0);
    // Tampering with a delivered snapshot must not reach the sampler or later deliveries.
    seen.borrow_mut()[0].fps = 999.0;
    seen.borrow_mut()[0].dom_node_count = 999;

    scheduler.run_frame(16.0);
    let seen = seen.borrow();
    assert_eq!(seen[0].fps, 999.0);
    assert_eq!(seen[1].fps, 2.0);
    assert_eq!(seen[1].dom_node_count, 0);
    assert_eq!(sampler.snapshot().fps, 2.0);
    assert_eq!(sampler.snapshot().dom_node_count, 0);
}

#[test]
fn render_marks_measure_duration() {
    let (clock, scheduler, sampler) = harness();
    assert!(sampler.capabilities().timing);

    clock.set(100.0);
    sampler.mark_render_start("rows");
    clock.set(112.5);
    sampler.mark_render_end("rows");
    assert_eq!(sampler.snapshot().render_time_ms, 12.5);

    // The duration is merged into later samples.
    sampler.start(|_| {}, None);
    scheduler.run_frame(120.0);
    assert_eq!(sampler.snapshot().render_time_ms, 12.5);
    assert_eq!(sampler.snapshot().fps, 1.0);
}

#[test]
fn unpaired_marks_keep_the_previous_render_time() {
    let (clock, _scheduler, sampler) = harness();
    clock.set(10.0);
    sampler.mark_render_start("a");
    clock.set(14.0);
    sampler.mark_render_end("a");
    assert_eq!(sampler.snapshot().render_time_ms, 4.0);

    // Marks are consumed by the end call: a second end has nothing to pair with.
    clock.set(30.0);
    sampler.mark_render_end("a");
    sampler.mark_render_end("never-started");
    assert_eq!(sampler.snapshot().render_time_ms, 4.0);

    // Labels pair only with themselves.
    sampler.mark_render_start("b");
    clock.set(31.0);
    sampler.mark_render_end("c");
    assert_eq!(sampler.snapshot().render_time_ms, 4.0);
    clock.set(35.0);
    sampler.mark_render_end("b");
    assert_eq!(sampler.snapshot().render_time_ms, 5.0);
}

#[test]
fn missing_timing_facility_degrades_silently() {
    let (clock, scheduler, sampler) = harness();
    let sampler = sampler.with_mark_timer(NoMarkTimer);
    assert!(!sampler.capabilities().timing);

    clock.set(1.0);
    sampler.mark_render_start("rows");
    clock.set(9.0);
    sampler.mark_render_end("rows");
    assert_eq!(sampler.snapshot().render_time_ms, 0.0);

    // Out-of-band durations still land.
    sampler.record_render_duration(8.0);
    sampler.record_render_duration(f64::NAN);
    sampler.record_render_duration(-1.0);
    assert_eq!(sampler.snapshot().render_time_ms, 8.0);

    sampler.start(|_| {}, None);
    scheduler.run_frame(16.0);
    assert_eq!(sampler.snapshot().render_time_ms, 8.0);
}

#[test]
fn mark_table_measures_between_marks() {
    let clock = Rc::new(FakeClock::default());
    let mut marks = MarkTable::new(clock.clone());
    assert!(marks.probe().is_ok());
    assert!(marks.is_empty());

    clock.set(2.0);
    marks.mark("s").unwrap();
    clock.set(7.0);
    marks.mark("e").unwrap();
    assert_eq!(marks.measure("s", "e").unwrap(), 5.0);
    assert!(matches!(
        marks.measure("e", "s"),
        Err(PlatformError::InvalidReading(_))
    ));
    assert!(matches!(
        marks.measure("s", "x"),
        Err(PlatformError::MissingMark(name)) if name == "x"
    ));

    marks.clear("s");
    assert_eq!(marks.len(), 1);

    clock.set(f64::NAN);
    assert!(marks.probe().is_err());
    assert!(marks.mark("n").is_err());
}

#[test]
fn manual_scheduler_defers_and_cancels() {
    let scheduler = ManualFrameScheduler::new();
    let ran = Rc::new(Cell::new(0usize));

    let r = Rc::clone(&ran);
    let keep = scheduler.request_frame(Box::new(move |_: f64| r.set(r.get() + 1)));
    let r = Rc::clone(&ran);
    let cancelled = scheduler.request_frame(Box::new(move |_: f64| r.set(r.get() + 100)));
    assert_ne!(keep, cancelled);

    scheduler.cancel_frame(cancelled);
    scheduler.cancel_frame(cancelled);
    assert_eq!(scheduler.pending_len(), 1);
    assert_eq!(scheduler.run_frame(0.0), 1);
    assert_eq!(ran.get(), 1);
    assert_eq!(scheduler.run_frame(16.0), 0);
}

#[test]
fn metrics_sanitize_non_finite_fields() {
    let m = Metrics {
        fps: f64::NAN,
        memory_usage_mb: -3.0,
        dom_node_count: 5,
        render_time_ms: f64::INFINITY,
    }
    .sanitized();
    assert_eq!(
        m,
        Metrics {
            dom_node_count: 5,
            ..Metrics::ZERO
        }
    );
    assert_eq!(bytes_to_mb(512 * 1024), 0.5);
}

#[test]
fn process_memory_reads_the_current_process() {
    let probe = ProcessMemoryProbe::new();
    match probe.used_bytes() {
        Ok(bytes) => assert!(bytes > 0),
        Err(err) => {
            assert!(!sysinfo::IS_SUPPORTED_SYSTEM, "unexpected failure: {err}");
            assert!(matches!(err, PlatformError::Unsupported));
        }
    }
}
