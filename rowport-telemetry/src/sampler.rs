use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::metrics::bytes_to_mb;
use crate::{
    Clock, ContainerHandle, FrameHandle, FrameScheduler, MarkTable, MarkTimer, MemoryProbe,
    Metrics, ProcessMemoryProbe,
};

/// Length of the trailing window the frame-rate estimate counts ticks over.
pub const FPS_WINDOW_MS: f64 = 1000.0;

/// Receives a copy of every snapshot while monitoring.
pub type Observer = Box<dyn FnMut(Metrics)>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SamplerState {
    #[default]
    Idle,
    Monitoring,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session was already running; it continues untouched.
    AlreadyMonitoring,
}

/// Which optional host facilities answered their probe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub memory: bool,
    pub timing: bool,
}

struct Session {
    state: SamplerState,
    // Bumped on every start/stop; a tick carrying an older value is inert.
    generation: u64,
    metrics: Metrics,
    frame_times: VecDeque<f64>,
    started_at_ms: Option<f64>,
    pending: Option<FrameHandle>,
    observer: Option<Observer>,
    container: Option<ContainerHandle>,
    capabilities: Capabilities,
    memory: Box<dyn MemoryProbe>,
    timer: Box<dyn MarkTimer>,
}

impl Session {
    fn is_live(&self, generation: u64) -> bool {
        self.state == SamplerState::Monitoring && self.generation == generation
    }

    /// Runs one sampling pass. A non-finite tick timestamp is skipped and yields `None`.
    fn sample(&mut self, now_ms: f64) -> Option<Metrics> {
        if !now_ms.is_finite() {
            ttrace!(now_ms, "skipping tick with non-finite timestamp");
            return None;
        }
        // Timestamps ahead of `now_ms` (a clock that went backwards) leave the window too.
        self.frame_times.retain(|&t| t <= now_ms && now_ms - t <= FPS_WINDOW_MS);
        self.frame_times.push_back(now_ms);

        let memory_usage_mb = if self.capabilities.memory {
            match self.memory.used_bytes() {
                Ok(bytes) => bytes_to_mb(bytes),
                Err(_err) => {
                    ttrace!(error = %_err, "memory probe failed");
                    0.0
                }
            }
        } else {
            0.0
        };

        let dom_node_count = self
            .container
            .as_ref()
            .and_then(|c| c.node_count())
            .unwrap_or(0) as u64;

        self.metrics = Metrics {
            fps: self.frame_times.len() as f64,
            memory_usage_mb,
            dom_node_count,
            render_time_ms: self.metrics.render_time_ms,
        }
        .sanitized();
        Some(self.metrics)
    }
}

/// Samples frame rate, memory, node count and render time once per display refresh.
///
/// The sampler is single-threaded and cooperative: it never blocks and owns no threads. It
/// re-registers itself with the host's [`FrameScheduler`] after each pass, and a liveness
/// check on every tick makes `stop` final: once `stop` returns, the observer is never called
/// again.
///
/// Optional facilities (memory introspection, node counting, mark timing) degrade their field
/// to `0` (or leave it unchanged) when absent; nothing here returns an error.
pub struct TelemetrySampler {
    clock: Rc<dyn Clock>,
    scheduler: Rc<dyn FrameScheduler>,
    session: Rc<RefCell<Session>>,
}

impl TelemetrySampler {
    /// Creates an idle sampler with the default process memory probe and a [`MarkTable`] timer
    /// driven by `clock`.
    pub fn new(clock: Rc<dyn Clock>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        let timer = MarkTable::new(Rc::clone(&clock));
        let session = Session {
            state: SamplerState::Idle,
            generation: 0,
            metrics: Metrics::ZERO,
            frame_times: VecDeque::new(),
            started_at_ms: None,
            pending: None,
            observer: None,
            container: None,
            capabilities: Capabilities::default(),
            memory: Box::new(ProcessMemoryProbe::new()),
            timer: Box::new(timer),
        };
        let sampler = Self {
            clock,
            scheduler,
            session: Rc::new(RefCell::new(session)),
        };
        sampler.probe_timer();
        sampler
    }

    pub fn with_memory_probe(self, probe: impl MemoryProbe + 'static) -> Self {
        self.session.borrow_mut().memory = Box::new(probe);
        self
    }

    pub fn with_mark_timer(self, timer: impl MarkTimer + 'static) -> Self {
        self.session.borrow_mut().timer = Box::new(timer);
        self.probe_timer();
        self
    }

    fn probe_timer(&self) {
        let mut s = self.session.borrow_mut();
        s.capabilities.timing = match s.timer.probe() {
            Ok(()) => true,
            Err(_err) => {
                twarn!(error = %_err, "render timing unavailable; render_time_ms will only follow recorded durations");
                false
            }
        };
    }

    pub fn state(&self) -> SamplerState {
        self.session.borrow().state
    }

    pub fn is_monitoring(&self) -> bool {
        self.state() == SamplerState::Monitoring
    }

    pub fn capabilities(&self) -> Capabilities {
        self.session.borrow().capabilities
    }

    /// Clock time at which the current session started, if monitoring.
    pub fn monitoring_since_ms(&self) -> Option<f64> {
        self.session.borrow().started_at_ms
    }

    /// The most recent snapshot (all zeros before the first sample).
    pub fn snapshot(&self) -> Metrics {
        self.session.borrow().metrics
    }

    /// Starts monitoring, delivering a snapshot to `observer` on every tick.
    ///
    /// When a session is already running this is a no-op: a warning is logged, `observer` is
    /// dropped and the running session keeps its own observer and container.
    pub fn start(
        &self,
        observer: impl FnMut(Metrics) + 'static,
        container: Option<ContainerHandle>,
    ) -> StartOutcome {
        let generation = {
            let mut s = self.session.borrow_mut();
            if s.state == SamplerState::Monitoring {
                twarn!("telemetry sampler already monitoring; start ignored");
                return StartOutcome::AlreadyMonitoring;
            }
            s.state = SamplerState::Monitoring;
            s.generation = s.generation.wrapping_add(1);
            s.frame_times.clear();
            s.started_at_ms = Some(self.clock.now_ms());
            s.observer = Some(Box::new(observer));
            s.container = container;
            s.capabilities.memory = match s.memory.used_bytes() {
                Ok(_) => true,
                Err(_err) => {
                    tdebug!(error = %_err, "memory introspection unavailable");
                    false
                }
            };
            tdebug!(
                generation = s.generation,
                memory = s.capabilities.memory,
                timing = s.capabilities.timing,
                has_container = s.container.is_some(),
                "telemetry sampler started"
            );
            s.generation
        };

        let handle = schedule_tick(&self.session, &self.scheduler, generation);
        self.session.borrow_mut().pending = Some(handle);
        StartOutcome::Started
    }

    /// Stops monitoring. Idempotent.
    ///
    /// Cancels the pending tick and releases the observer and container before returning.
    pub fn stop(&self) {
        let (pending, observer, container) = {
            let mut s = self.session.borrow_mut();
            if s.state == SamplerState::Idle {
                return;
            }
            s.state = SamplerState::Idle;
            s.generation = s.generation.wrapping_add(1);
            s.started_at_ms = None;
            (s.pending.take(), s.observer.take(), s.container.take())
        };
        if let Some(handle) = pending {
            self.scheduler.cancel_frame(handle);
        }
        // Released outside the borrow: their destructors may call back into the sampler.
        drop(observer);
        drop(container);
        tdebug!("telemetry sampler stopped");
    }

    /// Marks the start of a render labelled `label`.
    ///
    /// Best-effort: does nothing when timing is unavailable.
    pub fn mark_render_start(&self, label: &str) {
        let mut s = self.session.borrow_mut();
        if !s.capabilities.timing {
            return;
        }
        if let Err(_err) = s.timer.mark(&start_mark(label)) {
            ttrace!(label, error = %_err, "mark_render_start failed");
        }
    }

    /// Marks the end of a render labelled `label` and, when paired with a start mark, updates
    /// `render_time_ms`.
    ///
    /// An unpaired or inconsistent end mark leaves the previous value in place.
    pub fn mark_render_end(&self, label: &str) {
        let mut s = self.session.borrow_mut();
        if !s.capabilities.timing {
            return;
        }
        let start = start_mark(label);
        let end = end_mark(label);
        let measured = match s.timer.mark(&end) {
            Ok(()) => s.timer.measure(&start, &end),
            Err(err) => Err(err),
        };
        s.timer.clear(&start);
        s.timer.clear(&end);
        match measured {
            Ok(ms) if ms.is_finite() => s.metrics.render_time_ms = ms,
            Ok(_) => {}
            Err(_err) => {
                ttrace!(label, error = %_err, "mark_render_end failed");
            }
        }
    }

    /// Records a render duration observed out-of-band (e.g. by a host performance observer).
    ///
    /// Non-finite or negative durations are ignored.
    pub fn record_render_duration(&self, duration_ms: f64) {
        if !duration_ms.is_finite() || duration_ms < 0.0 {
            return;
        }
        self.session.borrow_mut().metrics.render_time_ms = duration_ms;
    }
}

impl Drop for TelemetrySampler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TelemetrySampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.session.borrow();
        f.debug_struct("TelemetrySampler")
            .field("state", &s.state)
            .field("metrics", &s.metrics)
            .field("capabilities", &s.capabilities)
            .finish_non_exhaustive()
    }
}

fn start_mark(label: &str) -> String {
    format!("{label}-start")
}

fn end_mark(label: &str) -> String {
    format!("{label}-end")
}

fn schedule_tick(
    session: &Rc<RefCell<Session>>,
    scheduler: &Rc<dyn FrameScheduler>,
    generation: u64,
) -> FrameHandle {
    let weak_session = Rc::downgrade(session);
    let weak_scheduler = Rc::downgrade(scheduler);
    scheduler.request_frame(Box::new(move |now_ms: f64| {
        tick(&weak_session, &weak_scheduler, generation, now_ms);
    }))
}

fn tick(
    session: &Weak<RefCell<Session>>,
    scheduler: &Weak<dyn FrameScheduler>,
    generation: u64,
    now_ms: f64,
) {
    let Some(session) = session.upgrade() else {
        return;
    };

    let delivery = {
        let mut s = session.borrow_mut();
        if !s.is_live(generation) {
            return;
        }
        s.pending = None;
        s.sample(now_ms).map(|metrics| (metrics, s.observer.take()))
    };

    // The observer runs without the session borrowed so it may call back into the sampler
    // (including `stop`).
    if let Some((metrics, Some(mut observer))) = delivery {
        observer(metrics);
        let mut s = session.borrow_mut();
        if s.is_live(generation) {
            s.observer = Some(observer);
        }
    }

    if !session.borrow().is_live(generation) {
        return;
    }
    let Some(scheduler) = scheduler.upgrade() else {
        return;
    };
    let handle = schedule_tick(&session, &scheduler, generation);
    session.borrow_mut().pending = Some(handle);
}
