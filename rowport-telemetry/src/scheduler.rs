use std::cell::{Cell, RefCell};
use std::mem;

/// A callback run once on the next display refresh, receiving that tick's timestamp (ms).
pub type FrameCallback = Box<dyn FnOnce(f64)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// The host's "run this on the next frame" facility.
///
/// Implementations must never invoke the callback synchronously from `request_frame`.
/// Cancelling an unknown or already-run handle is a no-op.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;
    fn cancel_frame(&self, handle: FrameHandle);
}

/// A frame scheduler driven explicitly by the host.
///
/// Call [`ManualFrameScheduler::run_frame`] once per display refresh (or per simulated tick in
/// tests). Callbacks requested while a frame runs are deferred to the next frame.
#[derive(Default)]
pub struct ManualFrameScheduler {
    next_id: Cell<u64>,
    pending: RefCell<Vec<(FrameHandle, FrameCallback)>>,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Runs every callback requested before this call; returns how many ran.
    pub fn run_frame(&self, now_ms: f64) -> usize {
        let batch = mem::take(&mut *self.pending.borrow_mut());
        let ran = batch.len();
        for (_, callback) in batch {
            callback(now_ms);
        }
        ran
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let id = self.next_id.get().wrapping_add(1);
        self.next_id.set(id);
        let handle = FrameHandle(id);
        self.pending.borrow_mut().push((handle, callback));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.pending.borrow_mut().retain(|(h, _)| *h != handle);
    }
}

impl std::fmt::Debug for ManualFrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualFrameScheduler")
            .field("next_id", &self.next_id.get())
            .field("pending", &self.pending_len())
            .finish()
    }
}
