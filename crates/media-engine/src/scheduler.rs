//! Frame scheduling for the display loop
//!
//! The controller never sleeps or spawns. It asks a `FrameScheduler` for a tick
//! and the host calls `PlaybackController::tick` with that handle when it fires.
//! Handles are single-use; a cancelled or superseded handle is ignored.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Identifies one scheduled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait FrameScheduler {
    /// Requests a callback on the next frame
    fn schedule_tick(&mut self) -> TickHandle;

    /// Withdraws a request; unknown handles are ignored
    fn cancel_tick(&mut self, handle: TickHandle);
}

#[derive(Debug, Default)]
struct ManualInner {
    next_id: u64,
    pending: Option<TickHandle>,
    scheduled: u64,
    cancelled: u64,
}

/// Scheduler driven explicitly by the caller
///
/// Clones share state, so a test can keep one clone and fire ticks while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut ManualInner) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// The outstanding tick, if any
    pub fn pending(&self) -> Option<TickHandle> {
        self.with_inner(|inner| inner.pending)
    }

    /// Takes the outstanding tick so the caller can fire it
    pub fn take_due(&self) -> Option<TickHandle> {
        self.with_inner(|inner| inner.pending.take())
    }

    /// Total number of ticks ever requested
    pub fn scheduled_count(&self) -> u64 {
        self.with_inner(|inner| inner.scheduled)
    }

    pub fn cancelled_count(&self) -> u64 {
        self.with_inner(|inner| inner.cancelled)
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule_tick(&mut self) -> TickHandle {
        self.with_inner(|inner| {
            inner.next_id += 1;
            inner.scheduled += 1;
            let handle = TickHandle(inner.next_id);
            inner.pending = Some(handle);
            handle
        })
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        self.with_inner(|inner| {
            if inner.pending == Some(handle) {
                inner.pending = None;
                inner.cancelled += 1;
            }
        })
    }
}

/// Scheduler for real hosts: each tick becomes due one frame interval after
/// it was requested
#[derive(Debug)]
pub struct IntervalScheduler {
    interval: Duration,
    next_id: u64,
    pending: Option<(TickHandle, Instant)>,
}

impl IntervalScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_id: 0,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the outstanding tick becomes due
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, at)| at)
    }

    /// Returns the outstanding tick if it is due at `now`
    pub fn due(&self, now: Instant) -> Option<TickHandle> {
        match self.pending {
            Some((handle, at)) if at <= now => Some(handle),
            _ => None,
        }
    }
}

impl FrameScheduler for IntervalScheduler {
    fn schedule_tick(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending = Some((handle, Instant::now() + self.interval));
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if matches!(self.pending, Some((pending, _)) if pending == handle) {
            self.pending = None;
        }
    }
}
