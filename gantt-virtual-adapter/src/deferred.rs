//! Low-priority recomputation: a time throttle and a single-slot coalescing queue.

/// Allows one run per `interval_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throttle {
    interval_ms: u64,
    last_run_ms: Option<u64>,
}

impl Throttle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_run_ms: None,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn is_ready(&self, now_ms: u64) -> bool {
        self.last_run_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.interval_ms)
    }

    pub fn mark(&mut self, now_ms: u64) {
        self.last_run_ms = Some(now_ms);
    }

    pub fn reset(&mut self) {
        self.last_run_ms = None;
    }
}

/// Holds at most one pending task.
///
/// Submitting replaces whatever is pending (last write wins). The idle timeout starts with the
/// first submission into an empty slot and is not restarted by later ones. A task is released by
/// [`DeferredSlot::poll`] once the throttle allows it and either the host reports an idle tick or
/// the timeout has elapsed, so constant input still yields one run per throttle interval.
#[derive(Clone, Debug)]
pub struct DeferredSlot<T> {
    pending: Option<(T, u64)>,
    idle_timeout_ms: u64,
    throttle: Throttle,
}

impl<T> DeferredSlot<T> {
    pub fn new(throttle_ms: u64, idle_timeout_ms: u64) -> Self {
        Self {
            pending: None,
            idle_timeout_ms,
            throttle: Throttle::new(throttle_ms),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(t, _)| t)
    }

    /// Replaces the pending task, keeping its deadline. Returns the superseded one, if any.
    pub fn submit(&mut self, task: T, now_ms: u64) -> Option<T> {
        let deadline = self
            .pending
            .as_ref()
            .map_or(now_ms.saturating_add(self.idle_timeout_ms), |(_, d)| *d);
        let prev = self.pending.replace((task, deadline)).map(|(t, _)| t);
        if prev.is_some() {
            gtrace!(now_ms, "DeferredSlot: superseded pending task");
        }
        prev
    }

    /// Releases the pending task when it may run now.
    pub fn poll(&mut self, now_ms: u64, idle: bool) -> Option<T> {
        let (_, deadline) = self.pending.as_ref()?;
        if !self.throttle.is_ready(now_ms) || !(idle || now_ms >= *deadline) {
            return None;
        }
        self.throttle.mark(now_ms);
        self.pending.take().map(|(t, _)| t)
    }

    /// Releases the pending task regardless of timing (the throttle is still marked).
    pub fn flush(&mut self, now_ms: u64) -> Option<T> {
        let (task, _) = self.pending.take()?;
        self.throttle.mark(now_ms);
        Some(task)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(t, _)| t)
    }
}
