//! Coalescing frame scheduler.
//!
//! Expensive recomputation (canvas rescale, heatmap redraw, analytics panel
//! refresh) is queued here instead of running inside the event handler that
//! triggered it. The host's animation-frame or idle driver calls
//! [`FrameScheduler::run_pending`] once per tick.
//!
//! At most one job is pending per key. Scheduling an already-pending key
//! keeps the existing job: jobs read current state when they fire, so the
//! later request is already covered. `reschedule` cancels and replaces it
//! instead, for jobs whose closure captures request-time values.

/// Deferred work run against a context `C` on the next tick.
pub type Job<C> = Box<dyn FnOnce(&mut C)>;

pub struct FrameScheduler<K, C> {
    pending: Vec<(K, Job<C>)>,
}

impl<K, C> Default for FrameScheduler<K, C> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<K: PartialEq + std::fmt::Debug, C> FrameScheduler<K, C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `job` under `key` unless one is already pending.
    /// Returns true if the job was queued.
    pub fn schedule_coalesced<F>(&mut self, key: K, job: F) -> bool
    where
        F: FnOnce(&mut C) + 'static,
    {
        if self.is_pending(&key) {
            log::trace!("coalesced {key:?}");
            return false;
        }
        self.pending.push((key, Box::new(job)));
        true
    }

    /// Cancel any pending job for `key`, then queue `job`.
    pub fn reschedule<F>(&mut self, key: K, job: F)
    where
        F: FnOnce(&mut C) + 'static,
    {
        self.cancel(&key);
        self.pending.push((key, Box::new(job)));
    }

    /// Returns true if a pending job was dropped.
    pub fn cancel(&mut self, key: &K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(k, _)| k != key);
        before != self.pending.len()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Run every pending job in the order it was queued. Returns how many ran.
    pub fn run_pending(&mut self, ctx: &mut C) -> usize {
        let jobs = std::mem::take(&mut self.pending);
        let count = jobs.len();
        for (_, job) in jobs {
            job(ctx);
        }
        count
    }
}
