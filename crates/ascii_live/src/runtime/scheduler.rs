use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Handle to one scheduled callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackId(pub u64);

/// Host-side callback scheduling.
///
/// `request_frame` fires at the next display refresh, `request_timeout` after
/// a fixed delay. A cancelled callback must never fire.
pub trait Scheduler {
    fn request_frame(&mut self) -> CallbackId;
    fn request_timeout(&mut self, delay: Duration) -> CallbackId;
    fn cancel(&mut self, id: CallbackId);
}

/// Deterministic scheduler with a fixed refresh interval.
///
/// The clock only moves when the host calls [`FrameClock::pop_next`] or
/// [`FrameClock::advance_to`], so it can be driven by real sleeping or by
/// virtual time.
#[derive(Debug)]
pub struct FrameClock {
    refresh: Duration,
    now: Instant,
    next_id: u64,
    pending: BTreeMap<CallbackId, Instant>,
}

impl FrameClock {
    pub fn new(refresh: Duration) -> Self {
        Self::starting_at(Instant::now(), refresh)
    }

    pub fn starting_at(now: Instant, refresh: Duration) -> Self {
        Self { refresh, now, next_id: 0, pending: BTreeMap::new() }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn refresh(&self) -> Duration {
        self.refresh
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: CallbackId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn advance_to(&mut self, now: Instant) {
        self.now = self.now.max(now);
    }

    /// Earliest pending callback and when it is due, without removing it.
    pub fn peek_next(&self) -> Option<(CallbackId, Instant)> {
        self.pending.iter().map(|(&id, &due)| (id, due)).min_by_key(|&(id, due)| (due, id))
    }

    /// Removes the earliest pending callback and moves the clock to its due
    /// time.
    pub fn pop_next(&mut self) -> Option<(CallbackId, Instant)> {
        let (id, due) = self.peek_next()?;
        self.pending.remove(&id);
        self.advance_to(due);
        Some((id, due))
    }

    fn schedule(&mut self, due: Instant) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, due);
        id
    }
}

impl Scheduler for FrameClock {
    fn request_frame(&mut self) -> CallbackId {
        let due = self.now + self.refresh;
        self.schedule(due)
    }

    fn request_timeout(&mut self, delay: Duration) -> CallbackId {
        let due = self.now + delay;
        self.schedule(due)
    }

    fn cancel(&mut self, id: CallbackId) {
        self.pending.remove(&id);
    }
}
