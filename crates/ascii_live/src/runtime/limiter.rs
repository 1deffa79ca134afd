use std::time::{Duration, Instant};

/// Minimum spacing between processed ticks, roughly 15 frames per second.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(66);

/// Caps how often refresh opportunities turn into rendered frames.
#[derive(Clone, Copy, Debug)]
pub struct FrameLimiter {
    min_interval: Duration,
    last_tick: Option<Instant>,
}

impl FrameLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval, last_tick: None }
    }

    /// Forgets the last tick so the next opportunity is always processed.
    pub fn reset(&mut self) {
        self.last_tick = None;
    }

    /// Returns true and records `now` when enough time has passed since the
    /// last processed tick.
    pub fn try_tick(&mut self, now: Instant) -> bool {
        if let Some(last_tick) = self.last_tick {
            if now.saturating_duration_since(last_tick) < self.min_interval {
                return false;
            }
        }

        self.last_tick = Some(now);
        true
    }
}

impl Default for FrameLimiter {
    fn default() -> Self {
        Self::new(MIN_TICK_INTERVAL)
    }
}
