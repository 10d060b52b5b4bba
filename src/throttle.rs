//! Fixed-interval gate for per-frame work during a gesture

use std::time::{Duration, Instant};

/// Lets at most one evaluation through per `interval`.
///
/// Skipped evaluations are not queued: the caller keeps the latest input and
/// the next admitted (or final) evaluation uses it.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true and records `now` if enough time has passed
    pub fn ready(&mut self, now: Instant) -> bool {
        let admitted = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if admitted {
            self.last = Some(now);
        }
        admitted
    }

    /// Forget the last admission so the next call always passes
    pub fn reset(&mut self) {
        self.last = None;
    }
}
