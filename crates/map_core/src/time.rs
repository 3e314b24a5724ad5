//! Time management for the frame loop and animation throttling.

use std::time::{Duration, Instant};

/// Timestamp of the current frame.
#[derive(Debug)]
pub struct Time {
    last_frame: Instant,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        self.update_at(Instant::now());
    }

    /// Update timing with an explicit timestamp. Time never runs backwards.
    pub fn update_at(&mut self, now: Instant) {
        self.last_frame = self.last_frame.max(now);
    }

    /// Timestamp of the most recent frame.
    pub fn now(&self) -> Instant {
        self.last_frame
    }
}

/// Rate limiter driven by monotonic time rather than frame counts.
///
/// The first call always fires; after that a call fires only once `interval`
/// has elapsed since the last call that fired.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fired: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Returns true (and records `now`) if the throttled action may run.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_fired {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last_fired = Some(now);
                true
            }
        }
    }
}
