//! Phase counter shared by every overlay animation.

use map_core::Throttle;
use std::time::{Duration, Instant};

/// One accepted animation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub phase: usize,
    /// `phase / cycle`, in `0..1`.
    pub ratio: f32,
}

/// Cyclic phase advanced at most once per interval of monotonic time.
#[derive(Debug, Clone)]
pub struct OverlayAnimator {
    phase: usize,
    cycle: usize,
    throttle: Throttle,
}

impl OverlayAnimator {
    pub fn new(cycle: usize, interval: Duration) -> Self {
        Self {
            phase: 0,
            cycle: cycle.max(1),
            throttle: Throttle::new(interval),
        }
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// The step to apply now, or `None` if the interval has not elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<Tick> {
        if !self.throttle.ready(now) {
            return None;
        }
        let tick = Tick {
            phase: self.phase,
            ratio: self.phase as f32 / self.cycle as f32,
        };
        self.phase = (self.phase + 1) % self.cycle;
        Some(tick)
    }
}
