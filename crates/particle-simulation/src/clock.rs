//! Frame timing: elapsed-time deltas and refresh pacing

use std::thread;
use std::time::{Duration, Instant};

/// Turns frame start times into clamped simulation deltas
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    max_delta: f32,
}

impl FrameClock {
    pub fn new(max_delta: f32) -> Self {
        Self {
            last: None,
            max_delta,
        }
    }

    /// Seconds since the previous tick, within `[0, max_delta]`
    ///
    /// The first tick has nothing to measure against and returns zero. The cap
    /// keeps a stall (a suspended process, a debugger break) from turning into
    /// one giant, explosive step.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last
            .map_or(0.0, |last| now.saturating_duration_since(last).as_secs_f32());
        self.last = Some(now);
        clamp_delta(elapsed, self.max_delta)
    }

    /// Forget the previous tick
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Clamp a delta into `[0, max_delta]`, mapping NaN to zero
pub fn clamp_delta(delta: f32, max_delta: f32) -> f32 {
    if delta.is_nan() {
        return 0.0;
    }
    delta.clamp(0.0, max_delta)
}

/// Sleeps until the next refresh deadline
///
/// Stands in for a display-synchronized callback when there is no display:
/// frames start at most once per interval and never back-to-back.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    next: Option<Instant>,
}

impl FramePacer {
    pub fn new(refresh_hz: f32) -> Self {
        Self {
            interval: Duration::from_secs_f32(1.0 / refresh_hz.max(1.0)),
            next: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next deadline and return the frame start time
    pub fn wait(&mut self) -> Instant {
        if let Some(deadline) = self.next {
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
        }

        let start = Instant::now();
        // Keep the cadence unless we already fell a whole interval behind
        self.next = Some(match self.next {
            Some(deadline) if deadline + self.interval > start => deadline + self.interval,
            _ => start + self.interval,
        });
        start
    }
}
