//! Capped multiplicative poll backoff.

use std::time::Duration;

/// Yields progressively longer wait intervals, capped at a maximum.
///
/// The default schedule starts at 1s, multiplies by 1.2 per poll, and caps
/// at 600s, which keeps early polls responsive without hammering the remote
/// service on jobs that run for hours.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    multiplier: f64,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, multiplier: f64, max: Duration) -> Self {
        Self {
            next: initial.min(max),
            multiplier,
            max,
        }
    }

    /// The delay to wait before the next poll; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = self.next.mul_f64(self.multiplier).min(self.max);
        delay
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000), 1.2, Duration::from_millis(600_000))
    }
}
