//! Real-time trigger for the periodic stats flush.

use std::time::Duration;

/// Fires once each time accumulated real time crosses a multiple of
/// `interval`.
///
/// A long frame that spans several intervals fires only once; the next
/// deadline is the first multiple of `interval` after the current elapsed
/// time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RealTimeInterval {
    interval: Duration,
    elapsed:  Duration,
    next_at:  Duration,
}

impl RealTimeInterval {
    /// A zero `interval` fires on every [`advance`][Self::advance].
    pub fn new(interval: Duration) -> Self {
        Self { interval, elapsed: Duration::ZERO, next_at: interval }
    }

    /// Add `real_dt` to the elapsed time.  Returns the total elapsed real
    /// time if the trigger fired.
    pub fn advance(&mut self, real_dt: Duration) -> Option<Duration> {
        self.elapsed += real_dt;
        if self.interval.is_zero() {
            return Some(self.elapsed);
        }
        if self.elapsed < self.next_at {
            return None;
        }
        let periods = self.elapsed.as_nanos() / self.interval.as_nanos() + 1;
        // Saturate rather than overflow on absurd runs.
        let periods = u32::try_from(periods).unwrap_or(u32::MAX);
        self.next_at = self.interval.saturating_mul(periods);
        Some(self.elapsed)
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Real time accumulated so far.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
