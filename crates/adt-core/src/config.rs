//! Top-level control-loop configuration.

use crate::{CoreError, CoreResult, ScaledClock, SimDuration, TIME_SCALE_UPPER_LIMIT};

/// Control-loop configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the driver.  Every field has a default, so partial files are accepted
/// when the `serde` feature is on.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControlConfig {
    /// Unscaled simulated seconds per fixed step.  Default: 0.02 (50 Hz).
    pub fixed_delta_secs: f64,

    /// Initial time scale (1.0 = real time).
    pub time_scale: f64,

    /// A decision is requested every `decision_period` fixed steps.
    pub decision_period: u32,

    /// Real seconds between periodic (rate) flushes of the lifetime totals.
    pub flush_interval_secs: f64,

    /// Total fixed steps to simulate.
    pub total_steps: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// When `true`, scheduling a new delayed jump cancels any pending one,
    /// so an agent has at most one jump in flight.
    pub replace_pending: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            fixed_delta_secs:    0.02,
            time_scale:          1.0,
            decision_period:     5,
            flush_interval_secs: 1.0,
            total_steps:         10_000,
            seed:                42,
            replace_pending:     true,
        }
    }
}

impl ControlConfig {
    /// Reject values the control loop cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.fixed_delta_secs.is_finite() || self.fixed_delta_secs <= 0.0 {
            return Err(CoreError::Config(format!(
                "fixed_delta_secs must be positive and finite, got {}",
                self.fixed_delta_secs
            )));
        }
        if !(0.0..=TIME_SCALE_UPPER_LIMIT).contains(&self.time_scale) {
            return Err(CoreError::Config(format!(
                "time_scale must be within [0, {TIME_SCALE_UPPER_LIMIT}], got {}",
                self.time_scale
            )));
        }
        if self.decision_period < 1 {
            return Err(CoreError::Config("decision_period must be at least 1".into()));
        }
        if !self.flush_interval_secs.is_finite() || self.flush_interval_secs <= 0.0 {
            return Err(CoreError::Config(format!(
                "flush_interval_secs must be positive and finite, got {}",
                self.flush_interval_secs
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn fixed_delta(&self) -> SimDuration {
        SimDuration(self.fixed_delta_secs)
    }

    /// Longest delay a policy may request: the decision interval minus two
    /// steps, so a delayed jump lands before the next decision is taken.
    pub fn max_jump_delay(&self) -> SimDuration {
        let steps = f64::from(self.decision_period.saturating_sub(2));
        SimDuration(steps * self.fixed_delta_secs)
    }

    /// Construct a `ScaledClock` pre-configured for this run.
    pub fn make_clock(&self) -> ScaledClock {
        ScaledClock::new(self.fixed_delta(), self.time_scale)
    }
}
