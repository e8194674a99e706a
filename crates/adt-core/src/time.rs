//! Simulated time model.
//!
//! # Design
//!
//! Simulated time is a floating-point count of seconds since the simulation
//! started.  It is advanced only by the driving loop (through a
//! [`SimClock`][crate::SimClock]) and is distinct from real, wall-clock time:
//! a time scale of 2.0 makes one real second worth two simulated seconds, and
//! a paused clock does not advance at all.
//!
//! Two newtypes keep instants and spans apart:
//!
//! ```text
//! SimTime     - SimTime     = SimDuration
//! SimTime     + SimDuration = SimTime
//! SimDuration * f64         = SimDuration
//! ```
//!
//! Both order with `f64::total_cmp`, so they can be compared and sorted
//! without `partial_cmp` ceremony.  NaN is never produced by the clocks in
//! this crate; [`SimDuration::try_new`] rejects it at the API boundary.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

use crate::{CoreError, CoreResult};

// ── SimTime ──────────────────────────────────────────────────────────────────

/// An absolute instant on the simulated timeline, in seconds.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    /// Span from `earlier` to `self`; negative when `earlier` is later.
    #[inline]
    pub fn since(self, earlier: SimTime) -> SimDuration {
        SimDuration(self.0 - earlier.0)
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add<SimDuration> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: SimDuration) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl AddAssign<SimDuration> for SimTime {
    #[inline]
    fn add_assign(&mut self, rhs: SimDuration) {
        self.0 += rhs.0;
    }
}

impl Sub for SimTime {
    type Output = SimDuration;
    #[inline]
    fn sub(self, rhs: SimTime) -> SimDuration {
        self.since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}s", self.0)
    }
}

// ── SimDuration ──────────────────────────────────────────────────────────────

/// A signed span of simulated time, in seconds.
///
/// Signed because [`SimTime::since`] and remaining-time queries legitimately
/// go negative once a deadline has passed.  Use [`SimDuration::try_new`] where
/// a non-negative span is required.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimDuration(pub f64);

impl SimDuration {
    pub const ZERO: SimDuration = SimDuration(0.0);

    #[inline]
    pub fn from_secs(secs: f64) -> Self {
        SimDuration(secs)
    }

    /// Construct a non-negative duration; negative or NaN input is rejected.
    pub fn try_new(secs: f64) -> CoreResult<Self> {
        if secs.is_nan() || secs < 0.0 {
            return Err(CoreError::InvalidDuration(secs));
        }
        Ok(SimDuration(secs))
    }

    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    /// `true` for spans ≤ 0, i.e. "due now" when read as a remaining time.
    #[inline]
    pub fn is_elapsed(self) -> bool {
        self.0 <= 0.0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0.0
    }

    #[inline]
    pub fn max(self, other: SimDuration) -> SimDuration {
        if self >= other { self } else { other }
    }
}

impl PartialEq for SimDuration {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SimDuration {}

impl PartialOrd for SimDuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimDuration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for SimDuration {
    type Output = SimDuration;
    #[inline]
    fn add(self, rhs: SimDuration) -> SimDuration {
        SimDuration(self.0 + rhs.0)
    }
}

impl Sub for SimDuration {
    type Output = SimDuration;
    #[inline]
    fn sub(self, rhs: SimDuration) -> SimDuration {
        SimDuration(self.0 - rhs.0)
    }
}

impl Mul<f64> for SimDuration {
    type Output = SimDuration;
    #[inline]
    fn mul(self, rhs: f64) -> SimDuration {
        SimDuration(self.0 * rhs)
    }
}

impl fmt::Display for SimDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}
