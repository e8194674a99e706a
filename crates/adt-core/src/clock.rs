//! Simulated clocks.
//!
//! Nothing in the toolkit reads a wall clock.  Components that need "now"
//! receive a [`SimClock`] capability instead, so tests substitute a
//! [`ManualClock`] and the driver owns a [`ScaledClock`] that honours time
//! scale and pause.
//!
//! Both implementations use `Cell` for their mutable state: the driver
//! advances the clock through a shared reference while schedulers hold
//! `Rc` clones of the same clock.  Everything runs on one simulation thread,
//! so the clocks are deliberately `!Sync`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::{SimDuration, SimTime};

/// Highest time scale [`ScaledClock::set_time_scale`] accepts.
pub const TIME_SCALE_UPPER_LIMIT: f64 = 100.0;

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Source of simulated time.
///
/// Implementations must reflect any externally applied time scale or pause,
/// so due times computed from `now()` stay correct relative to perceived
/// game speed.
pub trait SimClock {
    /// The current simulated instant.
    fn now(&self) -> SimTime;

    /// Simulated time covered by one fixed simulation step at the current
    /// scale.  Zero while paused.
    fn tick_delta(&self) -> SimDuration;
}

impl<C: SimClock + ?Sized> SimClock for Rc<C> {
    #[inline]
    fn now(&self) -> SimTime {
        (**self).now()
    }

    #[inline]
    fn tick_delta(&self) -> SimDuration {
        (**self).tick_delta()
    }
}

impl<C: SimClock + ?Sized> SimClock for &C {
    #[inline]
    fn now(&self) -> SimTime {
        (**self).now()
    }

    #[inline]
    fn tick_delta(&self) -> SimDuration {
        (**self).tick_delta()
    }
}

// ── ManualClock ───────────────────────────────────────────────────────────────

/// A deterministic clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now:   Cell<SimTime>,
    delta: Cell<SimDuration>,
}

impl ManualClock {
    pub fn new(start: SimTime) -> Self {
        Self { now: Cell::new(start), delta: Cell::new(SimDuration::ZERO) }
    }

    /// Jump to an arbitrary instant (backwards jumps included).
    pub fn set(&self, now: SimTime) {
        let previous = self.now.replace(now);
        self.delta.set(now - previous);
    }

    pub fn advance(&self, by: SimDuration) {
        self.set(self.now.get() + by);
    }
}

impl SimClock for ManualClock {
    fn now(&self) -> SimTime {
        self.now.get()
    }

    /// The size of the most recent `set`/`advance` step.
    fn tick_delta(&self) -> SimDuration {
        self.delta.get()
    }
}

// ── ScaledClock ───────────────────────────────────────────────────────────────

/// Fixed-step clock with an adjustable time scale and a pause switch.
///
/// Each [`step`][Self::step] advances simulated time by
/// `fixed_delta * time_scale`, or not at all while paused.
pub struct ScaledClock {
    now:         Cell<SimTime>,
    fixed_delta: SimDuration,
    time_scale:  Cell<f64>,
    paused:      Cell<bool>,
    steps:       Cell<u64>,
}

impl ScaledClock {
    /// Create a clock at t=0 with the given unscaled step and time scale.
    pub fn new(fixed_delta: SimDuration, time_scale: f64) -> Self {
        Self {
            now:         Cell::new(SimTime::ZERO),
            fixed_delta,
            time_scale:  Cell::new(time_scale.clamp(0.0, TIME_SCALE_UPPER_LIMIT)),
            paused:      Cell::new(false),
            steps:       Cell::new(0),
        }
    }

    /// Advance by one fixed step and return the new instant.
    pub fn step(&self) -> SimTime {
        let now = self.now.get() + self.tick_delta();
        self.now.set(now);
        self.steps.set(self.steps.get() + 1);
        now
    }

    /// The unscaled fixed step.
    #[inline]
    pub fn fixed_delta(&self) -> SimDuration {
        self.fixed_delta
    }

    #[inline]
    pub fn time_scale(&self) -> f64 {
        self.time_scale.get()
    }

    /// Set the time scale, clamped to `[0, TIME_SCALE_UPPER_LIMIT]`.
    ///
    /// Returns `true` if the effective scale changed.
    pub fn set_time_scale(&self, scale: f64) -> bool {
        let scale = if scale.is_nan() { 0.0 } else { scale.clamp(0.0, TIME_SCALE_UPPER_LIMIT) };
        let previous = self.time_scale.replace(scale);
        previous.total_cmp(&scale).is_ne()
    }

    pub fn pause(&self) {
        self.paused.set(true);
    }

    pub fn resume(&self) {
        self.paused.set(false);
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// Number of `step` calls so far, paused steps included.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps.get()
    }
}

impl SimClock for ScaledClock {
    fn now(&self) -> SimTime {
        self.now.get()
    }

    fn tick_delta(&self) -> SimDuration {
        if self.paused.get() {
            SimDuration::ZERO
        } else {
            self.fixed_delta * self.time_scale.get()
        }
    }
}

impl fmt::Display for ScaledClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (step {}, x{:.1}{})",
            self.now.get(),
            self.steps.get(),
            self.time_scale.get(),
            if self.paused.get() { ", paused" } else { "" },
        )
    }
}
