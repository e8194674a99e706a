//! The seam between an agent's control loop and whatever moves it.
//!
//! Physics, obstacle spawning and collision detection are not part of the
//! toolkit.  A `Body` wraps them and reports back only what the control loop
//! cares about.

use adt_core::{SimDuration, SimTime};

/// Result of asking the body to jump.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JumpOutcome {
    /// The body was grounded and is now airborne.
    Executed,
    /// The body could not jump (already airborne).
    Invalid,
}

/// Something that happened to the body during one physics step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyEvent {
    /// An obstacle passed the body without touching it.
    ObstacleCleared,
    /// The body hit an obstacle.  Ends the episode.
    Collision,
}

/// Environment side of an agent.
pub trait Body {
    /// Attempt a jump at `now`.
    fn try_jump(&mut self, now: SimTime) -> JumpOutcome;

    /// Advance the body's own simulation by `dt` and report what happened.
    /// `dt` is zero while the clock is paused.
    fn step(&mut self, now: SimTime, dt: SimDuration) -> Vec<BodyEvent>;

    /// Observation vector handed to the policy.
    fn observe(&self, now: SimTime) -> Vec<f32>;

    /// Display names for the entries of [`observe`][Self::observe], in the
    /// same order.  Entries without a name are shown as `"unnamed"`.
    fn observation_names(&self) -> &[&'static str] {
        &[]
    }

    /// Put the body back in its start state for a new episode.
    fn reset(&mut self, now: SimTime);
}

impl<B: Body + ?Sized> Body for Box<B> {
    fn try_jump(&mut self, now: SimTime) -> JumpOutcome {
        (**self).try_jump(now)
    }

    fn step(&mut self, now: SimTime, dt: SimDuration) -> Vec<BodyEvent> {
        (**self).step(now, dt)
    }

    fn observe(&self, now: SimTime) -> Vec<f32> {
        (**self).observe(now)
    }

    fn observation_names(&self) -> &[&'static str] {
        (**self).observation_names()
    }

    fn reset(&mut self, now: SimTime) {
        (**self).reset(now)
    }
}
