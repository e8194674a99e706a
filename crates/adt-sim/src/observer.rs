//! Simulation observer trait for progress reporting and data collection.

use std::time::Duration;

use adt_agent::EpisodeSummary;
use adt_core::{AgentId, SimTime};

use crate::StepReport;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// step loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimObserver {
    /// Called after every step, paused steps included.
    fn on_step_end(&mut self, _report: &StepReport) {}

    /// Called after `agent` began a new episode.
    fn on_episode_begin(&mut self, _agent: AgentId, _summary: &EpisodeSummary) {}

    /// Called after the periodic flush, with the real time elapsed since the
    /// run started.
    fn on_periodic_flush(&mut self, _elapsed: Duration) {}

    /// Called once after the final step.
    fn on_sim_end(&mut self, _steps: u64, _now: SimTime) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
