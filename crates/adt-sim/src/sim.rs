//! The `Sim` struct and its step loop.

use std::rc::Rc;
use std::time::Duration;

use adt_agent::{Body, DelayedAgent};
use adt_bus::DecisionBus;
use adt_core::{AgentId, AgentRng, ControlConfig, ScaledClock, SimClock, SimTime};
use adt_stats::{StatsError, StatsSink, TotalsReporter};
use tracing::{debug, info, warn};

use crate::{Policy, RealTimeInterval, SimError, SimObserver, SimResult};

/// The clock type every agent in a [`Sim`] shares.
pub type SharedClock = Rc<ScaledClock>;

/// What one [`Sim::step`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    /// 1-based index of this step.
    pub step:           u64,
    /// Simulated time after the clock advanced.
    pub now:            SimTime,
    /// `true` if the clock did not move and the agent phases were skipped.
    pub paused:         bool,
    /// Delayed jumps fired across all agents.
    pub jumps_fired:    usize,
    /// Decisions taken across all agents.
    pub decisions:      usize,
    /// Episodes that ended (and restarted) this step.
    pub episodes_ended: usize,
    /// `true` if the periodic flush ran this step.
    pub flushed:        bool,
}

/// The main simulation runner.
///
/// Holds the shared [`ScaledClock`], the [`DecisionBus`], every agent with
/// its own RNG, the policy, and the process-wide [`TotalsReporter`].
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<B: Body, S: StatsSink, P: Policy> {
    /// Global configuration (step delta, total steps, seed, …).
    pub config: ControlConfig,

    pub(crate) clock:    SharedClock,
    pub(crate) bus:      DecisionBus,
    pub(crate) agents:   Vec<DelayedAgent<B, S, SharedClock>>,
    pub(crate) rngs:     Vec<AgentRng>,
    pub(crate) policy:   P,
    pub(crate) totals:   TotalsReporter<Box<dyn StatsSink>>,
    pub(crate) interval: RealTimeInterval,
    pub(crate) steps:    u64,
    pub(crate) started:  bool,
}

impl<B: Body, S: StatsSink, P: Policy> Sim<B, S, P> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run `config.total_steps` steps, feeding each one a fixed step's worth
    /// of real time.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let real_dt = real_duration("fixed_delta_secs", self.config.fixed_delta_secs)?;
        while self.steps < self.config.total_steps {
            self.step(real_dt, observer)?;
        }
        self.finish(observer);
        Ok(())
    }

    /// Run exactly `n` steps from the current position (ignores
    /// `total_steps`).  Does not call `on_sim_end`.
    pub fn run_steps<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        let real_dt = real_duration("fixed_delta_secs", self.config.fixed_delta_secs)?;
        for _ in 0..n {
            self.step(real_dt, observer)?;
        }
        Ok(())
    }

    /// Advance one fixed step, `real_dt` of real time having passed since
    /// the previous one.
    ///
    /// The first call begins every agent's first episode before stepping.
    pub fn step<O: SimObserver>(&mut self, real_dt: Duration, observer: &mut O) -> SimResult<StepReport> {
        if !self.started {
            self.started = true;
            for agent in &mut self.agents {
                let summary = agent.on_episode_begin();
                observer.on_episode_begin(agent.id(), &summary);
            }
        }

        let now = self.clock.step();
        let dt = self.clock.tick_delta();
        self.steps += 1;
        let mut report = StepReport { step: self.steps, now, ..StepReport::default() };

        if dt.is_elapsed() {
            report.paused = true;
        } else {
            for agent in &mut self.agents {
                report.jumps_fired += agent.fixed_update().fired;
            }

            for agent in &mut self.agents {
                if agent.step_body(dt) {
                    let summary = agent.on_episode_begin();
                    report.episodes_ended += 1;
                    observer.on_episode_begin(agent.id(), &summary);
                }
            }

            for (agent, rng) in self.agents.iter_mut().zip(&mut self.rngs) {
                if !agent.wants_decision() {
                    continue;
                }
                let observation = agent.observe();
                let actions = self.policy.decide(agent.id(), &observation, rng);
                if let Err(err) = agent.on_action_received(&actions) {
                    warn!(agent = %agent.id(), %err, "decision could not be applied");
                }
                report.decisions += 1;
            }
        }

        if let Some(elapsed) = self.interval.advance(real_dt) {
            let written = self.totals.flush(elapsed)?;
            report.flushed = true;
            debug!(step = self.steps, elapsed_secs = elapsed.as_secs_f64(), written, "periodic flush");
            observer.on_periodic_flush(elapsed);
        }

        observer.on_step_end(&report);
        Ok(report)
    }

    /// Call `on_sim_end` and log the final state.
    pub fn finish<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.clock.now();
        info!(steps = self.steps, %now, agents = self.agents.len(), "simulation finished");
        observer.on_sim_end(self.steps, now);
    }

    // ── Time control ──────────────────────────────────────────────────────

    /// Clamped to `[0, 100]`.  Returns `true` if the scale changed.
    pub fn set_time_scale(&self, scale: f64) -> bool {
        let changed = self.clock.set_time_scale(scale);
        if changed {
            info!(time_scale = self.clock.time_scale(), "time scale changed");
        }
        changed
    }

    pub fn pause(&self) {
        self.clock.pause();
    }

    pub fn resume(&self) {
        self.clock.resume();
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn clock(&self) -> &ScaledClock {
        &self.clock
    }

    /// A handle to the clock, for observers that pause or rescale it.
    pub fn shared_clock(&self) -> SharedClock {
        Rc::clone(&self.clock)
    }

    /// The bus agents publish on.  Subscribe here for a debug overlay.
    pub fn bus(&self) -> &DecisionBus {
        &self.bus
    }

    pub fn agents(&self) -> &[DelayedAgent<B, S, SharedClock>] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&DelayedAgent<B, S, SharedClock>> {
        self.agents.get(id.index())
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut DelayedAgent<B, S, SharedClock>> {
        self.agents.get_mut(id.index())
    }

    pub fn totals(&self) -> &TotalsReporter<Box<dyn StatsSink>> {
        &self.totals
    }

    /// Steps taken so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Real time fed to the sim so far.
    pub fn real_elapsed(&self) -> Duration {
        self.interval.elapsed()
    }

    /// The first sink error from the totals reporter or any agent, if one
    /// occurred.  Each source is drained.
    pub fn take_stats_error(&mut self) -> Option<StatsError> {
        let mut first = self.totals.take_error();
        for agent in &mut self.agents {
            let err = agent.stats_mut().take_error();
            if first.is_none() {
                first = err;
            }
        }
        first
    }
}

/// `secs` as a real-time [`Duration`], or a config error if it has none.
pub(crate) fn real_duration(field: &str, secs: f64) -> SimResult<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|err| SimError::Config(format!("{field} = {secs} is not a usable duration: {err}")))
}
