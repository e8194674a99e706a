//! Fluent builder for constructing a [`Sim`].

use std::rc::Rc;

use adt_agent::{AgentConfig, Body, DelayedAgent};
use adt_bus::DecisionBus;
use adt_core::{AgentId, AgentRng, ControlConfig};
use adt_stats::{EpisodeStatAggregator, NoopSink, StatsSink, TotalsReporter};
use tracing::info;

use crate::sim::real_duration;
use crate::{Policy, RealTimeInterval, Sim, SimError, SimResult};

/// Fluent builder for [`Sim<B, S, P>`].
///
/// # Required inputs
///
/// - [`ControlConfig`]: step delta, time scale, decision period, …
/// - `P: Policy`: where actions come from
/// - at least one `(B: Body, S: StatsSink)` pair via [`agent`][Self::agent]
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                                   |
/// |----------------------|-------------------------------------------|
/// | `.agent_config(c)`   | `AgentConfig::from_control(&config)`      |
/// | `.totals_sink(s)`    | `NoopSink`                                |
/// | `.bus(b)`            | a fresh `DecisionBus`                     |
pub struct SimBuilder<B: Body, S: StatsSink, P: Policy> {
    config:       ControlConfig,
    policy:       P,
    agents:       Vec<(B, S)>,
    agent_config: Option<AgentConfig>,
    totals_sink:  Option<Box<dyn StatsSink>>,
    bus:          Option<DecisionBus>,
}

impl<B: Body, S: StatsSink, P: Policy> SimBuilder<B, S, P> {
    pub fn new(config: ControlConfig, policy: P) -> Self {
        Self {
            config,
            policy,
            agents:       Vec::new(),
            agent_config: None,
            totals_sink:  None,
            bus:          None,
        }
    }

    /// Add an agent with its body and the sink its episode stats go to.
    /// Agents get consecutive ids in the order they are added.
    pub fn agent(mut self, body: B, sink: S) -> Self {
        self.agents.push((body, sink));
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = (B, S)>) -> Self {
        self.agents.extend(agents);
        self
    }

    /// Override reward shaping.  Its cadence must match the control config.
    pub fn agent_config(mut self, config: AgentConfig) -> Self {
        self.agent_config = Some(config);
        self
    }

    /// Sink for the process-wide totals and rates.
    pub fn totals_sink(mut self, sink: Box<dyn StatsSink>) -> Self {
        self.totals_sink = Some(sink);
        self
    }

    /// Use an existing bus (e.g. one a debug overlay already subscribed to).
    pub fn bus(mut self, bus: DecisionBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Validate inputs, wire the agents to the clock and bus, and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<B, S, P>> {
        self.config.validate()?;
        real_duration("fixed_delta_secs", self.config.fixed_delta_secs)?;
        if self.agents.is_empty() {
            return Err(SimError::Config("at least one agent is required".into()));
        }

        let agent_config = match self.agent_config {
            Some(c) => {
                if c.decision_period != self.config.decision_period
                    || c.fixed_delta_secs != self.config.fixed_delta_secs
                {
                    return Err(SimError::Config(format!(
                        "agent cadence ({} steps of {}s) does not match control config ({} steps of {}s)",
                        c.decision_period,
                        c.fixed_delta_secs,
                        self.config.decision_period,
                        self.config.fixed_delta_secs,
                    )));
                }
                c
            }
            None => AgentConfig::from_control(&self.config),
        };

        let clock = Rc::new(self.config.make_clock());
        let bus = self.bus.unwrap_or_default();
        let totals_sink = self.totals_sink.unwrap_or_else(|| Box::new(NoopSink));
        let totals = TotalsReporter::attach(&bus, EpisodeStatAggregator::new(totals_sink));

        let mut agents = Vec::with_capacity(self.agents.len());
        let mut rngs = Vec::with_capacity(self.agents.len());
        for (i, (body, sink)) in self.agents.into_iter().enumerate() {
            let id = AgentId::try_from(i)
                .map_err(|_| SimError::Config(format!("too many agents ({i})")))?;
            let agent = DelayedAgent::new(
                id,
                body,
                agent_config.clone(),
                Rc::clone(&clock),
                sink,
                bus.clone(),
            )?;
            agents.push(agent);
            rngs.push(AgentRng::new(self.config.seed, id));
        }

        let interval = RealTimeInterval::new(real_duration("flush_interval_secs", self.config.flush_interval_secs)?);
        info!(
            agents = agents.len(),
            total_steps = self.config.total_steps,
            seed = self.config.seed,
            "simulation built"
        );

        Ok(Sim {
            config: self.config,
            clock,
            bus,
            agents,
            rngs,
            policy: self.policy,
            totals,
            interval,
            steps: 0,
            started: false,
        })
    }
}
