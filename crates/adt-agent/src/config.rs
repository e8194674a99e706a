//! Per-agent configuration.

use adt_core::{ControlConfig, SimDuration};
use adt_stats::AggregatorConfig;

use crate::{AgentError, AgentResult};

/// Reward shaping and decision cadence for one [`DelayedAgent`][crate::DelayedAgent].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    /// Fixed steps between decisions.
    pub decision_period: u32,

    /// Unscaled simulated seconds per fixed step.
    pub fixed_delta_secs: f64,

    /// Cancel the pending jump when a new one is scheduled.
    pub replace_pending: bool,

    /// Reward per simulated second survived, paid at each decision.
    pub survival_reward_rate: f64,

    /// Reward for a jump the body carried out.
    pub executed_jump_reward: f64,

    /// Reward for a jump attempted while airborne.
    pub invalid_jump_reward: f64,

    /// Reward for an obstacle passing the body.
    pub obstacle_cleared_reward: f64,

    /// Reward for hitting an obstacle.
    pub collision_reward: f64,

    /// Stat name prefixes for this agent's aggregator.
    pub stats: AggregatorConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            decision_period:         5,
            fixed_delta_secs:        0.02,
            replace_pending:         true,
            survival_reward_rate:    0.1,
            executed_jump_reward:    -0.01,
            invalid_jump_reward:     -0.1,
            obstacle_cleared_reward: 1.0,
            collision_reward:        -1.0,
            stats:                   AggregatorConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Take cadence and replace policy from the run-wide config, rewards
    /// from the defaults.
    pub fn from_control(control: &ControlConfig) -> Self {
        Self {
            decision_period:  control.decision_period,
            fixed_delta_secs: control.fixed_delta_secs,
            replace_pending:  control.replace_pending,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> AgentResult<()> {
        if self.decision_period < 1 {
            return Err(AgentError::Config("decision_period must be at least 1".into()));
        }
        if !self.fixed_delta_secs.is_finite() || self.fixed_delta_secs <= 0.0 {
            return Err(AgentError::Config(format!(
                "fixed_delta_secs must be positive, got {}",
                self.fixed_delta_secs
            )));
        }
        Ok(())
    }

    /// Longest delay a decision can ask for: two steps short of the
    /// decision interval, so the jump fires before the next decision.
    /// Zero for periods of two steps or fewer.
    pub fn max_jump_delay(&self) -> SimDuration {
        let steps = f64::from(self.decision_period.saturating_sub(2));
        SimDuration(steps * self.fixed_delta_secs)
    }
}
