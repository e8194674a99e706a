//! The `Policy` trait — where actions come from.

use adt_core::{ActionBuffers, AgentId, AgentRng};

/// Chooses an agent's actions from its observation.
///
/// Called once per requested decision.  The output layout the agent expects
/// is `continuous[0]` = jump delay in `[-1, 1]` and `discrete[0]` = 1 to
/// jump.
///
/// Any `FnMut(AgentId, &[f32], &mut AgentRng) -> ActionBuffers` is a policy.
pub trait Policy {
    fn decide(&mut self, agent: AgentId, observation: &[f32], rng: &mut AgentRng) -> ActionBuffers;
}

impl<F> Policy for F
where
    F: FnMut(AgentId, &[f32], &mut AgentRng) -> ActionBuffers,
{
    fn decide(&mut self, agent: AgentId, observation: &[f32], rng: &mut AgentRng) -> ActionBuffers {
        self(agent, observation, rng)
    }
}

/// Never jumps.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPolicy;

impl Policy for NoopPolicy {
    fn decide(&mut self, _agent: AgentId, _observation: &[f32], _rng: &mut AgentRng) -> ActionBuffers {
        ActionBuffers::new(vec![0.0], vec![0])
    }
}

/// Jumps with probability `jump_probability`, after a uniformly random
/// delay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomPolicy {
    pub jump_probability: f64,
}

impl Default for RandomPolicy {
    fn default() -> Self {
        Self { jump_probability: 0.2 }
    }
}

impl Policy for RandomPolicy {
    fn decide(&mut self, _agent: AgentId, _observation: &[f32], rng: &mut AgentRng) -> ActionBuffers {
        let jump = rng.gen_bool(self.jump_probability);
        let delay: f32 = rng.gen_range(-1.0..=1.0);
        ActionBuffers::new(vec![delay], vec![i32::from(jump)])
    }
}
