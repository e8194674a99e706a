//! `adt-agent` — an agent that acts on a policy decision after a
//! policy-chosen delay.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`body`]      | `Body` trait (physics/environment seam), `BodyEvent`, `JumpOutcome` |
//! | [`delay`]     | `delay_from_action` — continuous action → jump delay         |
//! | [`requester`] | `DecisionRequester` — one decision every N fixed steps       |
//! | [`config`]    | `AgentConfig` (rewards, decision period, replace policy)     |
//! | [`agent`]     | `DelayedAgent<B, S, C>`                                      |
//! | [`error`]     | `AgentError`, `AgentResult<T>`                               |
//!
//! # Per-step call order
//!
//! The driver (normally `adt-sim`) calls, once per fixed step:
//!
//! ```text
//! fixed_update()        → fire due jumps (Body::try_jump)
//! step_body(dt)         → Body::step; obstacle/collision events
//! on_episode_begin()    → only if the episode ended this step
//! wants_decision()      → on_action_received(policy(observe()))
//! ```
//!
//! An agent owns its scheduler and its per-episode aggregator outright; the
//! only thing it shares is a clone of the [`DecisionBus`][adt_bus::DecisionBus].

pub mod agent;
pub mod body;
pub mod config;
pub mod delay;
pub mod error;
pub mod requester;

#[cfg(test)]
mod tests;

pub use agent::{DelayedAgent, DelayedJump, EpisodeSummary, stat};
pub use body::{Body, BodyEvent, JumpOutcome};
pub use config::AgentConfig;
pub use delay::delay_from_action;
pub use error::{AgentError, AgentResult};
pub use requester::DecisionRequester;
