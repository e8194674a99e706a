//! `adt-core` — foundational types for the agent debug toolkit.
//!
//! This crate is a dependency of every other `adt-*` crate.  It has no
//! `adt-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `AgentId`                                                  |
//! | [`time`]    | `SimTime`, `SimDuration`                                   |
//! | [`clock`]   | `SimClock` trait, `ManualClock`, `ScaledClock`             |
//! | [`action`]  | `ActionBuffers` (continuous + discrete policy output)      |
//! | [`config`]  | `ControlConfig`                                            |
//! | [`rng`]     | `AgentRng` (per-agent), `SimRng` (global)                  |
//! | [`error`]   | `CoreError`, `CoreResult`, `EffectResult`                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod action;
pub mod clock;
pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use action::ActionBuffers;
pub use clock::{ManualClock, ScaledClock, SimClock, TIME_SCALE_UPPER_LIMIT};
pub use config::ControlConfig;
pub use error::{BoxError, CoreError, CoreResult, EffectResult};
pub use ids::AgentId;
pub use rng::{AgentRng, SimRng};
pub use time::{SimDuration, SimTime};
