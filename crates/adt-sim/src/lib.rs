//! `adt-sim` — the fixed-step driver loop.
//!
//! # Step order
//!
//! ```text
//! for step in 0..config.total_steps:
//!   ① Clock     — ScaledClock::step (time scale and pause applied).
//!   ② Fire      — every agent's fixed_update: due delayed jumps run.
//!   ③ Physics   — every agent's Body::step; obstacle and collision events.
//!   ④ Episodes  — agents whose episode ended call on_episode_begin
//!                 (flush + reset) before any new decision is taken.
//!   ⑤ Decide    — agents whose DecisionRequester fires query the Policy.
//!   ⑥ Flush     — when the real-time interval elapses, the process-wide
//!                 TotalsReporter writes totals and per-second rates.
//! ```
//!
//! Phases ②–⑤ are skipped while the clock is paused or the time scale is 0;
//! real time (and so the periodic flush) keeps going.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let mut sim = SimBuilder::new(config, RandomPolicy::default())
//!     .agent(MyBody::new(), NoopSink)
//!     .totals_sink(Box::new(MemorySink::new()))
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod interval;
pub mod observer;
pub mod policy;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use interval::RealTimeInterval;
pub use observer::{NoopObserver, SimObserver};
pub use policy::{NoopPolicy, Policy, RandomPolicy};
pub use sim::{SharedClock, Sim, StepReport};
