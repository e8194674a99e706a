//! `adt-schedule` — fire an action at a precise future simulated instant.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`handle`]    | `ActionHandle` (opaque, carries its own due time)         |
//! | [`queue`]     | `PendingAction<A>`, `ScheduleQueue<A>` (sorted `VecDeque`)|
//! | [`scheduler`] | `DelayedActionScheduler<A, C>`, `TickReport`, `BoxedEffect` |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                      |
//!
//! # Poll model (summary)
//!
//! ```text
//! schedule(delay, a)  → due_at = clock.now() + delay; ordered insert
//! tick(now)           → pop every entry with due_at ≤ now, front to back,
//!                       and hand it to the caller's effect exactly once
//! cancel_all()        → drop everything still pending (episode reset)
//! ```
//!
//! Each `PendingAction` ends either `Fired` (popped by a tick) or
//! `Cancelled` (removed by `cancel`/`cancel_all`); both are terminal, and an
//! entry leaves the queue the moment it reaches either state.

pub mod error;
pub mod handle;
pub mod queue;
pub mod scheduler;

#[cfg(test)]
mod tests;

pub use error::{ScheduleError, ScheduleResult};
pub use handle::ActionHandle;
pub use queue::{PendingAction, ScheduleQueue};
pub use scheduler::{BoxedEffect, DelayedActionScheduler, TickReport};
