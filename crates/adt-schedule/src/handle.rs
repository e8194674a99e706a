//! Opaque handle returned by `DelayedActionScheduler::schedule`.

use std::fmt;

use adt_core::SimTime;

/// Reference to one scheduled action, used only to cancel it or query its
/// remaining time.
///
/// The handle records the entry's immutable due time, so remaining-time
/// queries keep working after the entry fired or was cancelled without the
/// scheduler having to remember settled entries.  Handles are meaningful
/// only to the scheduler that issued them, and only a scheduler can create
/// one, so they serialize for logging but never deserialize.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActionHandle {
    seq:    u64,
    due_at: SimTime,
}

impl ActionHandle {
    #[inline]
    pub(crate) fn new(seq: u64, due_at: SimTime) -> Self {
        Self { seq, due_at }
    }

    /// Issue order within the owning scheduler; also the FIFO tie-breaker.
    #[inline]
    pub fn seq(self) -> u64 {
        self.seq
    }

    #[inline]
    pub fn due_at(self) -> SimTime {
        self.due_at
    }
}

impl fmt::Display for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.seq, self.due_at)
    }
}
