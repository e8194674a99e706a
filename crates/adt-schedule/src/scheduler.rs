//! The `DelayedActionScheduler` and its per-tick poll.

use adt_core::{AgentId, EffectResult, SimClock, SimDuration, SimTime};
use tracing::{debug, warn};

use crate::{ActionHandle, PendingAction, ScheduleError, ScheduleQueue, ScheduleResult};

/// A boxed one-shot effect, for schedulers that store closures directly.
pub type BoxedEffect = Box<dyn FnOnce() -> EffectResult>;

/// What one [`tick`][DelayedActionScheduler::tick_with] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Entries popped and handed to the effect (failed ones included).
    pub fired:  usize,
    /// Of those, how many returned an error.
    pub failed: usize,
}

/// Per-agent queue of actions that fire at a future simulated instant.
///
/// `A` is the payload handed back to the caller's effect when the entry
/// fires; `C` is the injected clock used to turn a delay into a due time.
///
/// # Contract
///
/// - `tick_with` must be called once per fixed simulation step, in a fixed
///   order relative to the caller's physics and decision logic.
/// - Effects run synchronously on the calling thread, in ascending due-time
///   order, exactly once each.  `tick_with` borrows the scheduler mutably for
///   its whole duration, so an effect cannot re-enter it.
/// - A failing effect is logged and counted; the remaining due entries still
///   fire in the same call.
pub struct DelayedActionScheduler<A, C: SimClock> {
    clock:    C,
    queue:    ScheduleQueue<A>,
    next_seq: u64,
    owner:    AgentId,
}

impl<A, C: SimClock> DelayedActionScheduler<A, C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            queue:    ScheduleQueue::new(),
            next_seq: 0,
            owner:    AgentId::INVALID,
        }
    }

    /// Tag log lines with the owning agent.
    pub fn with_owner(mut self, owner: AgentId) -> Self {
        self.owner = owner;
        self
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Queue `payload` to fire `delay` after the clock's current time.
    ///
    /// Fails with [`ScheduleError::InvalidDelay`] for a negative or NaN delay.
    /// A zero delay fires on the next tick whose `now` is not earlier than
    /// the current time.
    pub fn schedule(&mut self, delay: SimDuration, payload: A) -> ScheduleResult<ActionHandle> {
        if delay.secs().is_nan() || delay.is_negative() {
            return Err(ScheduleError::InvalidDelay(delay.secs()));
        }
        let now = self.clock.now();
        let handle = ActionHandle::new(self.next_seq, now + delay);
        self.next_seq += 1;
        self.queue.insert(PendingAction::new(handle, payload));
        debug!(agent = %self.owner, %handle, %now, pending = self.queue.len(), "action scheduled");
        Ok(handle)
    }

    /// `due_at - now`.  Zero or negative once the entry is due (or has fired).
    pub fn remaining_time(&self, handle: ActionHandle) -> ScheduleResult<SimDuration> {
        self.check_issued(handle)?;
        Ok(handle.due_at() - self.clock.now())
    }

    /// Remove the entry for `handle`.
    ///
    /// Returns `Ok(true)` if it was pending, `Ok(false)` if it had already
    /// fired or been cancelled (a no-op, not an error).
    pub fn cancel(&mut self, handle: ActionHandle) -> ScheduleResult<bool> {
        self.check_issued(handle)?;
        let removed = self.queue.remove(handle).is_some();
        if removed {
            debug!(agent = %self.owner, %handle, "action cancelled");
        }
        Ok(removed)
    }

    /// Drop every pending entry.  Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.queue.clear();
        if cancelled > 0 {
            debug!(agent = %self.owner, cancelled, "pending actions cleared");
        }
        cancelled
    }

    /// `true` while `handle` is still queued.
    pub fn is_pending(&self, handle: ActionHandle) -> bool {
        self.queue.contains(handle)
    }

    /// Pop and fire every entry with `due_at <= now`, in ascending order.
    ///
    /// If `now` went backwards nothing fires early; if it jumped forward by
    /// several steps, everything that became due fires in this one call.
    pub fn tick_with<F>(&mut self, now: SimTime, mut effect: F) -> TickReport
    where
        F: FnMut(ActionHandle, A) -> EffectResult,
    {
        let mut report = TickReport::default();
        while let Some(action) = self.queue.pop_due(now) {
            let (handle, payload) = action.into_parts();
            report.fired += 1;
            debug!(agent = %self.owner, %handle, %now, lateness = %(now - handle.due_at()), "action fired");
            if let Err(err) = effect(handle, payload) {
                report.failed += 1;
                warn!(agent = %self.owner, %handle, %now, %err, "delayed action failed");
            }
        }
        report
    }

    /// The earliest pending due time, or `None` if nothing is queued.
    pub fn next_due(&self) -> Option<SimTime> {
        self.queue.next_due()
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingAction<A>> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn check_issued(&self, handle: ActionHandle) -> ScheduleResult<()> {
        if handle.seq() >= self.next_seq {
            return Err(ScheduleError::UnknownHandle(handle));
        }
        Ok(())
    }
}

impl<C: SimClock> DelayedActionScheduler<BoxedEffect, C> {
    /// Convenience for closure payloads.
    pub fn schedule_fn<F>(&mut self, delay: SimDuration, effect: F) -> ScheduleResult<ActionHandle>
    where
        F: FnOnce() -> EffectResult + 'static,
    {
        self.schedule(delay, Box::new(effect))
    }

    /// Fire every due closure.
    pub fn tick(&mut self, now: SimTime) -> TickReport {
        self.tick_with(now, |_, effect| effect())
    }
}
