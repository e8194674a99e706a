//! `ScheduleQueue` — pending actions kept sorted by due time.
//!
//! # Why a sorted `VecDeque`
//!
//! Every tick the scheduler asks "what is due now?".  Keeping the queue
//! sorted on insert means that question is answered by popping from the
//! front until the first entry that is still in the future: O(k) for the
//! k expired entries, with no per-tick sort or scan of the whole queue.
//!
//! Insertion uses a binary search for the position *after* every entry with
//! the same or earlier due time, so equal due times keep their scheduling
//! order (FIFO).  A per-agent queue rarely holds more than a handful of
//! entries, so the `O(n)` shift on insert is negligible.

use std::collections::VecDeque;

use adt_core::SimTime;

use crate::ActionHandle;

/// One scheduled action: its handle (id + immutable due time) and the
/// caller's payload.
#[derive(Debug)]
pub struct PendingAction<A> {
    handle:  ActionHandle,
    payload: A,
}

impl<A> PendingAction<A> {
    pub fn new(handle: ActionHandle, payload: A) -> Self {
        Self { handle, payload }
    }

    #[inline]
    pub fn handle(&self) -> ActionHandle {
        self.handle
    }

    #[inline]
    pub fn due_at(&self) -> SimTime {
        self.handle.due_at()
    }

    #[inline]
    pub fn payload(&self) -> &A {
        &self.payload
    }

    pub fn into_parts(self) -> (ActionHandle, A) {
        (self.handle, self.payload)
    }
}

/// Pending actions in ascending `due_at` order, ties in insertion order.
#[derive(Debug)]
pub struct ScheduleQueue<A> {
    inner: VecDeque<PendingAction<A>>,
}

impl<A> Default for ScheduleQueue<A> {
    fn default() -> Self {
        Self { inner: VecDeque::new() }
    }
}

impl<A> ScheduleQueue<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ordered insert after every entry due at or before `action.due_at()`.
    pub fn insert(&mut self, action: PendingAction<A>) {
        let due_at = action.due_at();
        let at = self.inner.partition_point(|p| p.due_at() <= due_at);
        self.inner.insert(at, action);
    }

    /// Pop the front entry if it is due at or before `now`.
    pub fn pop_due(&mut self, now: SimTime) -> Option<PendingAction<A>> {
        if self.inner.front()?.due_at() <= now {
            self.inner.pop_front()
        } else {
            None
        }
    }

    /// Remove the entry for `handle`, if it is still queued.
    ///
    /// The handle's due time narrows the search to the run of entries with
    /// that exact due time.
    pub fn remove(&mut self, handle: ActionHandle) -> Option<PendingAction<A>> {
        let due_at = handle.due_at();
        let start = self.inner.partition_point(|p| p.due_at() < due_at);
        let offset = self
            .inner
            .range(start..)
            .take_while(|p| p.due_at() == due_at)
            .position(|p| p.handle() == handle)?;
        self.inner.remove(start + offset)
    }

    pub fn contains(&self, handle: ActionHandle) -> bool {
        let due_at = handle.due_at();
        let start = self.inner.partition_point(|p| p.due_at() < due_at);
        self.inner
            .range(start..)
            .take_while(|p| p.due_at() == due_at)
            .any(|p| p.handle() == handle)
    }

    /// Drop every entry, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let n = self.inner.len();
        self.inner.clear();
        n
    }

    /// The earliest due time, or `None` if empty.
    pub fn next_due(&self) -> Option<SimTime> {
        self.inner.front().map(PendingAction::due_at)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingAction<A>> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
