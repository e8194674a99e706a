//! The `DecisionBus` and its RAII `Subscription` guard.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use adt_core::EffectResult;
use tracing::warn;

use crate::{BusEvent, DecisionEvent, EpisodeEvent, EventKind, ObservationEvent};

type Callback = Rc<RefCell<dyn FnMut(&BusEvent<'_>) -> EffectResult>>;

struct Entry {
    id:       u64,
    kind:     EventKind,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    /// Kept in subscription order; dispatch walks it front to back.
    entries: Vec<Entry>,
}

impl Registry {
    fn take(&mut self, id: u64) -> Option<Entry> {
        let pos = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(pos))
    }
}

/// Removes `id` from the registry without dropping the callback while the
/// registry is borrowed (the callback may own other subscriptions).
fn unregister(registry: &RefCell<Registry>, id: u64) -> bool {
    let removed = registry.borrow_mut().take(id);
    removed.is_some()
}

/// Outcome of one [`DecisionBus::publish`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Callbacks invoked.
    pub delivered: usize,
    /// Invoked callbacks that returned an error.
    pub failed:    usize,
    /// Callbacks skipped because they were already running further up the
    /// stack (a re-entrant publish reached them again).
    pub skipped:   usize,
}

/// Synchronous publish/subscribe channel for [`BusEvent`]s.
///
/// Cloning is cheap and yields a handle to the same set of subscribers.
#[derive(Clone, Default)]
pub struct DecisionBus {
    registry: Rc<RefCell<Registry>>,
}

impl DecisionBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for events of `kind`.
    ///
    /// The callback stays registered for as long as the returned
    /// [`Subscription`] lives.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> Subscription
    where
        F: FnMut(&BusEvent<'_>) -> EffectResult + 'static,
    {
        let callback: Callback = Rc::new(RefCell::new(callback));
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push(Entry { id, kind, callback });
        Subscription { id, kind, registry: Rc::downgrade(&self.registry) }
    }

    /// Typed shorthand for [`EventKind::DecisionTaken`].
    pub fn on_decision<F>(&self, mut callback: F) -> Subscription
    where
        F: FnMut(&DecisionEvent<'_>) -> EffectResult + 'static,
    {
        self.subscribe(EventKind::DecisionTaken, move |event| match event {
            BusEvent::DecisionTaken(e) => callback(e),
            _ => Ok(()),
        })
    }

    /// Typed shorthand for [`EventKind::EpisodeBegan`].
    pub fn on_episode_began<F>(&self, mut callback: F) -> Subscription
    where
        F: FnMut(&EpisodeEvent) -> EffectResult + 'static,
    {
        self.subscribe(EventKind::EpisodeBegan, move |event| match event {
            BusEvent::EpisodeBegan(e) => callback(e),
            _ => Ok(()),
        })
    }

    /// Typed shorthand for [`EventKind::ObservationsCollected`].
    pub fn on_observations<F>(&self, mut callback: F) -> Subscription
    where
        F: FnMut(&ObservationEvent<'_>) -> EffectResult + 'static,
    {
        self.subscribe(EventKind::ObservationsCollected, move |event| match event {
            BusEvent::ObservationsCollected(e) => callback(e),
            _ => Ok(()),
        })
    }

    /// Remove `subscription`.
    ///
    /// `Ok(false)` means it had already been removed.  A subscription that
    /// belongs to a different bus is handed back untouched as `Err`.
    pub fn unsubscribe(&self, subscription: Subscription) -> Result<bool, Subscription> {
        let ours = subscription
            .registry
            .upgrade()
            .is_some_and(|r| Rc::ptr_eq(&r, &self.registry));
        if !ours {
            return Err(subscription);
        }
        Ok(subscription.cancel())
    }

    /// Invoke every callback subscribed to `event.kind()`, in subscription
    /// order.  Publishing with no subscribers is a no-op.
    ///
    /// The subscriber list is captured before the first callback runs:
    /// callbacks removed mid-dispatch still receive this event, callbacks
    /// added mid-dispatch do not.  A failing callback is logged and does not
    /// stop the others.
    pub fn publish(&self, event: &BusEvent<'_>) -> PublishReport {
        let kind = event.kind();
        let snapshot: Vec<(u64, Callback)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| (e.id, Rc::clone(&e.callback)))
            .collect();

        let mut report = PublishReport::default();
        for (id, callback) in &snapshot {
            let Ok(mut callback) = callback.try_borrow_mut() else {
                report.skipped += 1;
                warn!(%kind, subscriber = id, "re-entrant publish skipped a running subscriber");
                continue;
            };
            report.delivered += 1;
            if let Err(err) = (&mut *callback)(event) {
                report.failed += 1;
                warn!(%kind, subscriber = id, agent = %event.agent(), %err, "bus subscriber failed");
            }
        }
        report
    }

    /// Number of live subscriptions for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.registry.borrow().entries.iter().filter(|e| e.kind == kind).count()
    }
}

/// Keeps a callback registered on a [`DecisionBus`]; dropping it
/// unsubscribes.
///
/// Holds only a weak reference to the bus, so dropping the bus before its
/// subscriptions is fine.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id:       u64,
    kind:     EventKind,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// `true` while the callback is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.borrow().entries.iter().any(|e| e.id == self.id))
    }

    /// Unsubscribe now.  Returns `false` if the bus is gone or the callback
    /// was already removed.
    pub fn cancel(mut self) -> bool {
        self.detach()
    }

    fn detach(&mut self) -> bool {
        let registry = std::mem::take(&mut self.registry);
        match registry.upgrade() {
            Some(r) => unregister(&r, self.id),
            None    => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
