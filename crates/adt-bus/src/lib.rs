//! `adt-bus` — fan decision and episode events out to observers the agent
//! does not know about.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                        |
//! |-----------|-----------------------------------------------------------------|
//! | [`event`] | `EventKind`, `BusEvent`, and the decision, episode and          |
//! |           | observation payloads                                            |
//! | [`bus`]   | `DecisionBus`, `Subscription` (RAII), `PublishReport`           |
//!
//! # Design notes
//!
//! The bus is an explicit instance handed to whoever needs it, not a global:
//! agents publish through a clone of it, and the stats aggregator and any
//! debug overlay subscribe to it.  A [`Subscription`] unsubscribes when it is
//! dropped, so a component's subscriptions end with the component.
//!
//! Dispatch is synchronous, on the caller's thread, in subscription order,
//! over a snapshot of the subscriber list taken when `publish` starts.
//! Callbacks may subscribe, unsubscribe, or publish again from inside a
//! dispatch without disturbing the one in progress.

pub mod bus;
pub mod event;


pub use bus::{DecisionBus, PublishReport, Subscription};
pub use event::{BusEvent, DecisionEvent, EpisodeEvent, EventKind, ObservationEvent};
