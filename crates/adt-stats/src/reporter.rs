//! `TotalsReporter` — the process-wide aggregator, fed only by the bus.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use adt_bus::{DecisionBus, Subscription};
use tracing::debug;

use crate::{EpisodeStatAggregator, StatsError, StatsResult, StatsSink};

/// Counts decisions, gameplay time and episodes across every agent that
/// publishes on one [`DecisionBus`].
///
/// Agents never see this type; it learns about them only through
/// `DecisionTaken` and `EpisodeBegan` events.  The counters surface as
/// lifetime totals (and rates) in [`flush`][Self::flush].
///
/// Dropping the reporter unsubscribes it.
pub struct TotalsReporter<S: StatsSink> {
    aggregator: Rc<RefCell<EpisodeStatAggregator<S>>>,
    _decisions: Subscription,
    _episodes:  Subscription,
}

impl<S: StatsSink + 'static> TotalsReporter<S> {
    pub const DECISIONS:        &'static str = "Decisions";
    pub const GAMEPLAY_SECONDS: &'static str = "GameplaySeconds";
    pub const EPISODES:         &'static str = "Episodes";

    /// Subscribe `aggregator` to `bus`.
    pub fn attach(bus: &DecisionBus, aggregator: EpisodeStatAggregator<S>) -> Self {
        let aggregator = Rc::new(RefCell::new(aggregator));

        let weak: Weak<RefCell<EpisodeStatAggregator<S>>> = Rc::downgrade(&aggregator);
        let decisions = bus.on_decision(move |event| {
            let Some(agg) = weak.upgrade() else { return Ok(()) };
            let mut agg = agg.try_borrow_mut().map_err(|_| StatsError::Busy("totals aggregator"))?;
            agg.increment_one(Self::DECISIONS);
            agg.increment(Self::GAMEPLAY_SECONDS, event.elapsed_since_last_decision.secs());
            Ok(())
        });

        let weak = Rc::downgrade(&aggregator);
        let episodes = bus.on_episode_began(move |event| {
            let Some(agg) = weak.upgrade() else { return Ok(()) };
            let mut agg = agg.try_borrow_mut().map_err(|_| StatsError::Busy("totals aggregator"))?;
            agg.increment_one(Self::EPISODES);
            debug!(agent = %event.agent, episode = event.episode, "totals: episode counted");
            Ok(())
        });

        Self { aggregator, _decisions: decisions, _episodes: episodes }
    }

    /// Periodic flush of the lifetime totals and their rates over
    /// `elapsed` real time.
    pub fn flush(&self, elapsed: Duration) -> StatsResult<usize> {
        let mut agg = self
            .aggregator
            .try_borrow_mut()
            .map_err(|_| StatsError::Busy("totals aggregator"))?;
        Ok(agg.on_periodic_flush(elapsed))
    }

    pub fn lifetime_total(&self, name: &str) -> Option<f64> {
        self.aggregator.borrow().lifetime_total(name)
    }

    /// First sink error seen by the underlying aggregator, if any.
    pub fn take_error(&self) -> Option<StatsError> {
        self.aggregator.borrow_mut().take_error()
    }

    /// Unsubscribe and hand back the aggregator.
    ///
    /// Fails with `Busy` when called from inside one of the reporter's own
    /// callbacks.
    pub fn detach(self) -> StatsResult<EpisodeStatAggregator<S>> {
        let Self { aggregator, _decisions: decisions, _episodes: episodes } = self;
        drop(decisions);
        drop(episodes);
        Rc::try_unwrap(aggregator)
            .map(RefCell::into_inner)
            .map_err(|_| StatsError::Busy("totals aggregator"))
    }
}
