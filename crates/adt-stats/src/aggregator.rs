//! `EpisodeStatAggregator<S>` — per-episode counters plus lifetime totals.

use std::collections::BTreeMap;
use std::time::Duration;

use adt_core::AgentId;
use tracing::{debug, info, warn};

use crate::sink::{Aggregation, StatsSink};
use crate::StatsError;

/// Names under which flushed values reach the sink.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AggregatorConfig {
    /// Prefix of episode flushes, sent as [`Aggregation::Histogram`].
    pub episode_prefix: String,
    /// Prefix of raw lifetime totals, sent as [`Aggregation::MostRecent`].
    pub totals_prefix:  String,
    /// Prefix of lifetime rates, sent as [`Aggregation::Average`].
    pub rate_prefix:    String,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            episode_prefix: "PerEpisode/".to_owned(),
            totals_prefix:  "Totals/".to_owned(),
            rate_prefix:    "PerSecond/".to_owned(),
        }
    }
}

/// Accumulates named counters for the current episode and for the life of
/// the process, and flushes them into a [`StatsSink`].
///
/// Both maps are keyed by name in a `BTreeMap`, so every flush emits names
/// in lexicographic order.  A key, once seen, is never removed: episodes in
/// which it was not touched flush `0`.
///
/// Sink errors are stored rather than returned, mirroring how the rest of
/// the flush keeps going; check [`take_error`][Self::take_error] after a run.
pub struct EpisodeStatAggregator<S: StatsSink> {
    sink:             S,
    config:           AggregatorConfig,
    owner:            AgentId,
    episode:          BTreeMap<String, f64>,
    lifetime:         BTreeMap<String, f64>,
    episodes_flushed: u64,
    last_error:       Option<StatsError>,
}

impl<S: StatsSink> EpisodeStatAggregator<S> {
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, AggregatorConfig::default())
    }

    pub fn with_config(sink: S, config: AggregatorConfig) -> Self {
        Self {
            sink,
            config,
            owner:            AgentId::INVALID,
            episode:          BTreeMap::new(),
            lifetime:         BTreeMap::new(),
            episodes_flushed: 0,
            last_error:       None,
        }
    }

    /// Tag log lines with the owning agent.
    pub fn with_owner(mut self, owner: AgentId) -> Self {
        self.owner = owner;
        self
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Add `value` to both the episode counter and the lifetime total of
    /// `name`, creating them at 0 on first use.
    pub fn increment(&mut self, name: &str, value: f64) {
        // Lookup before insert keeps the common path allocation-free.
        match self.episode.get_mut(name) {
            Some(v) => *v += value,
            None    => {
                self.episode.insert(name.to_owned(), value);
            }
        }
        match self.lifetime.get_mut(name) {
            Some(v) => *v += value,
            None    => {
                self.lifetime.insert(name.to_owned(), value);
            }
        }
    }

    /// `increment(name, 1.0)`.
    pub fn increment_one(&mut self, name: &str) {
        self.increment(name, 1.0);
    }

    /// Close the current episode: send every known key's episode value to
    /// the sink as a histogram observation, then zero every key in place.
    ///
    /// Returns the number of observations sent.  Lifetime totals are not
    /// touched.
    pub fn on_episode_begin(&mut self) -> usize {
        let mut sent = 0;
        for (name, value) in &self.episode {
            let full = format!("{}{name}", self.config.episode_prefix);
            let result = self.sink.record(&full, *value, Aggregation::Histogram);
            sent += 1;
            if let Err(source) = result {
                warn!(agent = %self.owner, stat = %full, %source, "episode flush write failed");
                if self.last_error.is_none() {
                    self.last_error = Some(StatsError::Sink { name: full, source });
                }
            }
        }
        for value in self.episode.values_mut() {
            *value = 0.0;
        }
        self.episodes_flushed += 1;
        info!(agent = %self.owner, episode = self.episodes_flushed, keys = sent, "episode stats flushed");
        sent
    }

    /// Report every lifetime total divided by `elapsed` as a rate, plus the
    /// raw total.  Counters are read, never modified.
    ///
    /// With a zero `elapsed` the rates are undefined and only the totals are
    /// sent.  Returns the number of observations sent.
    pub fn on_periodic_flush(&mut self, elapsed: Duration) -> usize {
        let secs = elapsed.as_secs_f64();
        let with_rates = secs > 0.0;
        if !with_rates {
            warn!(agent = %self.owner, "periodic flush with zero elapsed time; rates skipped");
        }

        let mut sent = 0;
        for (name, total) in &self.lifetime {
            let mut writes = Vec::with_capacity(2);
            if with_rates {
                writes.push((format!("{}{name}", self.config.rate_prefix), total / secs, Aggregation::Average));
            }
            writes.push((format!("{}{name}", self.config.totals_prefix), *total, Aggregation::MostRecent));

            for (full, value, aggregation) in writes {
                sent += 1;
                if let Err(source) = self.sink.record(&full, value, aggregation) {
                    warn!(agent = %self.owner, stat = %full, %source, "periodic flush write failed");
                    if self.last_error.is_none() {
                        self.last_error = Some(StatsError::Sink { name: full, source });
                    }
                }
            }
        }
        debug!(agent = %self.owner, elapsed_secs = secs, writes = sent, "periodic stats flushed");
        sent
    }

    /// Current-episode value of `name`, or `None` if it was never
    /// incremented.
    pub fn episode_value(&self, name: &str) -> Option<f64> {
        self.episode.get(name).copied()
    }

    /// Lifetime total of `name`, or `None` if it was never incremented.
    pub fn lifetime_total(&self, name: &str) -> Option<f64> {
        self.lifetime.get(name).copied()
    }

    /// Names seen so far, in flush order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lifetime.keys().map(String::as_str)
    }

    /// Number of completed `on_episode_begin` calls.
    pub fn episodes_flushed(&self) -> u64 {
        self.episodes_flushed
    }

    /// Take the first sink error (if any) since the last call.
    pub fn take_error(&mut self) -> Option<StatsError> {
        self.last_error.take()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Unwrap the inner sink (e.g. to inspect a `MemorySink` after a run).
    pub fn into_sink(self) -> S {
        self.sink
    }
}
