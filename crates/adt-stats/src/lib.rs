//! `adt-stats` — per-episode counters, lifetime totals, and the sink they
//! flush into.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`sink`]       | `Aggregation`, `StatsSink` trait, `MemorySink`, `SharedSink`, `NoopSink` |
//! | [`aggregator`] | `EpisodeStatAggregator<S>`, `AggregatorConfig`              |
//! | [`reporter`]   | `TotalsReporter` — process-wide aggregator fed by the bus   |
//! | [`error`]      | `StatsError`, `StatsResult<T>`                              |
//!
//! # Flush cycle (summary)
//!
//! ```text
//! increment(name, v)   → episode[name] += v; lifetime[name] += v
//! on_episode_begin()   → sink ← ("PerEpisode/<name>", episode[name], Histogram)
//!                        for every key ever seen, then episode[*] = 0
//! on_periodic_flush(t) → sink ← ("PerSecond/<name>", lifetime[name] / t, Average)
//!                        sink ← ("Totals/<name>",    lifetime[name],     MostRecent)
//! ```
//!
//! The aggregator is the only writer to its sink.  Sink errors never stop a
//! flush; the first one is kept for [`EpisodeStatAggregator::take_error`].

pub mod aggregator;
pub mod error;
pub mod reporter;
pub mod sink;


pub use aggregator::{AggregatorConfig, EpisodeStatAggregator};
pub use error::{StatsError, StatsResult};
pub use reporter::TotalsReporter;
pub use sink::{Aggregation, MemorySink, NoopSink, SharedSink, StatRecord, StatsSink};
