//! Error types for adt-stats.

use adt_core::BoxError;
use thiserror::Error;

/// Errors raised while writing statistics.
#[derive(Debug, Error)]
pub enum StatsError {
    /// The sink rejected an observation.
    #[error("stats sink rejected {name}: {source}")]
    Sink {
        name:   String,
        #[source]
        source: BoxError,
    },

    /// A shared aggregator or sink was already borrowed (re-entrant use).
    #[error("{0} is already in use")]
    Busy(&'static str),
}

/// Alias for `Result<T, StatsError>`.
pub type StatsResult<T> = Result<T, StatsError>;
