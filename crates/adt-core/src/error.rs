//! Toolkit error types.
//!
//! Sub-crates define their own error enums and wrap `CoreError` via `From`
//! where a core value is validated on their behalf.

use thiserror::Error;

/// The error type for `adt-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid duration {0}: must be a non-negative number of seconds")]
    InvalidDuration(f64),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `adt-core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Any error an effect or callback wants to report.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Return type of scheduled effects and bus callbacks.
///
/// A failing effect is logged by whoever invoked it and never stops its
/// siblings from running.
pub type EffectResult = Result<(), BoxError>;
