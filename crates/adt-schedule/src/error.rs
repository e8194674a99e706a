use thiserror::Error;

use crate::ActionHandle;

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Negative (or NaN) delay passed to `schedule`.  Retrying with the same
    /// value will fail the same way.
    #[error("invalid delay {0}: delays must be non-negative seconds")]
    InvalidDelay(f64),

    /// The handle was never issued by this scheduler.
    #[error("unknown action handle {0}")]
    UnknownHandle(ActionHandle),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
