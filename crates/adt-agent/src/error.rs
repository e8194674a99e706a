use adt_core::CoreError;
use adt_schedule::ScheduleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent configuration error: {0}")]
    Config(String),

    #[error("scheduling error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type AgentResult<T> = Result<T, AgentError>;
