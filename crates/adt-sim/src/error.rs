use adt_agent::AgentError;
use adt_core::CoreError;
use adt_stats::StatsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("stats error: {0}")]
    Stats(#[from] StatsError),
}

pub type SimResult<T> = Result<T, SimError>;
