use crate::evaluator::Phase;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error(transparent)]
    Simulation(#[from] mts_simulator::Error),

    #[error("evaluator is {0:?}, not ready for this call")]
    NotArmed(Phase),

    #[error("iteration budget must be positive")]
    EmptyBudget,

    #[error("invalid search config: {0}")]
    InvalidConfig(String),
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerError {
    #[error("previous response has not been consumed")]
    RequestInFlight,

    #[error("no request is outstanding")]
    NoRequest,

    #[error("agent worker thread is gone")]
    Disconnected,
}
