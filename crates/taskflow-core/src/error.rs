use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("worker pool size must be at least 1")]
    NoWorkers,
    #[error("channel capacity for {0} must be at least 1")]
    ZeroCapacity(&'static str),
    #[error("failure probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{count} worker(s) panicked while executing tasks")]
    WorkerPanicked { count: usize },
    #[error("{stage} stopped abnormally: {reason}")]
    Join { stage: &'static str, reason: String },
}

impl PipelineError {
    pub(crate) fn join(stage: &'static str, e: tokio::task::JoinError) -> Self {
        PipelineError::Join {
            stage,
            reason: e.to_string(),
        }
    }
}
