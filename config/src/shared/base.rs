use thiserror::Error;

/// Errors raised while validating loaded configuration values.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid orchestrator configuration: {0}")]
    InvalidOrchestrator(String),

    #[error("invalid offload configuration: {0}")]
    InvalidOffload(String),
}
