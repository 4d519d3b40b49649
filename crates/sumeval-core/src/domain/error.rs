//! Domain-level error taxonomy for SUMEVAL.

/// Errors produced while invoking a generation capability.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("capability call failed: {0}")]
    Capability(String),

    #[error("malformed capability output: {0}")]
    MalformedOutput(String),
}

/// SUMEVAL domain errors.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("length mismatch: {predictions} predictions vs {references} references")]
    LengthMismatch {
        predictions: usize,
        references: usize,
    },

    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for SUMEVAL domain operations.
pub type Result<T> = std::result::Result<T, EvalError>;
