use thiserror::Error;

/// Result type for inference operations
pub type Result<T> = std::result::Result<T, InferenceError>;

/// Errors that can occur while training, predicting or persisting the corpus
#[derive(Error, Debug)]
pub enum InferenceError {
    /// IO error while reading or writing the corpus store
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Corpus document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A submitted training example is not usable
    #[error("Invalid example: {0}")]
    InvalidExample(String),

    /// Model fitting failed
    #[error("Training error: {0}")]
    TrainingError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl InferenceError {
    pub fn invalid_example(msg: impl Into<String>) -> Self {
        Self::InvalidExample(msg.into())
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::TrainingError(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// True when the error was caused by caller input rather than the service itself.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidExample(_))
    }
}
