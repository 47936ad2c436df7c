// Error types for the chat pipeline

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for chat pipeline operations
pub type Result<T> = std::result::Result<T, ChatError>;

/// Errors that can occur while processing a message
#[derive(Debug, Error)]
pub enum ChatError {
    /// No valid caller identity was resolved
    #[error("unauthenticated")]
    Unauthenticated,

    /// Session does not exist for this owner
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),

    /// Input rejected before any processing
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Language-model call failed or timed out.
    /// Recovered locally by the analysis/response stages, never surfaced to the caller.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Session store error
    #[error("session store error: {0}")]
    Store(String),

    /// Event notification error (logged and swallowed by the pipeline)
    #[error("notification error: {0}")]
    Notify(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ChatError {
    /// Create a model-unavailable error
    pub fn model(msg: impl Into<String>) -> Self {
        ChatError::ModelUnavailable(msg.into())
    }

    /// Create a session store error
    pub fn store(msg: impl Into<String>) -> Self {
        ChatError::Store(msg.into())
    }

    /// Create a notification error
    pub fn notify(msg: impl Into<String>) -> Self {
        ChatError::Notify(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        ChatError::Configuration(msg.into())
    }

    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        ChatError::InvalidInput(msg.into())
    }
}
