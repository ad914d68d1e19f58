//! Errors raised inside a persist chain
//!
//! The chain stops at the first step that returns one of these; the model
//! wraps it in `ModelError::Middleware` together with the action.

use thiserror::Error;

/// Result type returned by persistence middleware and adapters
pub type MiddlewareResult<T = ()> = Result<T, MiddlewareError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiddlewareError {
    /// A step could not complete its work
    #[error("persist step failed: {0}")]
    Failed(String),

    /// The adapter holds no record under this identity
    #[error("no record with identity {0}")]
    NotFound(String),

    #[error("model has no identity")]
    MissingIdentity,
}

impl MiddlewareError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl From<std::io::Error> for MiddlewareError {
    fn from(err: std::io::Error) -> Self {
        Self::Failed(err.to_string())
    }
}

impl From<anyhow::Error> for MiddlewareError {
    fn from(err: anyhow::Error) -> Self {
        Self::Failed(format!("{:#}", err))
    }
}
