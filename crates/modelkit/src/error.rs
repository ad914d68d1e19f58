//! Error types for model operations
//!
//! State and validation errors are produced synchronously by the persistence
//! calls themselves; middleware errors surface when the returned future is
//! awaited.

use thiserror::Error;

use crate::middleware::PersistAction;
use crate::middleware_error::MiddlewareError;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model must not have been previously created")]
    AlreadyCreated,

    #[error("Model must be created before {action}")]
    NotCreated { action: PersistAction },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{action} middleware failed: {source}")]
    Middleware {
        action: PersistAction,
        #[source]
        source: MiddlewareError,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Whether this error was raised before any middleware ran
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            ModelError::AlreadyCreated | ModelError::NotCreated { .. } | ModelError::Validation(_)
        )
    }

    /// The middleware failure carried by this error, if any
    pub fn middleware_error(&self) -> Option<&MiddlewareError> {
        match self {
            ModelError::Middleware { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Configuration(err.to_string())
    }
}

impl From<serde_yaml::Error> for ModelError {
    fn from(err: serde_yaml::Error) -> Self {
        ModelError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_error_messages() {
        assert_eq!(
            ModelError::AlreadyCreated.to_string(),
            "Model must not have been previously created"
        );
        assert_eq!(
            ModelError::NotCreated {
                action: PersistAction::Update
            }
            .to_string(),
            "Model must be created before update"
        );
    }

    #[test]
    fn test_error_classes() {
        assert!(ModelError::AlreadyCreated.is_state_error());
        assert!(ModelError::Validation("name is required".into()).is_state_error());

        let err = ModelError::Middleware {
            action: PersistAction::Create,
            source: MiddlewareError::failed("timeout"),
        };
        assert!(!err.is_state_error());
        assert!(err.middleware_error().is_some());
        assert_eq!(err.to_string(), "create middleware failed: persist step failed: timeout");
    }
}
