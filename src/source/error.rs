//! Error types for schedule and log sources

use thiserror::Error;

/// Result type for source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Failures reading crontabs or the execution log
#[derive(Error, Debug)]
pub enum SourceError {
    /// The user has no crontab (or does not exist)
    #[error("No crontab found for user '{user}'")]
    UserNotFound { user: String },

    /// The crontab exists but could not be read
    #[error("Access denied reading crontab for user '{user}': {reason}")]
    AccessDenied { user: String, reason: String },

    /// The execution log could not be read
    #[error("Execution log unavailable at '{path}': {reason}")]
    LogUnavailable { path: String, reason: String },

    /// Any other I/O failure
    #[error("I/O error during '{operation}': {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl SourceError {
    /// Create an I/O error for a named operation
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// The user the error refers to, if any
    pub fn user(&self) -> Option<&str> {
        match self {
            Self::UserNotFound { user } | Self::AccessDenied { user, .. } => Some(user),
            _ => None,
        }
    }
}
