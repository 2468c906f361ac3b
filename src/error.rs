//! Unified error handling for the cron exporter
//!
//! Each module keeps its own error enum; [`Error`] wraps them so that the
//! binary and the server can deal with a single type.
//!
//! - [`ExporterErrorTrait`] - Common interface implemented by the error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use cron_exporter::error::{Error, ExporterErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!(category = ?err.category(), "retrying: {}", err);
//!     } else {
//!         tracing::error!("fatal: {}", err);
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::metrics::MetricsError;
pub use crate::schedule::ScheduleError;
pub use crate::server::ServerError;
pub use crate::source::SourceError;

/// Common trait for the exporter's error types
pub trait ExporterErrorTrait: std::error::Error {
    /// Whether the next scrape may succeed without operator action
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Crontab syntax and occurrence search errors
    Schedule,
    /// Crontab listing and execution log access errors
    Source,
    /// Metric registration and encoding errors
    Metrics,
    /// Configuration and validation errors
    Config,
    /// HTTP server errors
    Server,
    /// Other I/O errors
    Io,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Schedule => "schedule",
            Self::Source => "source",
            Self::Metrics => "metrics",
            Self::Config => "config",
            Self::Server => "server",
            Self::Io => "io",
            Self::Other => "other",
        }
    }
}

impl ExporterErrorTrait for ScheduleError {
    fn is_recoverable(&self) -> bool {
        // The crontab has to be edited before the same line parses
        false
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Schedule
    }
}

impl ExporterErrorTrait for SourceError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::UserNotFound { .. } => false,
            Self::AccessDenied { .. } => false,
            Self::LogUnavailable { .. } => true,
            Self::Io { .. } => true,
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Source
    }
}

/// Unified error type for the cron exporter
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ExporterErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Schedule(e) => e.is_recoverable(),
            Self::Source(e) => e.is_recoverable(),
            Self::Metrics(_) => false,
            Self::Server(_) => false,
            Self::Config(_) => false,
            Self::Io(_) => true, // I/O errors are often transient
            Self::Other { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Schedule(_) => ErrorCategory::Schedule,
            Self::Source(_) => ErrorCategory::Source,
            Self::Metrics(_) => ErrorCategory::Metrics,
            Self::Server(_) => ErrorCategory::Server,
            Self::Config(_) => ErrorCategory::Config,
            Self::Io(_) => ErrorCategory::Io,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

// Conversion from anyhow::Error
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: format!("{:#}", err),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
