//! Unified error handling for Oven Core.
//!
//! Wraps domain and application errors behind one type that carries
//! user-actionable suggestions and a display category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Oven Core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OvenError {
    /// Business rule violations: bad overrides, template defects.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Orchestration failures: I/O, missing templates, replay.
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl OvenError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Run: oven config path to locate the config file".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Oven".into(),
                "Please report this issue at: https://github.com/oven-rs/oven/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Template => ErrorCategory::Template,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller input was rejected.
    Validation,
    /// The template itself is broken.
    Template,
    NotFound,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type OvenResult<T> = Result<T, OvenError>;

/// Extension trait for turning foreign errors into internal ones with a
/// message.
pub trait ResultExt<T> {
    fn context(self, msg: impl Into<String>) -> OvenResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> OvenResult<T> {
        self.map_err(|e| OvenError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}
