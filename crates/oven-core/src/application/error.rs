//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    #[error("Template not found: {path}")]
    TemplateNotFound { path: PathBuf },

    /// The template directory exists but could not be read as a template.
    #[error("Failed to load template at {path}: {reason}")]
    LoadFailed { path: PathBuf, reason: String },

    #[error("Template rendering failed: {reason}")]
    RenderingFailed { reason: String },

    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("Filesystem store lock poisoned")]
    StoreLockError,

    #[error("Project already exists at {path}")]
    ProjectExists { path: PathBuf },

    /// Rollback failed (best-effort cleanup failed).
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },

    #[error("No replay recorded for template '{template}' (looked in {path})")]
    ReplayNotFound { template: String, path: PathBuf },

    #[error("Replay failed: {reason}")]
    ReplayFailed { reason: String },

    #[error("Prompt failed: {reason}")]
    PromptFailed { reason: String },

    #[error("Cancelled by user")]
    Cancelled,

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::TemplateNotFound { path } => vec![
                format!("No template directory at: {}", path.display()),
                "Pass a path to a directory containing cookiecutter.json".into(),
                "Or a template name found in $OVEN_TEMPLATES_DIR or ./templates".into(),
            ],
            Self::LoadFailed { path, .. } => vec![
                format!("Check the template at: {}", path.display()),
                "It needs a cookiecutter.json (or oven.json) and exactly one project directory whose name contains {{ }}".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::StoreLockError => vec![
                "The in-memory filesystem lock was poisoned".into(),
                "Try again in a moment".into(),
            ],
            Self::ProjectExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Use --overwrite-if-exists to write into it".into(),
                "Use --skip-if-file-exists to only add missing files".into(),
                "Or choose a different output directory with -o".into(),
            ],
            Self::ReplayNotFound { template, .. } => vec![
                format!("Bake '{}' once without --replay to record its context", template),
            ],
            Self::PromptFailed { .. } => vec![
                "Run with --no-input to use defaults and KEY=VALUE overrides".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::TemplateNotFound { .. } | Self::ReplayNotFound { .. } => ErrorCategory::NotFound,
            Self::LoadFailed { .. } | Self::RenderingFailed { .. } => ErrorCategory::Template,
            Self::FilesystemError { .. } | Self::RollbackFailed { .. } => ErrorCategory::Internal,
            Self::StoreLockError | Self::ReplayFailed { .. } | Self::PromptFailed { .. } => {
                ErrorCategory::Internal
            }
            Self::Cancelled => ErrorCategory::Validation,
            Self::ValidationFailed(_) => ErrorCategory::Validation,
            Self::ProjectExists { .. } => ErrorCategory::Validation,
        }
    }
}
