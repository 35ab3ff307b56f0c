// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (a failed bake can be reported more than once)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Caller input errors
    // ========================================================================
    #[error("Unknown context key '{key}': the template does not declare it")]
    UnknownOverrideKey { key: String },

    #[error("Invalid value '{value}' for context key '{key}': {reason}")]
    InvalidOverrideValue {
        key: String,
        value: String,
        reason: String,
    },

    // ========================================================================
    // Template defects
    // ========================================================================
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Template '{template}' has no content")]
    EmptyTemplate { template: String },

    #[error("Unresolved placeholder '{key}' in {location}")]
    UnresolvedPlaceholder { key: String, location: String },

    #[error("Template syntax error in {location}: {reason}")]
    TemplateSyntax { location: String, reason: String },

    #[error("Context defaults depend on each other in a cycle: {keys}")]
    CyclicDefault { keys: String },

    #[error("Duplicate path in template: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the project directory: {path}")]
    PathTraversal { path: String },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownOverrideKey { key } => vec![
                format!("'{}' is not declared in the template's default context", key),
                "Run: oven inspect <TEMPLATE> to list the declared keys".into(),
                "Check the key for typos".into(),
            ],
            Self::InvalidOverrideValue { key, reason, .. } => vec![
                format!("Value rejected for '{}': {}", key, reason),
                "Run: oven inspect <TEMPLATE> to see allowed values".into(),
            ],
            Self::UnresolvedPlaceholder { key, location } => vec![
                format!("{} references '{}', which is not in the context", location, key),
                "Declare the key in the template manifest or fix the placeholder".into(),
            ],
            Self::TemplateSyntax { location, .. } => vec![
                format!("Fix the template markup at {}", location),
                "Use {% raw %}...{% endraw %} for literal braces".into(),
            ],
            Self::CyclicDefault { keys } => vec![
                format!("These defaults reference each other: {}", keys),
                "Break the cycle by making one of them a plain value".into(),
            ],
            Self::EmptyTemplate { template } => vec![
                format!("Template '{}' renders nothing", template),
                "Add files under the template's project directory".into(),
            ],
            _ => vec!["Check the template manifest and directory layout".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownOverrideKey { .. } | Self::InvalidOverrideValue { .. } => {
                ErrorCategory::Validation
            }
            Self::InvalidTemplate(_)
            | Self::EmptyTemplate { .. }
            | Self::UnresolvedPlaceholder { .. }
            | Self::TemplateSyntax { .. }
            | Self::CyclicDefault { .. }
            | Self::DuplicatePath { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathTraversal { .. } => ErrorCategory::Template,
            Self::MissingRequiredField { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Template,
    Internal,
}
