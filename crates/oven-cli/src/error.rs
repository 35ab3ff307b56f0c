//! Error handling for the Oven CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Proper error chaining
//! - Exit code mapping

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use oven_core::error::{ErrorCategory as CoreCategory, OvenError};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input caught before the core is reached.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    // ── Config errors ──────────────────────────────────────────────────────
    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Core errors ────────────────────────────────────────────────────────
    /// Resolution, rendering, or writing failed in `oven-core`.
    ///
    /// The core message is shown unchanged; suggestions come from the core
    /// error as well.
    #[error("{0}")]
    Core(#[from] OvenError),

    /// A template name matched nothing in the search path.
    #[error("Template not found: {template}")]
    TemplateNotFound {
        template: String,
        available: Vec<String>,
    },

    // ── System errors ──────────────────────────────────────────────────────
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Interactive mode requested from a build without `interactive`.
    #[cfg(not(feature = "interactive"))]
    #[error("Feature not available: {feature}")]
    FeatureNotAvailable { feature: &'static str },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    /// User-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message } => vec![
                format!("Check your input: {message}"),
                "Use --help for usage information".into(),
            ],

            Self::ConfigError { .. } => vec![
                format!("Check your config file at {}", crate::config::AppConfig::config_path().display()),
                "Use 'oven init --force' to write a fresh default config".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::TemplateNotFound { available, .. } if available.is_empty() => vec![
                "Pass the path to a template directory".into(),
                "Or set OVEN_TEMPLATES_DIR to a directory of templates".into(),
            ],

            Self::TemplateNotFound { available, .. } => {
                let mut suggestions = vec!["Available templates:".to_string()];
                suggestions.extend(available.iter().map(|name| format!("  • {name}")));
                suggestions
            }

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
            ],

            #[cfg(not(feature = "interactive"))]
            Self::FeatureNotAvailable { feature } => vec![
                format!("The '{feature}' feature is not available in this build"),
                "Pass --no-input to bake from defaults and KEY=VALUE overrides".into(),
                format!("Or reinstall with it enabled: cargo install oven-cli --features {feature}"),
            ],
        }
    }

    /// Category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation | CoreCategory::Template => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::IoError { .. } => ErrorCategory::Internal,
            #[cfg(not(feature = "interactive"))]
            Self::FeatureNotAvailable { .. } => ErrorCategory::Configuration,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    pub fn format_colored(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{} {}\n\n", "✗".red().bold(), "Error:".red().bold()));
        output.push_str(&format!("  {}\n", self.to_string().red()));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                output.push_str(&format!("\n  {} {}\n", "→".dimmed(), err.to_string().dimmed()));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str(&format!("\n{}\n", "Suggestions:".yellow().bold()));
            for suggestion in suggestions {
                output.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            output.push('\n');
            output.push_str(&format!(
                "{} {}\n",
                "\u{2139}".blue(),
                "Use -v / --verbose for more details.".dimmed(),
            ));
        }

        output
    }

    /// Plain-text version of [`Self::format_colored`], no ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = String::new();
        out.push_str(&format!("\nError: {self}\n"));

        if verbose {
            let mut src = self.source();
            while let Some(err) = src {
                out.push_str(&format!("  Caused by: {err}\n"));
                src = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str("\nSuggestions:\n");
            for s in &suggestions {
                out.push_str(&format!("  {s}\n"));
            }
        }

        if !verbose {
            out.push_str("\nUse -v / --verbose for more details.\n");
        }

        out
    }

    pub fn log(&self) {
        match self.category() {
            ErrorCategory::UserError => tracing::warn!("User error: {}", self),
            ErrorCategory::NotFound => tracing::warn!("Not found: {}", self),
            ErrorCategory::Configuration => tracing::error!("Configuration error: {}", self),
            ErrorCategory::Internal => tracing::error!("Internal error: {}", self),
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad arguments, overrides, or template content.
    UserError,
    NotFound,
    Configuration,
    /// Filesystem or other system failure.
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Convert foreign errors into [`CliError`] at call-sites with a context
/// message.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    use oven_core::{application::ApplicationError, domain::DomainError};

    #[test]
    fn core_message_is_shown_unchanged() {
        let err = CliError::from(OvenError::Domain(DomainError::UnknownOverrideKey {
            key: "dockr".into(),
        }));
        assert!(err.to_string().starts_with("Unknown context key 'dockr'"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn core_categories_map_to_exit_codes() {
        let not_found = CliError::from(OvenError::Application(ApplicationError::TemplateNotFound {
            path: "x".into(),
        }));
        assert_eq!(not_found.exit_code(), 3);

        let io = CliError::from(OvenError::Application(ApplicationError::FilesystemError {
            path: "x".into(),
            reason: "denied".into(),
        }));
        assert_eq!(io.exit_code(), 1);

        let config = CliError::from(OvenError::Configuration {
            message: "bad".into(),
        });
        assert_eq!(config.exit_code(), 4);
    }

    #[test]
    fn template_not_found_lists_available() {
        let err = CliError::TemplateNotFound {
            template: "pyhton-service".into(),
            available: vec!["python-service".into()],
        };
        assert_eq!(err.exit_code(), 3);
        assert!(err.suggestions().iter().any(|s| s.contains("python-service")));
    }

    #[test]
    fn template_not_found_without_candidates_mentions_env() {
        let err = CliError::TemplateNotFound {
            template: "x".into(),
            available: vec![],
        };
        assert!(err.suggestions().iter().any(|s| s.contains("OVEN_TEMPLATES_DIR")));
    }

    #[cfg(not(feature = "interactive"))]
    #[test]
    fn feature_not_available_suggests_no_input() {
        let err = CliError::FeatureNotAvailable { feature: "interactive" };
        assert_eq!(err.exit_code(), 4);
        assert!(err.suggestions().iter().any(|s| s.contains("--no-input")));
    }

    #[test]
    fn exit_code_user_error() {
        let err = CliError::InvalidInput {
            message: "x".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn exit_code_configuration() {
        assert_eq!(CliError::config("x").exit_code(), 4);
    }

    #[test]
    fn exit_code_internal() {
        let err = CliError::IoError {
            message: "x".into(),
            source: io::Error::other("e"),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn format_plain_contains_error_header() {
        let err = CliError::config("broken");
        let s = err.format_plain(false);
        assert!(s.contains("Error: Configuration error: broken"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("--verbose"));
    }

    #[test]
    fn format_plain_verbose_shows_cause() {
        let err = CliError::IoError {
            message: "writing config".into(),
            source: io::Error::other("disk full"),
        };
        let s = err.format_plain(true);
        assert!(s.contains("Caused by: disk full"));
        assert!(!s.contains("--verbose"));
    }

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading config");
        assert!(matches!(cli, Err(CliError::IoError { message, .. }) if message == "reading config"));
    }
}
