//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `oven-adapters` crate provides implementations; the CLI provides the
//! interactive `Prompter`.

use crate::domain::{Context, Permissions, ProjectStructure, Suggestion, Template, Value, Variable};
use crate::error::OvenResult;
use std::path::Path;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `oven_adapters::filesystem::LocalFilesystem` (production)
/// - `oven_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> OvenResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &[u8]) -> OvenResult<()>;

    fn set_permissions(&self, path: &Path, permissions: Permissions) -> OvenResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> OvenResult<()>;
}

/// Port for reading a template directory into a [`Template`].
///
/// Implemented by `oven_adapters::loader::DirectoryTemplateLoader`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateLoader: Send + Sync {
    /// # Errors
    /// - `TemplateNotFound`: nothing at `path`
    /// - `LoadFailed`: manifest missing or malformed, no project directory
    fn load(&self, path: &Path) -> OvenResult<Template>;
}

/// Port for template rendering.
///
/// Must be a pure function of its inputs: the same template and context
/// always give the same structure.
///
/// Implemented by `oven_adapters::renderer::TextRenderer`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &Template, context: &Context) -> OvenResult<ProjectStructure>;
}

/// Port for recording and replaying resolved contexts.
///
/// Implemented by:
/// - `oven_adapters::replay::JsonReplayStore` (one JSON file per template)
/// - `oven_adapters::replay::InMemoryReplayStore` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait ReplayStore: Send + Sync {
    fn save(&self, template: &str, context: &Context) -> OvenResult<()>;

    /// # Errors
    /// - `ReplayNotFound`: nothing recorded for `template`
    fn load(&self, template: &str) -> OvenResult<Context>;
}

/// Port for asking a human for a value.
///
/// The answer is coerced to the variable's kind by the resolver, so a
/// prompter may return text for a flag.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    fn ask(&self, variable: &Variable, suggestion: &Suggestion) -> OvenResult<Value>;
}
