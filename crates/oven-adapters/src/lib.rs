//! Infrastructure adapters for Oven.
//!
//! This crate implements the ports defined in `oven_core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod loader;
pub mod locator;
pub mod renderer;
pub mod replay;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use loader::DirectoryTemplateLoader;
pub use locator::TemplateLocator;
pub use renderer::TextRenderer;
pub use replay::{InMemoryReplayStore, JsonReplayStore};
