//! Application layer for Oven.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (BakeService, TemplateService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    BakeOutcome, BakeRequest, BakeService, OverwritePolicy, TemplateInfo, TemplateService,
    VariableInfo,
};

pub use ports::{Filesystem, Prompter, ReplayStore, TemplateLoader, TemplateRenderer};

pub use error::ApplicationError;
