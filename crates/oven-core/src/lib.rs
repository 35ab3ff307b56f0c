//! Oven Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Oven, a
//! cookiecutter-style project baker, following hexagonal (ports and adapters)
//! architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             oven-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │     (BakeService, TemplateService)      │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Loader, Renderer, Filesystem, Replay)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      oven-adapters (Infrastructure)     │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (ContextResolver, TemplateText, models) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oven_core::prelude::*;
//!
//! let service = BakeService::new(loader, renderer, filesystem);
//! let request = BakeRequest::new("templates/python-service", ".")
//!     .overrides(Overrides::new().with("project_name", "Funky Grogu"))
//!     .no_input(true);
//! let outcome = service.bake(&request, None)?;
//! println!("{}", outcome.project_dir.display());
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        BakeOutcome, BakeRequest, BakeService, OverwritePolicy, TemplateInfo, TemplateService,
        ports::{Filesystem, Prompter, ReplayStore, TemplateLoader, TemplateRenderer},
    };
    pub use crate::domain::{
        Context, ContextResolver, DefaultContext, DefaultValue, Overrides, ProjectStructure,
        Suggestion, Template, TemplateMetadata, Value, Variable,
    };
    pub use crate::error::{OvenError, OvenResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
