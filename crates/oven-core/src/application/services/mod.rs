//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "bake a project" or "inspect a template".

pub mod bake_service;
pub mod template_service;

pub use bake_service::{BakeOutcome, BakeRequest, BakeService, OverwritePolicy};
pub use template_service::{TemplateInfo, TemplateService, VariableInfo};
