// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Oven.
//!
//! Pure logic: the template text language, context resolution and the
//! template/project models. All I/O (reading template directories, writing
//! projects, prompting, replay files) happens behind ports defined in the
//! application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or terminal access
//! - **Few crates**: std, thiserror, tracing, serde, tera (template text)
//! - **Immutable entities**: Templates and resolved contexts never change after construction
//!
// Public API - what the world sees
pub mod entities;
pub mod error;
pub mod text;
pub mod value_objects;

mod validation;

// Re-exports for convenience
pub use entities::{
    context::{Context, ContextResolver, DefaultContext, Overrides, Variable},
    project_structure::{DirectoryToCreate, FileToWrite, FsEntry, ProjectStructure},
    template::{
        DirectorySpec, Directives, FileSpec, IncludeRule, Template, TemplateBuilder,
        TemplateContent, TemplateMetadata, TemplateNode, TemplateSource, TemplateTree,
    },
};

pub use error::{DomainError, ErrorCategory};

pub use text::{Condition, Scope, TemplateText, TextError};

pub use value_objects::{DefaultValue, Suggestion, Value, VariableKind, parse_flag};

pub use entities::common::{Permissions, RelativePath};
pub use validation::DomainValidator;
