pub mod common;
pub mod context;
pub mod project_structure;
pub mod template;

pub use crate::domain::DomainError;
pub use context::{Context, ContextResolver, DefaultContext, Overrides, Variable};
pub use project_structure::ProjectStructure;
pub use template::Template;
