use crate::domain::{
    entities::{Context, ProjectStructure, Template},
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across services.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_template(template: &Template) -> Result<(), DomainError> {
        template.validate()
    }

    pub fn validate_project_structure(structure: &ProjectStructure) -> Result<(), DomainError> {
        structure.validate()
    }

    /// Every declared key must be present in a resolved context.
    pub fn validate_context(template: &Template, context: &Context) -> Result<(), DomainError> {
        for variable in template.defaults.iter() {
            if !context.contains_key(&variable.name) {
                return Err(DomainError::UnresolvedPlaceholder {
                    key: variable.name.clone(),
                    location: template.defaults.origin().to_string(),
                });
            }
        }
        Ok(())
    }
}
