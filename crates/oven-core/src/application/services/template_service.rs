//! Template Service - read-only template queries.
//!
//! Separated from BakeService for single responsibility.

use std::path::Path;

use serde::Serialize;
use tracing::instrument;

use crate::{
    application::ports::TemplateLoader,
    domain::{DomainValidator as validator, Template, Variable},
    error::OvenResult,
};

/// Information about a template for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    pub manifest: String,
    /// Raw project directory name, e.g. `{{ context.name }}`.
    pub root: String,
    pub files: usize,
    pub variables: Vec<VariableInfo>,
    pub copy_without_render: Vec<String>,
    pub include_if: Vec<(String, String)>,
}

/// One declared variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableInfo {
    pub name: String,
    pub kind: String,
    /// Declared default as written in the manifest.
    pub default: String,
    pub prompted: bool,
}

impl From<&Variable> for VariableInfo {
    fn from(v: &Variable) -> Self {
        Self {
            name: v.name.clone(),
            kind: v.default.kind().to_string(),
            default: v.default.to_string(),
            prompted: v.is_prompted(),
        }
    }
}

impl From<&Template> for TemplateInfo {
    fn from(t: &Template) -> Self {
        Self {
            name: t.metadata.name.clone(),
            manifest: t.metadata.manifest.clone(),
            root: t.root.clone(),
            files: t.tree.files().count(),
            variables: t.defaults.iter().map(VariableInfo::from).collect(),
            copy_without_render: t.directives.copy_without_render.clone(),
            include_if: t
                .directives
                .include_if
                .iter()
                .map(|r| (r.pattern.clone(), r.condition.clone()))
                .collect(),
        }
    }
}

/// Service for template queries.
pub struct TemplateService {
    loader: Box<dyn TemplateLoader>,
}

impl TemplateService {
    pub fn new(loader: Box<dyn TemplateLoader>) -> Self {
        Self { loader }
    }

    /// Load a template and describe it.
    #[instrument(skip(self), fields(template = %path.display()))]
    pub fn inspect(&self, path: &Path) -> OvenResult<TemplateInfo> {
        let template = self.loader.load(path)?;
        validator::validate_template(&template)?;
        Ok(TemplateInfo::from(&template))
    }
}
