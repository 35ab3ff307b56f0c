//! Template aggregate: what a template directory looks like once loaded.
//!
//! ```text
//! Template (Aggregate Root)
//! ├── TemplateMetadata   - name and where it came from
//! ├── DefaultContext     - declared variables, in manifest order
//! ├── root               - raw name of the project directory ("{{ context.name }}")
//! ├── Directives         - _copy_without_render, _include_if
//! └── TemplateTree       - nodes under the project directory, paths unrendered
//!      ├── FileSpec (path, content, permissions)
//!      └── DirectorySpec (path)
//! ```
//!
//! Everything here is read-only once built. Rendering lives behind the
//! `TemplateRenderer` port; the aggregate only knows how to check itself.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::domain::{
    entities::common::{Permissions, RelativePath},
    entities::context::DefaultContext,
    error::DomainError,
    text::{Condition, TemplateText},
};

// ============================================================================
// Core Template Aggregate
// ============================================================================

/// A loaded project template.
///
/// ## Invariants (enforced by `validate()`)
///
/// 1. `metadata.name` is non-empty
/// 2. `root` is non-empty and parses as template text
/// 3. `tree` paths are unique
/// 4. every `_include_if` condition parses
#[derive(Debug, Clone)]
pub struct Template {
    pub metadata: TemplateMetadata,
    pub defaults: DefaultContext,
    pub root: String,
    pub directives: Directives,
    pub tree: TemplateTree,
}

impl Template {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.metadata.name.is_empty() {
            return Err(DomainError::InvalidTemplate(
                "Template name cannot be empty".into(),
            ));
        }

        if self.root.trim().is_empty() {
            return Err(DomainError::EmptyTemplate {
                template: self.metadata.name.clone(),
            });
        }

        TemplateText::parse(&self.root).map_err(|e| e.located(&self.root))?;

        let mut seen = HashSet::new();
        for node in &self.tree.nodes {
            let path = node.path().to_slash();
            if !seen.insert(path.clone()) {
                return Err(DomainError::DuplicatePath { path });
            }
        }

        for rule in &self.directives.include_if {
            Condition::parse(&rule.condition).map_err(|e| {
                e.at(format!("{}:_include_if[{}]", self.metadata.manifest, rule.pattern))
            })?;
        }

        Ok(())
    }
}

/// Builder for constructing templates with validation.
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    metadata: Option<TemplateMetadata>,
    defaults: Option<DefaultContext>,
    root: Option<String>,
    directives: Directives,
    tree: TemplateTree,
}

impl TemplateBuilder {
    pub fn metadata(mut self, metadata: TemplateMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn defaults(mut self, defaults: DefaultContext) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn directives(mut self, directives: Directives) -> Self {
        self.directives = directives;
        self
    }

    pub fn tree(mut self, tree: TemplateTree) -> Self {
        self.tree = tree;
        self
    }

    pub fn add_node(mut self, node: TemplateNode) -> Self {
        self.tree.push(node);
        self
    }

    pub fn build(self) -> Result<Template, DomainError> {
        let template = Template {
            metadata: self
                .metadata
                .ok_or(DomainError::MissingRequiredField { field: "metadata" })?,
            defaults: self
                .defaults
                .ok_or(DomainError::MissingRequiredField { field: "defaults" })?,
            root: self
                .root
                .ok_or(DomainError::MissingRequiredField { field: "root" })?,
            directives: self.directives,
            tree: self.tree,
        };
        template.validate()?;
        Ok(template)
    }
}

/// Human-readable metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMetadata {
    /// Directory name of the template; also the replay file name.
    pub name: String,
    /// Template directory on disk, if loaded from one.
    pub source: Option<PathBuf>,
    /// Manifest file name, used in error locations.
    pub manifest: String,
}

impl TemplateMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            manifest: "cookiecutter.json".into(),
        }
    }

    pub fn source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }
}

// ============================================================================
// Directives
// ============================================================================

/// Private manifest keys that steer rendering instead of entering the context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    /// Globs (relative to the project directory, unrendered) whose file
    /// contents are copied verbatim.
    pub copy_without_render: Vec<String>,
    /// Glob → condition; matching nodes are dropped when the condition is false.
    pub include_if: Vec<IncludeRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeRule {
    pub pattern: String,
    pub condition: String,
}

impl IncludeRule {
    pub fn new(pattern: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            condition: condition.into(),
        }
    }
}

// ============================================================================
// Tree
// ============================================================================

/// Nodes in walk order: a directory always precedes its contents.
#[derive(Debug, Clone, Default)]
pub struct TemplateTree {
    pub nodes: Vec<TemplateNode>,
}

impl TemplateTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: TemplateNode) {
        self.nodes.push(node);
    }

    pub fn with_node(mut self, node: TemplateNode) -> Self {
        self.push(node);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn files(&self) -> impl Iterator<Item = &FileSpec> {
        self.nodes.iter().filter_map(|n| match n {
            TemplateNode::File(f) => Some(f),
            TemplateNode::Directory(_) => None,
        })
    }
}

#[derive(Debug, Clone)]
pub enum TemplateNode {
    File(FileSpec),
    Directory(DirectorySpec),
}

impl TemplateNode {
    pub fn path(&self) -> &RelativePath {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => &d.path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileSpec {
    /// Path under the project directory, placeholders unrendered.
    pub path: RelativePath,
    pub content: TemplateContent,
    pub permissions: Permissions,
}

impl FileSpec {
    pub fn new(path: RelativePath, content: TemplateContent) -> Self {
        Self {
            path,
            content,
            permissions: Permissions::read_write(),
        }
    }

    pub fn executable(mut self) -> Self {
        self.permissions = Permissions::executable();
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }
}

#[derive(Debug, Clone)]
pub struct DirectorySpec {
    pub path: RelativePath,
}

impl DirectorySpec {
    pub fn new(path: RelativePath) -> Self {
        Self { path }
    }
}

// ============================================================================
// Content Types
// ============================================================================

#[derive(Debug, Clone)]
pub enum TemplateContent {
    /// Text with no markup; written as-is.
    Literal(TemplateSource),
    /// Text containing markup; rendered against the context.
    Parameterized(TemplateSource),
    /// Non-UTF-8 content; always copied byte for byte.
    Binary(Vec<u8>),
}

impl TemplateContent {
    /// Pick `Literal` or `Parameterized` by looking for markup.
    pub fn text(source: impl Into<TemplateSource>) -> Self {
        let source = source.into();
        if crate::domain::text::contains_markup(source.as_str()) {
            Self::Parameterized(source)
        } else {
            Self::Literal(source)
        }
    }

    /// Raw bytes as stored in the template.
    pub fn raw_bytes(&self) -> &[u8] {
        match self {
            Self::Literal(s) | Self::Parameterized(s) => s.as_str().as_bytes(),
            Self::Binary(b) => b,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Compile-time string literal.
    Static(&'static str),
    Owned(String),
}

impl From<&'static str> for TemplateSource {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

impl From<String> for TemplateSource {
    fn from(s: String) -> Self {
        Self::Owned(s)
    }
}

impl TemplateSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Owned(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::context::Variable;
    use crate::domain::value_objects::DefaultValue;

    fn path(p: &str) -> RelativePath {
        RelativePath::try_new(p).unwrap()
    }

    fn defaults() -> DefaultContext {
        DefaultContext::new("cookiecutter.json")
            .with_variable(Variable::new("name", DefaultValue::Text("demo".into())))
    }

    fn builder() -> TemplateBuilder {
        Template::builder()
            .metadata(TemplateMetadata::new("demo"))
            .defaults(defaults())
            .root("{{ context.name }}")
    }

    #[test]
    fn builds_valid_template() {
        let t = builder()
            .add_node(TemplateNode::Directory(DirectorySpec::new(path("src"))))
            .add_node(TemplateNode::File(FileSpec::new(
                path("src/main.py"),
                TemplateContent::text("print('hi')\n"),
            )))
            .build()
            .unwrap();
        assert_eq!(t.name(), "demo");
        assert_eq!(t.tree.len(), 2);
        assert_eq!(t.tree.files().count(), 1);
    }

    #[test]
    fn missing_root_is_rejected() {
        let err = Template::builder()
            .metadata(TemplateMetadata::new("demo"))
            .defaults(defaults())
            .build()
            .unwrap_err();
        assert_eq!(err, DomainError::MissingRequiredField { field: "root" });
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let file = || {
            TemplateNode::File(FileSpec::new(path("a.txt"), TemplateContent::text("x")))
        };
        let err = builder().add_node(file()).add_node(file()).build().unwrap_err();
        assert!(matches!(err, DomainError::DuplicatePath { .. }));
    }

    #[test]
    fn broken_include_condition_is_rejected() {
        let directives = Directives {
            include_if: vec![IncludeRule::new("Dockerfile", "context.docker ==")],
            ..Default::default()
        };
        let err = builder().directives(directives).build().unwrap_err();
        match err {
            DomainError::TemplateSyntax { location, .. } => {
                assert_eq!(location, "cookiecutter.json:_include_if[Dockerfile]")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn content_kind_is_detected() {
        assert!(matches!(
            TemplateContent::text("name = {{ context.name }}"),
            TemplateContent::Parameterized(_)
        ));
        assert!(matches!(
            TemplateContent::text("plain"),
            TemplateContent::Literal(_)
        ));
    }
}
