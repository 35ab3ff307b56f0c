//! Template renderer.
//!
//! Two passes over the template tree, both pure: a filtering pass that drops
//! nodes excluded by `_include_if` or by a path segment that renders empty,
//! and a substitution pass over names and contents.

use std::path::PathBuf;

use glob::Pattern;
use tracing::{debug, instrument};

use oven_core::{
    application::ports::TemplateRenderer,
    domain::{
        Condition, Context, DomainError, FileSpec, ProjectStructure, RelativePath, Template,
        TemplateContent, TemplateNode, text,
    },
    error::OvenResult,
};

/// Renders templates with the Tera-backed template text language.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for TextRenderer {
    #[instrument(skip_all, fields(template = %template.name(), nodes = template.tree.len()))]
    fn render(&self, template: &Template, context: &Context) -> OvenResult<ProjectStructure> {
        let root = text::render_str(&template.root, context)
            .map_err(|e| e.located(&template.root))?;
        if root.trim().is_empty() {
            return Err(DomainError::InvalidTemplate(format!(
                "project directory '{}' rendered to an empty name",
                template.root
            ))
            .into());
        }

        let rules = Rules::compile(template)?;
        let mut structure = ProjectStructure::new(root);

        for node in &template.tree.nodes {
            let source = node.path();

            if let Some(pattern) = rules.excluded_by(source, context)? {
                debug!(path = %source, pattern = %pattern, "excluded by condition");
                continue;
            }

            let Some(target) = render_path(source, context)? else {
                debug!(path = %source, "excluded by empty path segment");
                continue;
            };

            match node {
                TemplateNode::Directory(_) => structure.add_directory(target),
                TemplateNode::File(spec) => {
                    let content = render_file(spec, rules.is_verbatim(source), context)?;
                    structure.add_file(target, content, spec.permissions);
                }
            }
        }

        debug!(entries = structure.entry_count(), "rendered");
        Ok(structure)
    }
}

/// Render each segment of `source`; `None` if any comes out blank.
fn render_path(source: &RelativePath, context: &Context) -> OvenResult<Option<PathBuf>> {
    let mut rendered = PathBuf::new();
    for segment in source.segments() {
        let name = text::render_str(&segment, context).map_err(|e| e.located(&source.to_slash()))?;
        if name.trim().is_empty() {
            return Ok(None);
        }
        rendered.push(name);
    }
    Ok(Some(RelativePath::try_new(rendered)?.into_path_buf()))
}

fn render_file(spec: &FileSpec, verbatim: bool, context: &Context) -> OvenResult<Vec<u8>> {
    match &spec.content {
        TemplateContent::Parameterized(source) if !verbatim => {
            let rendered = text::render_str(source.as_str(), context)
                .map_err(|e| e.located(&spec.path.to_slash()))?;
            Ok(rendered.into_bytes())
        }
        content => Ok(content.raw_bytes().to_vec()),
    }
}

// ── Directives ────────────────────────────────────────────────────────────────

struct IncludeIf {
    pattern: Pattern,
    condition: Condition,
    location: String,
}

/// Compiled `_copy_without_render` and `_include_if` directives.
///
/// Patterns match unrendered paths relative to the project directory. A
/// match on a directory applies to everything below it.
struct Rules {
    verbatim: Vec<Pattern>,
    include_if: Vec<IncludeIf>,
}

impl Rules {
    fn compile(template: &Template) -> Result<Self, DomainError> {
        let manifest = &template.metadata.manifest;
        let directives = &template.directives;

        let verbatim = directives
            .copy_without_render
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| DomainError::TemplateSyntax {
                    location: format!("{manifest}:_copy_without_render[{p}]"),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let include_if = directives
            .include_if
            .iter()
            .map(|rule| {
                let location = format!("{manifest}:_include_if[{}]", rule.pattern);
                let pattern = Pattern::new(&rule.pattern).map_err(|e| DomainError::TemplateSyntax {
                    location: location.clone(),
                    reason: e.to_string(),
                })?;
                let condition = Condition::parse(&rule.condition).map_err(|e| e.at(location.clone()))?;
                Ok(IncludeIf {
                    pattern,
                    condition,
                    location,
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Self {
            verbatim,
            include_if,
        })
    }

    fn is_verbatim(&self, path: &RelativePath) -> bool {
        prefixes(path).any(|p| self.verbatim.iter().any(|pattern| pattern.matches(&p)))
    }

    /// The pattern of the first rule whose condition removes `path` or one
    /// of its ancestors.
    fn excluded_by(&self, path: &RelativePath, context: &Context) -> Result<Option<&str>, DomainError> {
        for prefix in prefixes(path) {
            for rule in self.include_if.iter().filter(|r| r.pattern.matches(&prefix)) {
                let keep = rule
                    .condition
                    .evaluate(context)
                    .map_err(|e| e.at(rule.location.clone()))?;
                if !keep {
                    return Ok(Some(rule.pattern.as_str()));
                }
            }
        }
        Ok(None)
    }
}

/// `a`, `a/b`, `a/b/c` for `a/b/c`.
fn prefixes(path: &RelativePath) -> impl Iterator<Item = String> {
    let segments = path.segments();
    (1..=segments.len()).map(move |n| segments[..n].join("/"))
}
