//! Filesystem-based template loader.
//!
//! Reads a cookiecutter-style template directory into a domain [`Template`].
//!
//! # Directory layout expected
//!
//! ```text
//! python-service/
//! ├── cookiecutter.json            ← manifest (required; `oven.json` also accepted)
//! └── {{ context.name }}/          ← project directory (exactly one)
//!     ├── pyproject.toml
//!     └── src/
//!         └── {{ context.package_name }}/
//!             └── __init__.py
//! ```
//!
//! # Manifest format
//!
//! A JSON object whose key order is the declaration order:
//!
//! ```json
//! {
//!   "project_name": "ESTA Python",
//!   "package_name": "{{ context.project_name | slugify }}",
//!   "python_version": ["3.11", "3.10"],
//!   "docker_repository": "",
//!   "_copy_without_render": ["*.png"],
//!   "_include_if": { "Dockerfile": "context.docker_repository" }
//! }
//! ```
//!
//! Strings become text defaults, booleans flags, numbers text, and arrays
//! choices (first entry is the default). Keys starting with `_` are private:
//! they are resolved but never prompted.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde_json::{Map, Value as Json};
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use oven_core::{
    application::{ApplicationError, ports::TemplateLoader},
    domain::{
        DefaultContext, DefaultValue, Directives, DirectorySpec, FileSpec, IncludeRule,
        Permissions, RelativePath, Template, TemplateContent, TemplateMetadata, TemplateNode,
        TemplateTree, Variable,
    },
    error::{OvenError, OvenResult},
};

/// Manifest file names, in lookup order.
pub const MANIFEST_NAMES: [&str; 2] = ["cookiecutter.json", "oven.json"];

const COPY_WITHOUT_RENDER: &str = "_copy_without_render";
const INCLUDE_IF: &str = "_include_if";

/// Cookiecutter directives this loader accepts but does not act on.
const IGNORED_DIRECTIVES: [&str; 4] = ["_extensions", "_jinja2_env_vars", "_new_lines", "_templates"];

/// Loads [`Template`]s from directories on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryTemplateLoader;

impl DirectoryTemplateLoader {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateLoader for DirectoryTemplateLoader {
    #[instrument(skip(self), fields(dir = %path.display()))]
    fn load(&self, path: &Path) -> OvenResult<Template> {
        if !path.is_dir() {
            return Err(ApplicationError::TemplateNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let manifest_path = MANIFEST_NAMES
            .iter()
            .map(|name| path.join(name))
            .find(|p| p.is_file())
            .ok_or_else(|| {
                load_failed(
                    path,
                    format!("no manifest found (expected {})", MANIFEST_NAMES.join(" or ")),
                )
            })?;
        let manifest_name = file_name(&manifest_path).unwrap_or_else(|| MANIFEST_NAMES[0].into());

        let raw = fs::read_to_string(&manifest_path)
            .map_err(|e| load_failed(path, format!("failed to read {manifest_name}: {e}")))?;
        let json: Json = serde_json::from_str(&raw)
            .map_err(|e| load_failed(path, format!("failed to parse {manifest_name}: {e}")))?;
        let Json::Object(entries) = json else {
            return Err(load_failed(
                path,
                format!("{manifest_name} must contain a JSON object"),
            ));
        };

        let (defaults, directives) =
            parse_manifest(&manifest_name, entries).map_err(|reason| load_failed(path, reason))?;

        let (root, root_dir) = find_project_dir(path)?;
        let tree = build_tree(&root_dir)?;

        let name = template_name(path);
        debug!(
            template = %name,
            variables = defaults.len(),
            nodes = tree.len(),
            "loaded template"
        );

        let template = Template::builder()
            .metadata(
                TemplateMetadata::new(name)
                    .source(path)
                    .manifest(manifest_name),
            )
            .defaults(defaults)
            .root(root)
            .directives(directives)
            .tree(tree)
            .build()?;
        Ok(template)
    }
}

// ── Manifest ──────────────────────────────────────────────────────────────────

fn parse_manifest(
    origin: &str,
    entries: Map<String, Json>,
) -> Result<(DefaultContext, Directives), String> {
    let mut defaults = DefaultContext::new(origin);
    let mut directives = Directives::default();

    for (key, value) in entries {
        match key.as_str() {
            COPY_WITHOUT_RENDER => directives.copy_without_render = parse_globs(&key, value)?,
            INCLUDE_IF => directives.include_if = parse_include_if(value)?,
            k if IGNORED_DIRECTIVES.contains(&k) => {
                debug!(key = %k, "ignoring unsupported directive");
            }
            _ => match default_value(&value) {
                Some(default) => defaults.push(Variable::new(key, default)),
                None if key.starts_with('_') => {
                    debug!(key = %key, "skipping private key with a structured value");
                }
                None => {
                    return Err(format!(
                        "variable '{key}' has an unsupported default: {}",
                        describe(&value)
                    ));
                }
            },
        }
    }

    Ok((defaults, directives))
}

fn default_value(value: &Json) -> Option<DefaultValue> {
    match value {
        Json::String(s) => Some(DefaultValue::Text(s.clone())),
        Json::Bool(b) => Some(DefaultValue::Flag(*b)),
        Json::Number(n) => Some(DefaultValue::Text(n.to_string())),
        Json::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| match item {
                Json::String(s) => Some(s.clone()),
                Json::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(DefaultValue::Choice),
        _ => None,
    }
}

fn parse_globs(key: &str, value: Json) -> Result<Vec<String>, String> {
    let Json::Array(items) = value else {
        return Err(format!("'{key}' must be an array of glob patterns"));
    };
    items
        .into_iter()
        .map(|item| match item {
            Json::String(s) => Ok(s),
            other => Err(format!("'{key}' entries must be strings, got {}", describe(&other))),
        })
        .collect()
}

fn parse_include_if(value: Json) -> Result<Vec<IncludeRule>, String> {
    let Json::Object(rules) = value else {
        return Err(format!("'{INCLUDE_IF}' must map glob patterns to conditions"));
    };
    rules
        .into_iter()
        .map(|(pattern, condition)| match condition {
            Json::String(c) => Ok(IncludeRule::new(pattern, c)),
            other => Err(format!(
                "'{INCLUDE_IF}' condition for '{pattern}' must be a string, got {}",
                describe(&other)
            )),
        })
        .collect()
}

fn describe(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

// ── Tree ──────────────────────────────────────────────────────────────────────

/// The single top-level directory whose name is template text.
fn find_project_dir(path: &Path) -> OvenResult<(String, PathBuf)> {
    let read_dir = fs::read_dir(path)
        .map_err(|e| load_failed(path, format!("failed to read directory: {e}")))?;

    let mut candidates = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| load_failed(path, format!("failed to read entry: {e}")))?;
        let entry_path = entry.path();
        if !entry_path.is_dir() {
            continue;
        }
        if let Some(name) = file_name(&entry_path) {
            if name.contains("{{") {
                candidates.push((name, entry_path));
            }
        }
    }
    candidates.sort();

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(load_failed(
            path,
            "no project directory (expected one top-level directory named like '{{ context.name }}')",
        )),
        _ => Err(load_failed(
            path,
            format!(
                "several project directories: {}",
                candidates
                    .iter()
                    .map(|(n, _)| n.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )),
    }
}

fn build_tree(root_dir: &Path) -> OvenResult<TemplateTree> {
    let mut tree = TemplateTree::new();

    for entry in WalkDir::new(root_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| load_failed(root_dir, format!("directory walk error: {e}")))?;
        let abs_path = entry.path();
        let rel = abs_path
            .strip_prefix(root_dir)
            .map_err(|e| load_failed(root_dir, e.to_string()))?;
        let path = RelativePath::try_new(rel)?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            tree.push(TemplateNode::Directory(DirectorySpec::new(path)));
        } else if file_type.is_file() {
            let bytes = fs::read(abs_path)
                .map_err(|e| load_failed(root_dir, format!("failed to read '{path}': {e}")))?;
            let content = match String::from_utf8(bytes) {
                Ok(text) => TemplateContent::text(text),
                Err(e) => TemplateContent::Binary(e.into_bytes()),
            };
            let permissions = file_permissions(&entry)?;
            tree.push(TemplateNode::File(
                FileSpec::new(path, content).with_permissions(permissions),
            ));
        } else {
            warn!(path = %path, "skipping entry that is neither file nor directory");
        }
    }

    Ok(tree)
}

#[cfg(unix)]
fn file_permissions(entry: &walkdir::DirEntry) -> OvenResult<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = entry
        .metadata()
        .map_err(|e| load_failed(entry.path(), format!("failed to read metadata: {e}")))?;
    Ok(Permissions::from_mode(metadata.permissions().mode()))
}

#[cfg(not(unix))]
fn file_permissions(_entry: &walkdir::DirEntry) -> OvenResult<Permissions> {
    Ok(Permissions::read_write())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn template_name(path: &Path) -> String {
    file_name(path)
        .or_else(|| path.canonicalize().ok().as_deref().and_then(file_name))
        .unwrap_or_else(|| "template".into())
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
}

fn load_failed(path: &Path, reason: impl Into<String>) -> OvenError {
    ApplicationError::LoadFailed {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}
