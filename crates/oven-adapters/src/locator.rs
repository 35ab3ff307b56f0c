//! Template lookup by path or by name.
//!
//! `oven bake python-service` names a template; `oven bake ./my/template`
//! points at one. Names are searched in this priority order, first hit wins:
//!
//! 1. **`$OVEN_TEMPLATES_DIR`**: environment variable override.
//! 2. **configured directory**: `paths.templates_dir` from the config file.
//! 3. **`./templates`**: relative to the current working directory.
//! 4. **`<executable-dir>/templates`**: sibling to the `oven` binary.
//! 5. **`../templates`**: development fallback.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use oven_core::{application::ApplicationError, error::OvenResult};

use crate::loader::MANIFEST_NAMES;

/// Environment variable naming an extra templates directory.
pub const TEMPLATES_DIR_ENV: &str = "OVEN_TEMPLATES_DIR";

/// Resolves a template argument to a directory.
#[derive(Debug, Clone)]
pub struct TemplateLocator {
    search_path: Vec<PathBuf>,
}

impl TemplateLocator {
    /// Standard search path, with `configured` slotted in after the
    /// environment override.
    pub fn new(configured: Option<PathBuf>) -> Self {
        let mut search_path = Vec::with_capacity(5);

        if let Ok(env_dir) = std::env::var(TEMPLATES_DIR_ENV) {
            debug!(path = %env_dir, "candidate from environment");
            search_path.push(PathBuf::from(env_dir));
        }
        search_path.extend(configured);
        search_path.push(PathBuf::from("templates"));
        if let Some(exe_sibling) = exe_sibling_templates() {
            search_path.push(exe_sibling);
        }
        search_path.push(PathBuf::from("../templates"));

        Self { search_path }
    }

    /// Search exactly these directories.
    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Resolve `template` to a template directory.
    ///
    /// # Errors
    ///
    /// `TemplateNotFound` if `template` is neither an existing directory nor
    /// the name of one in the search path.
    #[instrument(skip(self))]
    pub fn locate(&self, template: &str) -> OvenResult<PathBuf> {
        let direct = Path::new(template);
        if direct.is_dir() {
            debug!(path = %direct.display(), "template given as path");
            return Ok(direct.to_path_buf());
        }

        if is_plain_name(template) {
            for dir in &self.search_path {
                let candidate = dir.join(template);
                if candidate.is_dir() {
                    debug!(path = %candidate.display(), "template found by name");
                    return Ok(candidate);
                }
            }
        }

        Err(ApplicationError::TemplateNotFound {
            path: direct.to_path_buf(),
        }
        .into())
    }

    /// Names of all templates reachable by name, sorted and deduplicated.
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .search_path
            .iter()
            .filter_map(|dir| std::fs::read_dir(dir).ok())
            .flatten()
            .filter_map(Result::ok)
            .filter(|entry| {
                let path = entry.path();
                path.is_dir() && MANIFEST_NAMES.iter().any(|m| path.join(m).is_file())
            })
            .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

fn is_plain_name(template: &str) -> bool {
    !template.is_empty() && !template.contains(['/', '\\']) && template != "." && template != ".."
}

/// `<directory of current executable>/templates`, if the executable path is
/// known.
fn exe_sibling_templates() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("templates")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oven_core::error::OvenError;

    fn make_template(dir: &Path, name: &str) {
        let root = dir.join(name);
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("cookiecutter.json"), "{}").unwrap();
    }

    #[test]
    fn path_wins_over_name() {
        let tmp = tempfile::tempdir().unwrap();
        make_template(tmp.path(), "t");
        let locator = TemplateLocator::with_search_path(vec![]);
        let direct = tmp.path().join("t");
        assert_eq!(locator.locate(direct.to_str().unwrap()).unwrap(), direct);
    }

    #[test]
    fn first_directory_in_search_path_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        make_template(first.path(), "svc");
        make_template(second.path(), "svc");
        make_template(second.path(), "other");

        let locator = TemplateLocator::with_search_path(vec![
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(locator.locate("svc").unwrap(), first.path().join("svc"));
        assert_eq!(locator.locate("other").unwrap(), second.path().join("other"));
        assert_eq!(locator.available(), ["other", "svc"]);
    }

    #[test]
    fn unknown_name_is_not_found() {
        let locator = TemplateLocator::with_search_path(vec![]);
        let err = locator.locate("no-such-template").unwrap_err();
        assert!(matches!(
            err,
            OvenError::Application(ApplicationError::TemplateNotFound { .. })
        ));
    }

    #[test]
    fn paths_are_not_searched_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        make_template(tmp.path(), "a");
        let locator = TemplateLocator::with_search_path(vec![tmp.path().to_path_buf()]);
        assert!(locator.locate("missing/a").is_err());
    }
}
