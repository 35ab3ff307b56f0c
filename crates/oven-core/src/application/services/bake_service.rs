//! Bake Service - main application orchestrator.
//!
//! This service coordinates the whole bake:
//! 1. Load the template
//! 2. Resolve the context (user defaults, replay, overrides, prompts)
//! 3. Render template with context
//! 4. Write to filesystem, rolling back a freshly created project on failure
//! 5. Record the context for `--replay`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, Prompter, ReplayStore, TemplateLoader, TemplateRenderer},
    },
    domain::{
        Context, ContextResolver, DomainValidator as validator, FsEntry, Overrides,
        ProjectStructure, Suggestion, Template, Variable,
    },
    error::{OvenError, OvenResult},
};

/// What to do when the project directory already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Refuse with `ProjectExists`.
    #[default]
    Fail,
    /// Write into it, replacing files that are in the way.
    Overwrite,
    /// Write into it, keeping files that already exist.
    SkipExisting,
}

/// Everything one bake needs besides the adapters.
#[derive(Debug, Clone, Default)]
pub struct BakeRequest {
    pub template: PathBuf,
    pub output_dir: PathBuf,
    /// Lenient defaults from user configuration.
    pub user_defaults: BTreeMap<String, String>,
    /// Explicit `KEY=VALUE` overrides.
    pub overrides: Overrides,
    pub no_input: bool,
    /// Start from the recorded context of the previous bake.
    pub replay: bool,
    pub policy: OverwritePolicy,
    /// Render only; touch nothing.
    pub dry_run: bool,
}

impl BakeRequest {
    pub fn new(template: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template: template.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn user_defaults(mut self, defaults: BTreeMap<String, String>) -> Self {
        self.user_defaults = defaults;
        self
    }

    pub fn no_input(mut self, no_input: bool) -> Self {
        self.no_input = no_input;
        self
    }

    pub fn replay(mut self, replay: bool) -> Self {
        self.replay = replay;
        self
    }

    pub fn policy(mut self, policy: OverwritePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Result of a bake.
#[derive(Debug, Clone)]
pub struct BakeOutcome {
    /// `output_dir` joined with the rendered project directory name.
    pub project_dir: PathBuf,
    pub context: Context,
    /// Files written (or, on a dry run, that would be written), relative to
    /// `project_dir`.
    pub written: Vec<PathBuf>,
    /// Files left alone under `SkipExisting`.
    pub skipped: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Main bake service.
pub struct BakeService {
    loader: Box<dyn TemplateLoader>,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
    replay: Option<Box<dyn ReplayStore>>,
}

impl BakeService {
    pub fn new(
        loader: Box<dyn TemplateLoader>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            loader,
            renderer,
            filesystem,
            replay: None,
        }
    }

    /// Record contexts after successful bakes and allow `--replay`.
    pub fn with_replay(mut self, store: Box<dyn ReplayStore>) -> Self {
        self.replay = Some(store);
        self
    }

    /// Bake a project.
    ///
    /// `prompter` is consulted for every public key unless the request is
    /// `no_input` or a replay.
    #[instrument(
        skip_all,
        fields(
            template = %request.template.display(),
            output_dir = %request.output_dir.display(),
            no_input = request.no_input,
            replay = request.replay
        )
    )]
    pub fn bake(&self, request: &BakeRequest, prompter: Option<&dyn Prompter>) -> OvenResult<BakeOutcome> {
        // 1. Load
        let template = self.loader.load(&request.template)?;
        validator::validate_template(&template)?;
        info!(template = %template.name(), "Template loaded");

        // 2. Resolve
        let context = self.resolve_context(&template, request, prompter)?;
        validator::validate_context(&template, &context)?;

        // 3. Render
        let structure = self.renderer.render(&template, &context)?;
        validator::validate_project_structure(&structure)?;
        let project_dir = request.output_dir.join(structure.root());
        info!(
            project_dir = %project_dir.display(),
            entries = structure.entry_count(),
            "Template rendered"
        );

        let existed = self.filesystem.exists(&project_dir);
        if existed && request.policy == OverwritePolicy::Fail {
            return Err(ApplicationError::ProjectExists { path: project_dir }.into());
        }

        if request.dry_run {
            let (written, skipped) = self.preview(&structure, &project_dir, request.policy);
            return Ok(BakeOutcome {
                project_dir,
                context,
                written,
                skipped,
                dry_run: true,
            });
        }

        // 4. Write
        let (written, skipped) = self.write_structure(&structure, &project_dir, request.policy, existed)?;

        // 5. Record
        if let Some(store) = &self.replay {
            if let Err(e) = store.save(template.name(), &context) {
                warn!(error = %e, template = %template.name(), "Could not record replay context");
            }
        }

        info!(
            written = written.len(),
            skipped = skipped.len(),
            "Bake completed successfully"
        );
        Ok(BakeOutcome {
            project_dir,
            context,
            written,
            skipped,
            dry_run: false,
        })
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn resolve_context(
        &self,
        template: &Template,
        request: &BakeRequest,
        prompter: Option<&dyn Prompter>,
    ) -> OvenResult<Context> {
        let mut defaults = template.defaults.clone();
        defaults.apply_lenient(&request.user_defaults);

        let mut overrides = request.overrides.clone();
        if request.replay {
            let store = self.replay.as_ref().ok_or_else(|| ApplicationError::ReplayFailed {
                reason: "no replay store configured".into(),
            })?;
            let recorded = store.load(template.name())?;
            let mut replayed = Overrides::new();
            for (key, value) in recorded.iter() {
                if defaults.contains(key) {
                    replayed.insert(key, value.clone());
                } else {
                    debug!(key = %key, "Dropping replayed key the template no longer declares");
                }
            }
            overrides = replayed.merged(&request.overrides);
        }

        match prompter {
            Some(prompter) if !request.no_input && !request.replay => {
                ContextResolver::resolve_with(
                    &defaults,
                    &overrides,
                    |variable: &Variable, suggestion: &Suggestion| prompter.ask(variable, suggestion),
                )
            }
            _ => Ok(ContextResolver::resolve(&defaults, &overrides)?),
        }
    }

    /// Files a write would produce and keep, without touching anything.
    fn preview(
        &self,
        structure: &ProjectStructure,
        project_dir: &Path,
        policy: OverwritePolicy,
    ) -> (Vec<PathBuf>, Vec<PathBuf>) {
        structure
            .files()
            .map(|f| f.path.clone())
            .partition(|path| {
                policy != OverwritePolicy::SkipExisting || !self.filesystem.exists(&project_dir.join(path))
            })
    }

    /// Write with the overwrite policy; roll back only a directory this bake
    /// created.
    fn write_structure(
        &self,
        structure: &ProjectStructure,
        project_dir: &Path,
        policy: OverwritePolicy,
        existed: bool,
    ) -> OvenResult<(Vec<PathBuf>, Vec<PathBuf>)> {
        match self.write_all(structure, project_dir, policy) {
            Ok(result) => Ok(result),
            Err(e) if existed => {
                warn!(error = %e, "Write failed inside a pre-existing directory; leaving it in place");
                Err(e)
            }
            Err(e) => {
                warn!("Write failed, attempting rollback");
                self.rollback(project_dir);
                Err(e)
            }
        }
    }

    fn write_all(
        &self,
        structure: &ProjectStructure,
        project_dir: &Path,
        policy: OverwritePolicy,
    ) -> OvenResult<(Vec<PathBuf>, Vec<PathBuf>)> {
        let mut written = Vec::new();
        let mut skipped = Vec::new();

        self.filesystem.create_dir_all(project_dir)?;

        for entry in structure.entries() {
            match entry {
                FsEntry::Directory(dir) => {
                    self.filesystem.create_dir_all(&project_dir.join(&dir.path))?;
                }
                FsEntry::File(file) => {
                    let path = project_dir.join(&file.path);

                    if policy == OverwritePolicy::SkipExisting && self.filesystem.exists(&path) {
                        debug!(path = %path.display(), "Keeping existing file");
                        skipped.push(file.path.clone());
                        continue;
                    }

                    if let Some(parent) = path.parent() {
                        self.filesystem.create_dir_all(parent)?;
                    }
                    self.filesystem.write_file(&path, &file.content)?;
                    if file.permissions.executable_flag() {
                        self.filesystem.set_permissions(&path, file.permissions)?;
                    }
                    written.push(file.path.clone());
                }
            }
        }

        Ok((written, skipped))
    }

    /// Best-effort rollback on failure.
    fn rollback(&self, root: &Path) {
        if let Err(e) = self.filesystem.remove_dir_all(root) {
            let e = OvenError::from(ApplicationError::RollbackFailed {
                path: root.to_path_buf(),
                reason: e.to_string(),
            });
            warn!(error = %e, path = %root.display(), "Rollback failed");
        } else {
            info!("Rollback successful");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::application::ports::output::{
        MockFilesystem, MockPrompter, MockReplayStore, MockTemplateLoader, MockTemplateRenderer,
    };
    use crate::domain::{
        DefaultContext, DefaultValue, DomainError, FileSpec, Permissions, RelativePath,
        TemplateContent, TemplateMetadata, TemplateNode, Value,
    };
    use crate::error::ErrorCategory;

    fn template() -> Template {
        let defaults = DefaultContext::new("cookiecutter.json")
            .with_variable(Variable::new("project_name", DefaultValue::Text("ESTA Python".into())))
            .with_variable(Variable::new(
                "name",
                DefaultValue::Text("{{ context.project_name | kebab }}".into()),
            ));
        Template::builder()
            .metadata(TemplateMetadata::new("python-service"))
            .defaults(defaults)
            .root("{{ context.name }}")
            .add_node(TemplateNode::File(FileSpec::new(
                RelativePath::try_new("README.md").unwrap(),
                TemplateContent::text("# {{ context.project_name }}\n"),
            )))
            .build()
            .unwrap()
    }

    fn structure() -> ProjectStructure {
        ProjectStructure::new("esta-python")
            .with_directory("src")
            .with_file("README.md", "# ESTA Python\n", Permissions::read_write())
            .with_file("bin/run.sh", "#!/bin/sh\n", Permissions::executable())
    }

    fn loader() -> Box<MockTemplateLoader> {
        let mut loader = MockTemplateLoader::new();
        loader.expect_load().returning(|_| Ok(template()));
        Box::new(loader)
    }

    fn renderer() -> Box<MockTemplateRenderer> {
        let mut renderer = MockTemplateRenderer::new();
        renderer.expect_render().returning(|_, _| Ok(structure()));
        Box::new(renderer)
    }

    /// Filesystem where nothing exists and every write succeeds.
    fn empty_fs() -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_set_permissions().returning(|_, _| Ok(()));
        fs
    }

    fn request() -> BakeRequest {
        BakeRequest::new("templates/python-service", "out").no_input(true)
    }

    #[test]
    fn bakes_into_output_dir() {
        let writes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&writes);

        let mut fs = empty_fs();
        fs.expect_write_file().returning(move |path, content| {
            seen.lock().unwrap().push((path.to_path_buf(), content.to_vec()));
            Ok(())
        });
        fs.expect_remove_dir_all().never();

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let outcome = service.bake(&request(), None).unwrap();

        assert_eq!(outcome.project_dir, PathBuf::from("out/esta-python"));
        assert_eq!(outcome.context.get("name"), Some(&Value::from("esta-python")));
        assert_eq!(outcome.written.len(), 2);

        let writes = writes.lock().unwrap();
        assert_eq!(writes[0].0, PathBuf::from("out/esta-python/README.md"));
        assert_eq!(writes[0].1, b"# ESTA Python\n".to_vec());
    }

    #[test]
    fn executable_files_get_permissions() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(|_, _| Ok(()));
        fs.expect_set_permissions()
            .times(1)
            .returning(|path, perms| {
                assert_eq!(path, Path::new("out/esta-python/bin/run.sh"));
                assert!(perms.executable_flag());
                Ok(())
            });

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        service.bake(&request(), None).unwrap();
    }

    #[test]
    fn failed_write_rolls_back_new_project() {
        let mut fs = empty_fs();
        fs.expect_write_file().returning(|path, _| {
            Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "disk full".into(),
            }
            .into())
        });
        fs.expect_remove_dir_all()
            .times(1)
            .returning(|path| {
                assert_eq!(path, Path::new("out/esta-python"));
                Ok(())
            });

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let err = service.bake(&request(), None).unwrap_err();
        assert!(matches!(
            err,
            OvenError::Application(ApplicationError::FilesystemError { .. })
        ));
    }

    #[test]
    fn existing_project_fails_by_default() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_create_dir_all().never();
        fs.expect_write_file().never();

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let err = service.bake(&request(), None).unwrap_err();
        assert!(matches!(
            err,
            OvenError::Application(ApplicationError::ProjectExists { .. })
        ));
    }

    #[test]
    fn failure_inside_existing_directory_is_not_rolled_back() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(|path, _| {
            Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "read-only".into(),
            }
            .into())
        });
        fs.expect_remove_dir_all().never();

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let req = request().policy(OverwritePolicy::Overwrite);
        assert!(service.bake(&req, None).is_err());
    }

    #[test]
    fn skip_policy_keeps_existing_files() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists()
            .returning(|path| path == Path::new("out/esta-python") || path.ends_with("README.md"));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_set_permissions().returning(|_, _| Ok(()));
        fs.expect_write_file().times(1).returning(|path, _| {
            assert!(path.ends_with("bin/run.sh"));
            Ok(())
        });

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let req = request().policy(OverwritePolicy::SkipExisting);
        let outcome = service.bake(&req, None).unwrap();
        assert_eq!(outcome.skipped, vec![PathBuf::from("README.md")]);
        assert_eq!(outcome.written, vec![PathBuf::from("bin/run.sh")]);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        fs.expect_create_dir_all().never();
        fs.expect_write_file().never();

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let outcome = service.bake(&request().dry_run(true), None).unwrap();
        assert!(outcome.dry_run);
        assert_eq!(outcome.written.len(), 2);
    }

    #[test]
    fn dry_run_into_existing_project_fails_by_default() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_create_dir_all().never();
        fs.expect_write_file().never();

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let err = service.bake(&request().dry_run(true), None).unwrap_err();
        assert!(matches!(
            err,
            OvenError::Application(ApplicationError::ProjectExists { ref path }) if path == Path::new("out/esta-python")
        ));
    }

    #[test]
    fn dry_run_previews_the_skip_policy() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists()
            .returning(|path| path == Path::new("out/esta-python") || path.ends_with("README.md"));
        fs.expect_create_dir_all().never();
        fs.expect_write_file().never();

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let req = request().dry_run(true).policy(OverwritePolicy::SkipExisting);
        let outcome = service.bake(&req, None).unwrap();
        assert_eq!(outcome.written, vec![PathBuf::from("bin/run.sh")]);
        assert_eq!(outcome.skipped, vec![PathBuf::from("README.md")]);
    }

    #[test]
    fn unknown_override_is_a_validation_error() {
        let mut fs = MockFilesystem::new();
        fs.expect_write_file().never();

        let mut renderer = MockTemplateRenderer::new();
        renderer.expect_render().never();

        let service = BakeService::new(loader(), Box::new(renderer), Box::new(fs));
        let req = request().overrides(Overrides::new().with("colour", "blue"));
        let err = service.bake(&req, None).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(matches!(
            err,
            OvenError::Domain(DomainError::UnknownOverrideKey { ref key }) if key == "colour"
        ));
    }

    #[test]
    fn context_is_recorded_after_success() {
        let mut fs = empty_fs();
        fs.expect_write_file().returning(|_, _| Ok(()));

        let mut replay = MockReplayStore::new();
        replay.expect_save().times(1).returning(|template, context| {
            assert_eq!(template, "python-service");
            assert_eq!(context.get("project_name"), Some(&Value::from("ESTA Python")));
            Ok(())
        });

        let service =
            BakeService::new(loader(), renderer(), Box::new(fs)).with_replay(Box::new(replay));
        service.bake(&request(), None).unwrap();
    }

    #[test]
    fn failed_recording_does_not_fail_the_bake() {
        let mut fs = empty_fs();
        fs.expect_write_file().returning(|_, _| Ok(()));

        let mut replay = MockReplayStore::new();
        replay.expect_save().returning(|_, _| {
            Err(ApplicationError::ReplayFailed {
                reason: "read-only".into(),
            }
            .into())
        });

        let service =
            BakeService::new(loader(), renderer(), Box::new(fs)).with_replay(Box::new(replay));
        assert!(service.bake(&request(), None).is_ok());
    }

    #[test]
    fn replay_reuses_recorded_context_and_skips_prompts() {
        let mut fs = empty_fs();
        fs.expect_write_file().returning(|_, _| Ok(()));

        let mut replay = MockReplayStore::new();
        replay.expect_load().returning(|_| {
            Ok(Context::new()
                .with("project_name", "Funky Grogu")
                .with("name", "funky-grogu")
                .with("removed_key", "x"))
        });
        replay.expect_save().returning(|_, _| Ok(()));

        let mut prompter = MockPrompter::new();
        prompter.expect_ask().never();

        let service =
            BakeService::new(loader(), renderer(), Box::new(fs)).with_replay(Box::new(replay));
        let req = BakeRequest::new("t", "out").replay(true);
        let outcome = service.bake(&req, Some(&prompter)).unwrap();
        assert_eq!(outcome.context.get("project_name"), Some(&Value::from("Funky Grogu")));
        assert!(!outcome.context.contains_key("removed_key"));
    }

    #[test]
    fn prompter_answers_are_used() {
        let mut fs = empty_fs();
        fs.expect_write_file().returning(|_, _| Ok(()));

        let mut prompter = MockPrompter::new();
        prompter.expect_ask().times(2).returning(|variable, suggestion| {
            Ok(match variable.name.as_str() {
                "project_name" => Value::from("Funky Grogu"),
                _ => suggestion.accept(),
            })
        });

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let req = BakeRequest::new("t", "out");
        let outcome = service.bake(&req, Some(&prompter)).unwrap();
        assert_eq!(outcome.context.get("name"), Some(&Value::from("funky-grogu")));
    }

    #[test]
    fn user_defaults_apply_before_overrides() {
        let mut fs = empty_fs();
        fs.expect_write_file().returning(|_, _| Ok(()));

        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let req = request().user_defaults(BTreeMap::from([(
            "project_name".to_string(),
            "From Config".to_string(),
        )]));
        let outcome = service.bake(&req, None).unwrap();
        assert_eq!(outcome.context.get("name"), Some(&Value::from("from-config")));

        let mut fs = empty_fs();
        fs.expect_write_file().returning(|_, _| Ok(()));
        let service = BakeService::new(loader(), renderer(), Box::new(fs));
        let req = req.overrides(Overrides::new().with("project_name", "From Cli"));
        let outcome = service.bake(&req, None).unwrap();
        assert_eq!(outcome.context.get("name"), Some(&Value::from("from-cli")));
    }

    #[test]
    fn missing_template_propagates() {
        let mut loader = MockTemplateLoader::new();
        loader.expect_load().returning(|path| {
            Err(ApplicationError::TemplateNotFound {
                path: path.to_path_buf(),
            }
            .into())
        });
        let service = BakeService::new(
            Box::new(loader),
            renderer(),
            Box::new(MockFilesystem::new()),
        );
        let err = service.bake(&request(), None).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
