//! `oven bake`: resolve a template's context and render it to disk.
//!
//! Responsibility: turn arguments and config into a [`BakeRequest`], wire
//! the adapters, and report the outcome. Resolution and rendering live in
//! `oven-core`.

use std::io::IsTerminal as _;

use serde::Serialize;
use tracing::{debug, info, instrument};

use oven_adapters::{DirectoryTemplateLoader, JsonReplayStore, LocalFilesystem, TextRenderer};
use oven_core::{
    application::ports::Prompter,
    domain::Overrides,
    prelude::{BakeOutcome, BakeRequest, BakeService, Context, OverwritePolicy},
};

use crate::{
    cli::{BakeArgs, OutputFormat},
    commands::locate_template,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(template = %args.template))]
pub fn execute(args: BakeArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    if args.output_dir.exists() && !args.output_dir.is_dir() {
        return Err(CliError::InvalidInput {
            message: format!("output directory '{}' is not a directory", args.output_dir.display()),
        });
    }
    let template_dir = locate_template(&args.template, &config)?;
    let overrides = Overrides::parse_assignments(&args.extra_context)
        .map_err(|e| CliError::Core(e.into()))?;

    let interactive = !args.no_input && !args.replay && std::io::stdin().is_terminal();
    let prompter = build_prompter(interactive)?;
    if !args.no_input && !interactive {
        debug!("stdin is not a terminal, baking without prompts");
    }

    let request = BakeRequest::new(&template_dir, &args.output_dir)
        .overrides(overrides)
        .user_defaults(config.default_context.clone())
        .no_input(!interactive)
        .replay(args.replay)
        .policy(policy(&args))
        .dry_run(args.dry_run);

    let replay_dir = config.replay_dir();
    debug!(replay_dir = %replay_dir.display(), "replay store");
    let service = BakeService::new(
        Box::new(DirectoryTemplateLoader::new()),
        Box::new(TextRenderer::new()),
        Box::new(LocalFilesystem::new()),
    )
    .with_replay(Box::new(JsonReplayStore::new(replay_dir)));

    info!(template = %template_dir.display(), output_dir = %args.output_dir.display(), "bake started");
    let outcome = service.bake(&request, prompter.as_deref())?;
    info!(project = %outcome.project_dir.display(), files = outcome.written.len(), "bake finished");

    report(&outcome, &output)
}

fn policy(args: &BakeArgs) -> OverwritePolicy {
    if args.overwrite_if_exists {
        OverwritePolicy::Overwrite
    } else if args.skip_if_file_exists {
        OverwritePolicy::SkipExisting
    } else {
        OverwritePolicy::Fail
    }
}

#[cfg(feature = "interactive")]
fn build_prompter(interactive: bool) -> CliResult<Option<Box<dyn Prompter>>> {
    Ok(interactive.then(|| Box::new(crate::prompt::DialoguerPrompter::new()) as Box<dyn Prompter>))
}

#[cfg(not(feature = "interactive"))]
fn build_prompter(interactive: bool) -> CliResult<Option<Box<dyn Prompter>>> {
    if interactive {
        return Err(CliError::FeatureNotAvailable {
            feature: "interactive",
        });
    }
    Ok(None)
}

/// JSON shape of a bake result.
#[derive(Serialize)]
struct BakeReport<'a> {
    project_dir: String,
    dry_run: bool,
    context: &'a Context,
    written: Vec<String>,
    skipped: Vec<String>,
}

impl<'a> From<&'a BakeOutcome> for BakeReport<'a> {
    fn from(outcome: &'a BakeOutcome) -> Self {
        let display = |paths: &[std::path::PathBuf]| -> Vec<String> {
            paths.iter().map(|p| p.display().to_string()).collect()
        };
        Self {
            project_dir: outcome.project_dir.display().to_string(),
            dry_run: outcome.dry_run,
            context: &outcome.context,
            written: display(&outcome.written),
            skipped: display(&outcome.skipped),
        }
    }
}

fn report(outcome: &BakeOutcome, output: &OutputManager) -> CliResult<()> {
    let project = outcome.project_dir.display().to_string();

    match output.format() {
        OutputFormat::Json => output.json(&BakeReport::from(outcome))?,
        OutputFormat::Plain if outcome.dry_run => {
            for path in &outcome.written {
                output.emit(&outcome.project_dir.join(path).display().to_string())?;
            }
        }
        OutputFormat::Plain => output.emit(&project)?,
        OutputFormat::Human | OutputFormat::Auto => {
            if outcome.dry_run {
                output.info(&format!("Dry run: would create {project}"))?;
                for path in &outcome.written {
                    output.print(&format!("  {}", path.display()))?;
                }
                for path in &outcome.skipped {
                    output.print(&output.dim(&format!("  {} (kept)", path.display())))?;
                }
                return Ok(());
            }

            output.success(&format!("Baked {project}"))?;
            output.print(&output.dim(&format!("  {} files written", outcome.written.len())))?;
            if !outcome.skipped.is_empty() {
                output.warning(&format!("{} existing files kept:", outcome.skipped.len()))?;
                for path in &outcome.skipped {
                    output.print(&format!("  {}", path.display()))?;
                }
            }
            if output.is_quiet() {
                output.emit(&project)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> BakeArgs {
        BakeArgs {
            template: "t".into(),
            extra_context: vec![],
            no_input: true,
            output_dir: PathBuf::from("."),
            replay: false,
            overwrite_if_exists: false,
            skip_if_file_exists: false,
            dry_run: false,
        }
    }

    #[test]
    fn policy_follows_flags() {
        assert_eq!(policy(&args()), OverwritePolicy::Fail);
        assert_eq!(
            policy(&BakeArgs {
                overwrite_if_exists: true,
                ..args()
            }),
            OverwritePolicy::Overwrite
        );
        assert_eq!(
            policy(&BakeArgs {
                skip_if_file_exists: true,
                ..args()
            }),
            OverwritePolicy::SkipExisting
        );
    }

    #[test]
    fn report_lists_relative_paths() {
        let outcome = BakeOutcome {
            project_dir: PathBuf::from("out/esta-python"),
            context: Context::new().with("name", "esta-python"),
            written: vec![PathBuf::from("README.md")],
            skipped: vec![],
            dry_run: false,
        };
        let json = serde_json::to_value(BakeReport::from(&outcome)).unwrap();
        assert_eq!(json["written"][0], "README.md");
        assert_eq!(json["context"]["name"], "esta-python");
        assert_eq!(json["dry_run"], false);
    }

    #[test]
    fn prompter_only_when_interactive() {
        assert!(build_prompter(false).unwrap().is_none());
    }

    #[cfg(not(feature = "interactive"))]
    #[test]
    fn prompting_needs_the_interactive_feature() {
        let err = build_prompter(true).unwrap_err();
        assert!(matches!(err, CliError::FeatureNotAvailable { feature: "interactive" }));
        assert_eq!(err.exit_code(), 4);
    }
}
