//! Command-line argument definitions.
//!
//! Everything clap needs lives here; handlers in [`crate::commands`] receive
//! these structs already validated.

mod global;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub use global::{GlobalArgs, OutputFormat};

/// Bake projects from cookiecutter-style templates.
#[derive(Debug, Parser)]
#[command(
    name = "oven",
    version,
    author,
    about = "Bake projects from cookiecutter-style templates",
    long_about = "Oven resolves a template's default context, applies your \
                  overrides, and renders the template tree into a new project \
                  directory.",
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Bake a new project from a template.
    #[command(visible_alias = "b")]
    Bake(BakeArgs),

    /// Show the variables and directives of a template.
    #[command(visible_alias = "i")]
    Inspect(InspectArgs),

    /// Write a default configuration file.
    Init(InitArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),

    /// Read or change configuration values.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `oven bake`.
#[derive(Debug, Args)]
pub struct BakeArgs {
    /// Template directory, or the name of a template in the search path.
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Context overrides as KEY=VALUE pairs.
    #[arg(value_name = "KEY=VALUE")]
    pub extra_context: Vec<String>,

    /// Do not prompt; use defaults and overrides only.
    #[arg(long = "no-input")]
    pub no_input: bool,

    /// Directory the project directory is created in.
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Reuse the context recorded by the last bake of this template.
    #[arg(long, conflicts_with = "extra_context")]
    pub replay: bool,

    /// Write into an existing project directory, replacing files.
    #[arg(short = 'f', long = "overwrite-if-exists")]
    pub overwrite_if_exists: bool,

    /// Write into an existing project directory, keeping files already there.
    #[arg(
        short = 's',
        long = "skip-if-file-exists",
        conflicts_with = "overwrite_if_exists"
    )]
    pub skip_if_file_exists: bool,

    /// Resolve and render, then list what would be written.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Arguments for `oven inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Template directory, or the name of a template in the search path.
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    #[arg(long, value_enum, default_value = "table")]
    pub format: InspectFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectFormat {
    /// Aligned columns.
    Table,
    /// One variable per line.
    List,
    Json,
}

/// Arguments for `oven init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Replace an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `oven completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print one value, e.g. `paths.replay_dir` or `default_context.author_email`.
    Get { key: String },
    /// Set one value and save the configuration file.
    Set { key: String, value: String },
    /// Print the effective configuration.
    List,
    /// Print the configuration file path.
    Path,
}
