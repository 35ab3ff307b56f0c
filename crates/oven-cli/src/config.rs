//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate only ever sees the values taken
//! from it (user defaults, replay directory, template search path).
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `OVEN_OUTPUT__NO_COLOR=true`,
//!    `OVEN_PATHS__REPLAY_DIR=/tmp/replay`, ...
//! 3. Config file: `--config FILE`, or the platform config directory
//! 4. Built-in defaults
//!
//! # Example file
//!
//! ```toml
//! [default_context]
//! author_name = "Doe Jane"
//! author_email = "jane.doe@example.com"
//!
//! [paths]
//! templates_dir = "/home/jane/templates"
//!
//! [output]
//! no_color = false
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prefix for environment overrides; nested keys use `__`.
pub const ENV_PREFIX: &str = "OVEN";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Values that replace template defaults before overrides are applied.
    /// Keys the template does not declare are ignored.
    pub default_context: BTreeMap<String, String>,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Where replay files are kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replay_dir: Option<PathBuf>,
    /// Extra directory searched for templates given by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "human".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment on top of the defaults.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path(), false),
        };
        debug!(path = %path.display(), required, "loading configuration");

        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_path()).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.oven.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("rs", "oven", "oven")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".oven.toml"))
    }

    /// Configured replay directory, else `<data dir>/replay`.
    pub fn replay_dir(&self) -> PathBuf {
        self.paths.replay_dir.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("rs", "oven", "oven")
                .map(|d| d.data_dir().join("replay"))
                .unwrap_or_else(|| PathBuf::from(".oven/replay"))
        })
    }

    /// Look up a dotted key such as `output.format` or
    /// `default_context.author_email`.
    pub fn get(&self, key: &str) -> Option<String> {
        let path_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        match key {
            "paths.replay_dir" => Some(self.replay_dir().display().to_string()),
            "paths.templates_dir" => path_str(&self.paths.templates_dir),
            "output.no_color" => Some(self.output.no_color.to_string()),
            "output.format" => Some(self.output.format.clone()),
            _ => key
                .strip_prefix("default_context.")
                .and_then(|name| self.default_context.get(name).cloned()),
        }
    }
}

/// Keys accepted by `oven config set`, besides `default_context.<name>`.
pub const SETTABLE_KEYS: [&str; 4] = [
    "paths.replay_dir",
    "paths.templates_dir",
    "output.no_color",
    "output.format",
];

/// Set `key` to `value` in a TOML document, creating tables as needed.
///
/// `output.no_color` is stored as a boolean; everything else as a string.
pub fn set_in_table(doc: &mut toml::Table, key: &str, value: &str) -> Result<(), String> {
    let (section, name) = key
        .split_once('.')
        .filter(|(section, name)| !section.is_empty() && !name.is_empty())
        .ok_or_else(|| format!("'{key}' is not of the form <section>.<name>"))?;

    let known = SETTABLE_KEYS.contains(&key) || (section == "default_context" && !name.contains('.'));
    if !known {
        return Err(format!("Unknown config key: '{key}'"));
    }

    let item = if key == "output.no_color" {
        let flag = value
            .parse::<bool>()
            .map_err(|_| format!("'{key}' expects true or false, got '{value}'"))?;
        toml::Value::Boolean(flag)
    } else {
        toml::Value::String(value.to_owned())
    };

    let table = doc
        .entry(section)
        .or_insert_with(|| toml::Value::Table(toml::Table::new()))
        .as_table_mut()
        .ok_or_else(|| format!("'{section}' in the config file is not a table"))?;
    table.insert(name.to_owned(), item);
    Ok(())
}
