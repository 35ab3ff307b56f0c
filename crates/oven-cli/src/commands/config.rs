//! `oven config`: read and write configuration values.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{
    cli::ConfigCommand,
    config::{AppConfig, set_in_table},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

pub fn execute(
    cmd: ConfigCommand,
    config: AppConfig,
    config_file: Option<PathBuf>,
    output: OutputManager,
) -> CliResult<()> {
    let path = config_file.unwrap_or_else(AppConfig::config_path);

    match cmd {
        ConfigCommand::Get { key } => {
            let value = config
                .get(&key)
                .ok_or_else(|| CliError::config(format!("No value for config key '{key}'")))?;
            output.emit(&value)?;
        }

        ConfigCommand::Set { key, value } => {
            set_value(&path, &key, &value)?;
            output.success(&format!("Set {key} = {value} in {}", path.display()))?;
        }

        ConfigCommand::List => {
            let serialised = toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                message: format!("Failed to serialise config: {e}"),
                source: Some(Box::new(e)),
            })?;
            output.header("Current configuration:")?;
            output.emit(serialised.trim_end())?;
        }

        ConfigCommand::Path => {
            output.emit(&path.display().to_string())?;
        }
    }

    Ok(())
}

/// Read the file (if any), change one key, write it back.
fn set_value(path: &Path, key: &str, value: &str) -> CliResult<()> {
    let mut doc = if path.exists() {
        let raw = std::fs::read_to_string(path)
            .with_cli_context(|| format!("Failed to read '{}'", path.display()))?;
        toml::from_str::<toml::Table>(&raw).map_err(|e| CliError::ConfigError {
            message: format!("'{}' is not valid TOML", path.display()),
            source: Some(Box::new(e)),
        })?
    } else {
        toml::Table::new()
    };

    set_in_table(&mut doc, key, value).map_err(CliError::config)?;

    let rendered = toml::to_string_pretty(&doc).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create config directory '{}'", parent.display()))?;
    }
    std::fs::write(path, rendered).with_cli_context(|| format!("Failed to write '{}'", path.display()))?;
    debug!(path = %path.display(), key, "config updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_unrelated_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[output]\nformat = \"plain\"\n").unwrap();

        set_value(&path, "default_context.author_email", "a@b.ch").unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.output.format, "plain");
        assert_eq!(cfg.default_context["author_email"], "a@b.ch");
    }

    #[test]
    fn set_creates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/config.toml");
        set_value(&path, "paths.templates_dir", "/srv/templates").unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn set_unknown_key_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        assert!(matches!(
            set_value(&path, "defaults.lang", "rust"),
            Err(CliError::ConfigError { .. })
        ));
        assert!(!path.exists());
    }
}
