//! `oven init`: write a starter configuration file.

use std::path::PathBuf;

use tracing::info;

use crate::{
    cli::InitArgs,
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

const STARTER: &str = r#"# Oven configuration.
#
# Values under [default_context] replace a template's declared defaults
# before command-line overrides are applied. Keys a template does not
# declare are ignored.

[default_context]
# author_name = "Doe Jane"
# author_email = "jane.doe@example.com"

[paths]
# replay_dir = "/path/to/replay"
# templates_dir = "/path/to/templates"

[output]
no_color = false
format = "human"
"#;

pub fn execute(args: InitArgs, config_file: Option<PathBuf>, output: OutputManager) -> CliResult<()> {
    let config_path = config_file.unwrap_or_else(AppConfig::config_path);

    if config_path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            config_path.display(),
        ))?;
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create config directory '{}'", parent.display()))?;
    }
    std::fs::write(&config_path, STARTER)
        .with_cli_context(|| format!("Failed to write config to '{}'", config_path.display()))?;

    info!(path = %config_path.display(), "configuration written");
    output.success(&format!("Configuration created at {}", config_path.display()))?;
    output.emit_plain(&config_path.display().to_string())?;
    Ok(())
}
