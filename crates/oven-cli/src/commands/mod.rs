//! Command handlers, one module per subcommand.

pub mod bake;
pub mod completions;
pub mod config;
pub mod init;
pub mod inspect;

use std::path::PathBuf;

use oven_adapters::TemplateLocator;
use oven_core::{application::ApplicationError, error::OvenError};

use crate::{
    config::AppConfig,
    error::{CliError, CliResult},
};

/// Resolve a template argument to a directory, listing what is available
/// when a name matches nothing.
pub(crate) fn locate_template(template: &str, config: &AppConfig) -> CliResult<PathBuf> {
    let locator = TemplateLocator::new(config.paths.templates_dir.clone());
    locator.locate(template).map_err(|err| match err {
        OvenError::Application(ApplicationError::TemplateNotFound { .. }) => {
            CliError::TemplateNotFound {
                template: template.to_owned(),
                available: locator.available(),
            }
        }
        other => CliError::Core(other),
    })
}
