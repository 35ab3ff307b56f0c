//! Terminal prompts for interactive bakes.

use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use tracing::trace;

use oven_core::{
    application::{ApplicationError, ports::Prompter},
    domain::{Suggestion, Value, Variable},
    error::OvenResult,
};

/// Asks on the controlling terminal, one variable at a time.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn ask(&self, variable: &Variable, suggestion: &Suggestion) -> OvenResult<Value> {
        trace!(variable = %variable.name, "prompting");
        let prompt = variable.name.as_str();

        let answer = match suggestion {
            Suggestion::Text(default) => Input::<String>::with_theme(&self.theme)
                .with_prompt(prompt)
                .default(default.clone())
                .allow_empty(true)
                .interact_text()
                .map(Value::Text),
            Suggestion::Flag(default) => Confirm::with_theme(&self.theme)
                .with_prompt(prompt)
                .default(*default)
                .interact()
                .map(Value::Flag),
            Suggestion::Choice(options) => Select::with_theme(&self.theme)
                .with_prompt(prompt)
                .items(options.as_slice())
                .default(0)
                .interact()
                .map(|index| Value::Text(options[index].clone())),
        };

        answer.map_err(|e| prompt_error(variable, e).into())
    }
}

fn prompt_error(variable: &Variable, err: dialoguer::Error) -> ApplicationError {
    match err {
        dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
            ApplicationError::Cancelled
        }
        other => ApplicationError::PromptFailed {
            reason: format!("{}: {other}", variable.name),
        },
    }
}
