//! `oven completions`: print a completion script for a shell.

use clap::CommandFactory;
use clap_complete::generate;

use crate::{cli::{Cli, CompletionsArgs}, error::CliResult};

pub fn execute(args: CompletionsArgs) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_owned();
    generate(args.shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}
