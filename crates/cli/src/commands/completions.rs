//! `rsftp completions <shell>`
//!
//! Scripts for completing the `rsftp` command line in the operator's login
//! shell. Completion inside the interactive session is the REPL's job.

use std::io::Write;

use clap::CommandFactory;
use clap_complete::Shell;

use super::Cli;
use crate::exit_code::ExitCode;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn execute(args: CompletionsArgs) -> ExitCode {
    write_script(args.shell, &mut std::io::stdout().lock());
    ExitCode::Success
}

/// Write the completion script for `shell` to `out`
pub fn write_script(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin, out);
}
