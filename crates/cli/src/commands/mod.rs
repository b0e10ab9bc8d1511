//! CLI command definitions and execution
//!
//! `connect` opens the interactive shell; `host` manages bookmarks and
//! `completions` prints shell completion scripts.

use clap::{Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

pub mod completions;
pub mod connect;
pub mod host;

/// rsftp - interactive SFTP shell
///
/// Browse, transfer and manage files on an SFTP server and on the local
/// machine from one prompt.
#[derive(Parser, Debug)]
#[command(name = "rsftp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to a server and start the shell
    Connect(connect::ConnectArgs),

    /// Manage host bookmarks
    #[command(subcommand)]
    Host(host::HostCommands),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Connect(args) => connect::execute(args, output_config).await,
        Commands::Host(cmd) => host::execute(cmd, output_config),
        Commands::Completions(args) => completions::execute(args),
    }
}
