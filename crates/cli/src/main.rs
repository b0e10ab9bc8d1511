//! rsftp - interactive SFTP shell
//!
//! Connects to an SFTP server and opens a shell that works on the remote
//! and the local filesystem side by side.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rsftp_cli::commands::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
