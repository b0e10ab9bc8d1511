//! Host bookmark commands
//!
//! Bookmarks save the address, login and identity file of a server so
//! `rsftp connect <name>` can reach it without retyping them.

use clap::Subcommand;
use serde::Serialize;

use rsftp_core::config::DEFAULT_PORT;
use rsftp_core::host::is_valid_host_name;
use rsftp_core::{Error, Host, HostManager};
use rsftp_ssh::Target;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Host subcommands
#[derive(Subcommand, Debug)]
pub enum HostCommands {
    /// Add a bookmark
    Add(AddArgs),

    /// List bookmarks
    List(ListArgs),

    /// Remove a bookmark
    Remove(RemoveArgs),
}

/// Arguments for `host add`
#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Bookmark name (letters, digits, '.', '-' and '_')
    pub name: String,

    /// Server as [user@]host[:port]
    pub target: String,

    /// Login, when the target does not name one
    #[arg(short, long)]
    pub user: Option<String>,

    /// SSH port (overrides the port in the target)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Private key used to authenticate
    #[arg(short, long)]
    pub identity: Option<String>,

    /// Skip host key verification
    #[arg(long)]
    pub insecure: bool,

    /// Replace an existing bookmark with the same name
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `host list`
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show identity file and verification settings
    #[arg(short, long)]
    pub long: bool,
}

/// Arguments for `host remove`
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the bookmark to remove
    pub name: String,
}

#[derive(Serialize)]
struct HostListOutput {
    hosts: Vec<Host>,
}

#[derive(Serialize)]
struct HostOperationOutput {
    success: bool,
    host: String,
    message: String,
}

/// Execute a host subcommand
pub fn execute(cmd: HostCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let manager = match HostManager::new() {
        Ok(m) => m,
        Err(e) => {
            formatter.error(&format!("Failed to load configuration: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let result = match cmd {
        HostCommands::Add(args) => execute_add(args, &manager, &formatter),
        HostCommands::List(args) => execute_list(args, &manager, &formatter),
        HostCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    };

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.error(&e.to_string());
            ExitCode::from_error(&e)
        }
    }
}

/// Build a bookmark from `host add` arguments
pub fn host_from_args(args: &AddArgs) -> rsftp_core::Result<Host> {
    if !is_valid_host_name(&args.name) {
        return Err(Error::Usage(format!(
            "invalid bookmark name '{}': use letters, digits, '.', '-' and '_'",
            args.name
        )));
    }

    let target = Target::parse(&args.target)?;
    let user = args
        .user
        .clone()
        .or(target.user)
        .ok_or_else(|| Error::Usage("a login is required: use user@host or --user".into()))?;

    let mut host = Host::new(&args.name, target.host, user);
    host.port = args.port.or(target.port).unwrap_or(DEFAULT_PORT);
    host.identity = args.identity.clone();
    host.insecure = args.insecure;
    Ok(host)
}

fn execute_add(args: AddArgs, manager: &HostManager, formatter: &Formatter) -> rsftp_core::Result<()> {
    let host = host_from_args(&args)?;
    let address = host.address();
    if args.force {
        manager.set(host)?;
    } else {
        manager.add(host)?;
    }

    if formatter.is_json() {
        formatter.json(&HostOperationOutput {
            success: true,
            host: args.name.clone(),
            message: format!("Host '{}' saved as {address}", args.name),
        });
    } else {
        formatter.success(&format!("Host '{}' saved as {address}.", args.name));
    }
    Ok(())
}

fn execute_list(args: ListArgs, manager: &HostManager, formatter: &Formatter) -> rsftp_core::Result<()> {
    let hosts = manager.list()?;

    if formatter.is_json() {
        formatter.json(&HostListOutput { hosts });
    } else if hosts.is_empty() {
        formatter.println("No hosts configured.");
    } else {
        for host in &hosts {
            if args.long {
                formatter.println(&format!(
                    "{:<12} {} (identity: {}, verify host key: {})",
                    host.name,
                    host.address(),
                    host.identity.as_deref().unwrap_or("-"),
                    if host.insecure { "no" } else { "yes" },
                ));
            } else {
                formatter.println(&format!("{:<12} {}", host.name, host.address()));
            }
        }
    }
    Ok(())
}

fn execute_remove(args: RemoveArgs, manager: &HostManager, formatter: &Formatter) -> rsftp_core::Result<()> {
    manager.remove(&args.name)?;

    if formatter.is_json() {
        formatter.json(&HostOperationOutput {
            success: true,
            host: args.name.clone(),
            message: format!("Host '{}' removed", args.name),
        });
    } else {
        formatter.success(&format!("Host '{}' removed.", args.name));
    }
    Ok(())
}
