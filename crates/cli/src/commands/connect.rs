//! connect command - open the interactive shell
//!
//! Resolves the target (bookmark or `[user@]host[:port]`), authenticates,
//! and hands the SFTP backend to a [`Session`] driven by the REPL.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::builder::FalseyValueParser;
use clap::Args;
use console::Term;
use tokio::runtime::Handle;
use tracing::debug;

use rsftp_core::config::config_dir;
use rsftp_core::{
    Backend, Config, ConfigManager, Error, LocalFs, Session, SessionOptions, ShellIo,
};
use rsftp_ssh::{Auth, ConnectOptions, Target};

use crate::exit_code::ExitCode;
use crate::output::{ConsoleReporter, ConsoleViewer, Formatter, OutputConfig, Spinner};
use crate::picker::ConsolePicker;
use crate::repl::Repl;

/// Environment variable holding the login password
pub const PASSWORD_ENV: &str = "RSFTP_PASSWORD";

/// Environment variable holding the passphrase of the identity file
pub const PASSPHRASE_ENV: &str = "RSFTP_PASSPHRASE";

/// Connect to a server and start the shell
#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Bookmark name or [user@]host[:port]
    pub target: String,

    /// SSH port (overrides bookmark and target)
    #[arg(short, long, env = "RSFTP_PORT")]
    pub port: Option<u16>,

    /// Private key used to authenticate
    #[arg(short, long, env = "RSFTP_IDENTITY")]
    pub identity: Option<PathBuf>,

    /// Skip host key verification
    #[arg(long, env = "RSFTP_INSECURE", value_parser = FalseyValueParser::new())]
    pub insecure: bool,

    /// Show `less` output through $PAGER
    #[arg(long)]
    pub pager: bool,

    /// Seconds to wait for the connection
    #[arg(long, default_value = "30")]
    pub timeout: u64,
}

/// Where and as whom to connect, before credentials are gathered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub identity: Option<PathBuf>,
    pub insecure: bool,
}

impl Plan {
    pub fn address(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Combine the command line, a matching bookmark and config defaults
///
/// `fallback_user` is used when neither the target nor a bookmark names a login.
pub fn plan(args: &ConnectArgs, config: &Config, fallback_user: Option<String>) -> rsftp_core::Result<Plan> {
    if let Some(bookmark) = config.hosts.iter().find(|h| h.name == args.target) {
        return Ok(Plan {
            host: bookmark.host.clone(),
            port: args.port.unwrap_or(bookmark.port),
            user: bookmark.user.clone(),
            identity: args
                .identity
                .clone()
                .or_else(|| bookmark.identity.as_deref().map(expand_home)),
            insecure: args.insecure || bookmark.insecure,
        });
    }

    let target = Target::parse(&args.target)?;
    let user = target
        .user
        .or(fallback_user)
        .ok_or_else(|| Error::Usage("no login given: use user@host".into()))?;
    Ok(Plan {
        host: target.host,
        port: args.port.or(target.port).unwrap_or(config.defaults.port),
        user,
        identity: args.identity.clone(),
        insecure: args.insecure,
    })
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

fn local_user() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
}

/// Credentials for a plan: key file when one is set, otherwise a password
fn credentials(plan: &Plan) -> anyhow::Result<Auth> {
    if let Some(path) = &plan.identity {
        return Ok(Auth::Key {
            path: path.clone(),
            passphrase: std::env::var(PASSPHRASE_ENV).ok(),
        });
    }
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(Auth::Password(password));
    }

    let term = Term::stderr();
    term.write_str(&format!("{}@{}'s password: ", plan.user, plan.host))?;
    let password = term.read_secure_line().context("failed to read password")?;
    Ok(Auth::Password(password))
}

/// Execute the connect command
pub async fn execute(args: ConnectArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());
    match run(args, &output_config).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            e.downcast_ref::<Error>()
                .map(ExitCode::from_error)
                .unwrap_or(ExitCode::GeneralError)
        }
    }
}

async fn run(args: ConnectArgs, output_config: &OutputConfig) -> anyhow::Result<()> {
    let config = ConfigManager::new()?
        .load()
        .context("failed to load configuration")?;
    let plan = plan(&args, &config, local_user())?;
    let auth = credentials(&plan)?;

    let spinner = Spinner::start(output_config, &format!("connecting to {}", plan.address()));
    let remote = rsftp_ssh::connect(ConnectOptions {
        host: plan.host.clone(),
        port: plan.port,
        user: plan.user.clone(),
        auth,
        insecure: plan.insecure,
        timeout: Duration::from_secs(args.timeout),
    })
    .await
    .with_context(|| format!("cannot open session to {}", plan.address()))?;
    spinner.finish_and_clear();
    let remote = Arc::new(remote);

    let color = output_config.use_color(config.defaults.color);
    let reporter = Arc::new(ConsoleReporter::new(color, output_config.quiet));
    let io = ShellIo::new(
        reporter.clone(),
        Arc::new(ConsolePicker::new(color)),
        Arc::new(ConsoleViewer::new()),
    );
    let options = SessionOptions {
        pager: args.pager || config.defaults.pager,
        color,
        width: None,
    };

    let remote_backend: Arc<dyn Backend> = remote.clone();
    let session = Session::new(Arc::new(LocalFs::new()), remote_backend, io, options)
        .await
        .context("failed to read working directories")?;

    let history = if config.defaults.history {
        Some(config_dir()?.join("history"))
    } else {
        None
    };
    let repl = Repl::new(session, Handle::current(), reporter, history);
    let result = tokio::task::spawn_blocking(move || repl.run())
        .await
        .context("shell thread failed")?;

    if let Err(e) = remote.close().await {
        debug!(error = %e, "disconnect failed");
    }
    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rsftp_core::Host;

    use super::*;

    fn args(target: &str) -> ConnectArgs {
        ConnectArgs {
            target: target.to_string(),
            port: None,
            identity: None,
            insecure: false,
            pager: false,
            timeout: 30,
        }
    }

    fn config_with_bookmark() -> Config {
        let mut host = Host::new("web", "web.example.com", "deploy");
        host.port = 2200;
        host.identity = Some("/keys/web".into());
        let mut config = Config::default();
        config.hosts.push(host);
        config
    }

    #[test]
    fn test_plan_from_bookmark() {
        let plan = plan(&args("web"), &config_with_bookmark(), None).unwrap();
        assert_eq!(plan.address(), "deploy@web.example.com:2200");
        assert_eq!(plan.identity, Some(PathBuf::from("/keys/web")));
        assert!(!plan.insecure);
    }

    #[test]
    fn test_flags_override_bookmark() {
        let mut a = args("web");
        a.port = Some(22);
        a.insecure = true;
        let plan = plan(&a, &config_with_bookmark(), None).unwrap();
        assert_eq!(plan.port, 22);
        assert!(plan.insecure);
    }

    #[test]
    fn test_plan_from_target_uses_default_port() {
        let mut config = Config::default();
        config.defaults.port = 2022;
        let plan = plan(&args("alice@files.local"), &config, None).unwrap();
        assert_eq!(plan.address(), "alice@files.local:2022");
    }

    #[test]
    fn test_plan_falls_back_to_local_user() {
        let plan = plan(&args("files.local:2222"), &Config::default(), Some("bob".into())).unwrap();
        assert_eq!(plan.address(), "bob@files.local:2222");
    }

    #[test]
    fn test_plan_without_login_fails() {
        let err = plan(&args("files.local"), &Config::default(), None).unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::UsageError);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/etc/key"), PathBuf::from("/etc/key"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.ssh/id"), home.join(".ssh/id"));
        }
    }
}
