//! Connection setup
//!
//! Opens the SSH transport, verifies the server key, authenticates, and
//! starts the SFTP subsystem on a session channel.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use russh::client;
use russh::keys::key::PrivateKeyWithHashAlg;
use russh::keys::PublicKey;
use russh_sftp::client::SftpSession;
use tracing::{debug, info, warn};

use rsftp_core::{Error, Result};

use crate::client::SftpBackend;

/// Where to connect, parsed from `[user@]host[:port]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub user: Option<String>,
    pub host: String,
    pub port: Option<u16>,
}

impl Target {
    pub fn parse(input: &str) -> Result<Self> {
        let (user, rest) = match input.rsplit_once('@') {
            Some((user, rest)) if !user.is_empty() => (Some(user.to_string()), rest),
            Some(_) => return Err(Error::Usage(format!("invalid target: {input}"))),
            None => (None, input),
        };

        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| Error::Usage(format!("invalid port in target: {input}")))?;
                (host, Some(port))
            }
            _ => (rest, None),
        };

        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(Error::Usage(format!("invalid target: {input}")));
        }

        Ok(Self {
            user,
            host: host.to_string(),
            port,
        })
    }
}

/// How to authenticate
#[derive(Clone)]
pub enum Auth {
    Password(String),
    Key {
        path: PathBuf,
        passphrase: Option<String>,
    },
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Password(_) => f.write_str("Password(..)"),
            Auth::Key { path, .. } => f.debug_struct("Key").field("path", path).finish(),
        }
    }
}

/// Everything needed to open a session
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub auth: Auth,
    /// Accept any host key without consulting known_hosts
    pub insecure: bool,
    pub timeout: Duration,
}

/// russh callbacks; only host key verification is customized
pub struct ClientHandler {
    host: String,
    port: u16,
    insecure: bool,
}

impl ClientHandler {
    pub fn new(host: String, port: u16, insecure: bool) -> Self {
        Self {
            host,
            port,
            insecure,
        }
    }
}

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        if self.insecure {
            warn!(host = %self.host, "host key verification disabled");
            return Ok(true);
        }

        match russh::keys::check_known_hosts(&self.host, self.port, server_public_key) {
            Ok(true) => {
                debug!(host = %self.host, "host key verified");
                Ok(true)
            }
            Ok(false) => {
                warn!(
                    host = %self.host,
                    port = self.port,
                    "unknown host key, adding it to known_hosts"
                );
                if let Err(e) = russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, server_public_key) {
                    warn!(error = %e, "failed to save host key");
                }
                Ok(true)
            }
            Err(e) => {
                warn!(host = %self.host, error = %e, "host key verification failed");
                Ok(false)
            }
        }
    }
}

/// Connect, authenticate and open the SFTP subsystem
pub async fn connect(options: ConnectOptions) -> Result<SftpBackend> {
    let addr = (options.host.clone(), options.port);
    info!(host = %options.host, port = options.port, user = %options.user, "connecting");

    let config = client::Config {
        inactivity_timeout: None,
        keepalive_interval: Some(Duration::from_secs(30)),
        keepalive_max: 3,
        ..Default::default()
    };
    let handler = ClientHandler::new(options.host.clone(), options.port, options.insecure);

    let mut handle = tokio::time::timeout(
        options.timeout,
        client::connect(Arc::new(config), addr, handler),
    )
    .await
    .map_err(|_| Error::Network(format!("connection to {} timed out", options.host)))?
    .map_err(|e| Error::Network(e.to_string()))?;
    debug!("ssh handshake completed");

    let authenticated = match &options.auth {
        Auth::Password(password) => handle
            .authenticate_password(&options.user, password)
            .await
            .map_err(|e| Error::Auth(e.to_string()))?,
        Auth::Key { path, passphrase } => {
            let key = russh::keys::load_secret_key(path, passphrase.as_deref())
                .map_err(|e| Error::Auth(format!("{}: {e}", path.display())))?;
            handle
                .authenticate_publickey(&options.user, PrivateKeyWithHashAlg::new(Arc::new(key), None))
                .await
                .map_err(|e| Error::Auth(e.to_string()))?
        }
    };
    if !authenticated.success() {
        return Err(Error::Auth(format!(
            "server rejected credentials for {}",
            options.user
        )));
    }
    info!("authenticated");

    let channel = handle
        .channel_open_session()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;
    channel
        .request_subsystem(true, "sftp")
        .await
        .map_err(|e| Error::Protocol(format!("sftp subsystem unavailable: {e}")))?;
    let sftp = SftpSession::new(channel.into_stream())
        .await
        .map_err(|e| Error::Protocol(e.to_string()))?;
    info!("sftp subsystem ready");

    Ok(SftpBackend::new(sftp, handle))
}
