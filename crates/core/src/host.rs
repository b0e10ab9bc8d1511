//! Host bookmarks
//!
//! Bookmarks are named references to SFTP servers: address, login and the
//! identity file to authenticate with. Secrets are never stored.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigManager, DEFAULT_PORT};
use crate::error::{Error, Result};

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// A bookmarked SFTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    /// Unique name for this bookmark
    pub name: String,

    /// Hostname or IP address
    pub host: String,

    /// SSH port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Remote login
    pub user: String,

    /// Path to a private key file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,

    /// Skip host key verification
    #[serde(default)]
    pub insecure: bool,
}

impl Host {
    /// Create a new bookmark with required fields
    pub fn new(name: impl Into<String>, host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: DEFAULT_PORT,
            user: user.into(),
            identity: None,
            insecure: false,
        }
    }

    /// `user@host:port` form used in messages
    pub fn address(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Check if a string is a valid bookmark name
pub fn is_valid_host_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Manager for host bookmark operations
pub struct HostManager {
    config_manager: ConfigManager,
}

impl HostManager {
    /// Create a new HostManager with a specific ConfigManager
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a new HostManager using the default config location
    pub fn new() -> Result<Self> {
        let config_manager = ConfigManager::new()?;
        Ok(Self { config_manager })
    }

    /// List all bookmarks
    pub fn list(&self) -> Result<Vec<Host>> {
        let config = self.config_manager.load()?;
        Ok(config.hosts)
    }

    /// Get a bookmark by name
    pub fn get(&self, name: &str) -> Result<Host> {
        let config = self.config_manager.load()?;
        config
            .hosts
            .into_iter()
            .find(|h| h.name == name)
            .ok_or_else(|| Error::HostNotFound(name.to_string()))
    }

    /// Add or update a bookmark
    pub fn set(&self, host: Host) -> Result<()> {
        if !is_valid_host_name(&host.name) {
            return Err(Error::Config(format!("invalid bookmark name: '{}'", host.name)));
        }
        let mut config = self.config_manager.load()?;

        config.hosts.retain(|h| h.name != host.name);
        config.hosts.push(host);

        self.config_manager.save(&config)
    }

    /// Add a bookmark, failing if the name is taken
    pub fn add(&self, host: Host) -> Result<()> {
        if self.exists(&host.name)? {
            return Err(Error::HostExists(host.name));
        }
        self.set(host)
    }

    /// Remove a bookmark
    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let original_len = config.hosts.len();

        config.hosts.retain(|h| h.name != name);

        if config.hosts.len() == original_len {
            return Err(Error::HostNotFound(name.to_string()));
        }

        self.config_manager.save(&config)
    }

    /// Check if a bookmark exists
    pub fn exists(&self, name: &str) -> Result<bool> {
        let config = self.config_manager.load()?;
        Ok(config.hosts.iter().any(|h| h.name == name))
    }
}
