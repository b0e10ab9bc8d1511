//! Configuration file
//!
//! `config.toml` lives in the rsftp configuration directory
//! (`~/.config/rsftp` on Linux, or `$RSFTP_CONFIG_DIR`). It carries shell
//! defaults and host bookmarks. Files written by a newer rsftp are refused
//! rather than silently rewritten.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::host::Host;

/// Schema version written by this build
pub const SCHEMA_VERSION: u32 = 1;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "RSFTP_CONFIG_DIR";

/// SSH port used when neither target nor bookmark names one
pub const DEFAULT_PORT: u16 = 22;

const CONFIG_FILE: &str = "config.toml";

/// When to color terminal output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color when writing to a terminal
    #[default]
    Auto,
    Always,
    Never,
}

/// Shell defaults from the `[defaults]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Pipe `less` output through `$PAGER`
    pub pager: bool,
    pub color: ColorMode,
    /// Keep REPL history between sessions
    pub history: bool,
    pub port: u16,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            pager: false,
            color: ColorMode::Auto,
            history: true,
            port: DEFAULT_PORT,
        }
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub hosts: Vec<Host>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            hosts: Vec::new(),
        }
    }
}

/// Directory holding `config.toml` and the REPL history
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|base| base.join("rsftp"))
        .ok_or_else(|| Error::Config("cannot determine the configuration directory".into()))
}

/// Reads and writes one configuration file
#[derive(Debug)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for `config.toml` in [`config_dir`]
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(config_dir()?.join(CONFIG_FILE)))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn config_path(&self) -> &Path {
        &self.path
    }

    /// Load the file, or defaults when it does not exist yet
    pub fn load(&self) -> Result<Config> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no configuration file, using defaults");
                return Ok(Config::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Config = toml::from_str(&content)?;
        match config.schema_version {
            SCHEMA_VERSION => Ok(config),
            v if v > SCHEMA_VERSION => Err(Error::Config(format!(
                "{} uses schema {v}, this rsftp understands up to {SCHEMA_VERSION}; upgrade rsftp",
                self.path.display()
            ))),
            _ => Ok(migrate(config)),
        }
    }

    /// Write the file, creating its directory; the file is readable by the owner only
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(config)?)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }
}

/// Bring an older file up to [`SCHEMA_VERSION`]
fn migrate(mut config: Config) -> Config {
    debug!(from = config.schema_version, to = SCHEMA_VERSION, "migrating configuration");
    config.schema_version = SCHEMA_VERSION;
    config
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn manager_in(dir: &TempDir) -> ConfigManager {
        ConfigManager::with_path(dir.path().join(CONFIG_FILE))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = manager_in(&dir).load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.defaults, Defaults::default());
        assert_eq!(config.defaults.color, ColorMode::Auto);
        assert!(config.defaults.history);
        assert!(config.hosts.is_empty());
    }

    #[test]
    fn test_bookmarks_survive_save() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);

        let mut config = Config::default();
        config.defaults.color = ColorMode::Never;
        config.hosts.push(Host::new("web", "web.example.com", "deploy"));
        manager.save(&config).unwrap();

        let loaded = manager.load().unwrap();
        assert_eq!(loaded.defaults.color, ColorMode::Never);
        assert_eq!(loaded.hosts[0].host, "web.example.com");
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        manager.save(&Config::default()).unwrap();

        let mode = std::fs::metadata(manager.config_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_defaults_table_may_be_partial() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        std::fs::write(
            manager.config_path(),
            "schema_version = 1\n[defaults]\npager = true\ncolor = \"always\"\n",
        )
        .unwrap();

        let defaults = manager.load().unwrap().defaults;
        assert!(defaults.pager);
        assert_eq!(defaults.color, ColorMode::Always);
        assert_eq!(defaults.port, DEFAULT_PORT);
    }

    #[test]
    fn test_older_schema_is_migrated() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        std::fs::write(manager.config_path(), "schema_version = 0\n").unwrap();

        assert_eq!(manager.load().unwrap().schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        std::fs::write(
            manager.config_path(),
            format!("schema_version = {}\n", SCHEMA_VERSION + 1),
        )
        .unwrap();

        let err = manager.load().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("upgrade rsftp"));
    }

    #[test]
    fn test_unknown_color_mode_is_rejected() {
        let dir = TempDir::new().unwrap();
        let manager = manager_in(&dir);
        std::fs::write(
            manager.config_path(),
            "schema_version = 1\n[defaults]\ncolor = \"sometimes\"\n",
        )
        .unwrap();

        assert!(matches!(manager.load(), Err(Error::TomlParse(_))));
    }
}
