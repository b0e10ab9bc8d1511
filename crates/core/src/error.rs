//! Error types for rsftp-core
//!
//! Provides a unified error type shared by both backends and the shell engine.
//! Backend-specific failures are normalized into these variants so the engine can
//! reason about "not found" or "already exists" without knowing which side it talks to.

use thiserror::Error;

/// Result type alias for rsftp-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for rsftp-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host bookmark not found
    #[error("Host not found: {0}")]
    HostNotFound(String),

    /// Host bookmark already exists
    #[error("Host already exists: {0}")]
    HostExists(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Path does not exist
    #[error("no such file or directory: {0}")]
    NotFound(String),

    /// Path exists but is not a directory
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Path already exists
    #[error("file exists: {0}")]
    AlreadyExists(String),

    /// Permission denied
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Glob pattern could not be parsed
    #[error("invalid pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Wrong arguments for a shell command
    #[error("{0}")]
    Usage(String),

    /// Command line could not be tokenized
    #[error("parse error: {0}")]
    Parse(String),

    /// Command name not recognized
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Network error (retryable)
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Remote protocol error not tied to a single path
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Normalize an IO error for the given path
    pub fn from_io(err: std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(path.to_string()),
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(path.to_string()),
            std::io::ErrorKind::PermissionDenied => Error::PermissionDenied(path.to_string()),
            std::io::ErrorKind::NotADirectory => Error::NotADirectory(path.to_string()),
            _ => Error::Io(err),
        }
    }

    /// Whether the error means the target already exists
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists(_))
            || matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::AlreadyExists)
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) | Error::Parse(_) | Error::UnknownCommand(_) => 2, // UsageError
            Error::InvalidPattern { .. } | Error::Config(_) => 2,            // UsageError
            Error::Network(_) | Error::Protocol(_) => 3,                      // NetworkError
            Error::Auth(_) | Error::PermissionDenied(_) => 4,                 // AuthError
            Error::NotFound(_) | Error::HostNotFound(_) => 5,                 // NotFound
            Error::AlreadyExists(_) | Error::HostExists(_) => 6,              // Conflict
            _ => 1,                                                           // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Usage("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(Error::UnknownCommand("test".into()).exit_code(), 2);
        assert_eq!(Error::Network("test".into()).exit_code(), 3);
        assert_eq!(Error::Auth("test".into()).exit_code(), 4);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::HostNotFound("test".into()).exit_code(), 5);
        assert_eq!(Error::AlreadyExists("test".into()).exit_code(), 6);
        assert_eq!(Error::HostExists("test".into()).exit_code(), 6);
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = Error::UnknownCommand("frobnicate".into());
        assert_eq!(err.to_string(), "unknown command: frobnicate");

        let err = Error::InvalidPattern {
            pattern: "[a".into(),
            reason: "unclosed bracket".into(),
        };
        assert_eq!(err.to_string(), "invalid pattern [a: unclosed bracket");
    }

    #[test]
    fn test_from_io_normalizes_kinds() {
        let err = Error::from_io(std::io::Error::from(std::io::ErrorKind::NotFound), "/x");
        assert!(matches!(err, Error::NotFound(ref p) if p == "/x"));

        let err = Error::from_io(std::io::Error::from(std::io::ErrorKind::AlreadyExists), "/x");
        assert!(err.is_already_exists());

        let err = Error::from_io(std::io::Error::other("boom"), "/x");
        assert!(matches!(err, Error::Io(_)));
    }
}
