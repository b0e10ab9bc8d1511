//! SFTP backend
//!
//! Wraps a russh-sftp session and implements the Backend trait from
//! rsftp-core. Status codes from the server are mapped onto the shared
//! error variants so the shell treats both sides alike.

use async_trait::async_trait;
use russh::client::Handle;
use russh::Disconnect;
use russh_sftp::client::error::Error as SftpError;
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::{FileAttributes, StatusCode};
use tracing::debug;

use rsftp_core::path;
use rsftp_core::{Backend, Error, FileEntry, FileKind, Reader, Result, Writer};

use crate::connect::ClientHandler;

/// Remote filesystem reached over SFTP
pub struct SftpBackend {
    sftp: SftpSession,
    handle: Handle<ClientHandler>,
}

impl SftpBackend {
    pub(crate) fn new(sftp: SftpSession, handle: Handle<ClientHandler>) -> Self {
        Self { sftp, handle }
    }

    /// Close the SFTP channel and the SSH connection
    pub async fn close(&self) -> Result<()> {
        if let Err(e) = self.sftp.close().await {
            debug!(error = %e, "sftp close failed");
        }
        self.handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }
}

/// Translate an SFTP error for `path`
pub(crate) fn map_sftp_error(err: SftpError, path: &str) -> Error {
    match err {
        SftpError::Status(status) => match status.status_code {
            StatusCode::NoSuchFile => Error::NotFound(path.to_string()),
            StatusCode::PermissionDenied => Error::PermissionDenied(path.to_string()),
            StatusCode::NoConnection | StatusCode::ConnectionLost => {
                Error::Network(status.error_message)
            }
            _ => Error::Protocol(format!("{path}: {}", status.error_message)),
        },
        SftpError::Timeout => Error::Network(format!("{path}: request timed out")),
        other => Error::Protocol(format!("{path}: {other}")),
    }
}

/// Build a FileEntry from SFTP attributes
pub(crate) fn entry_from_attributes(name: String, attrs: &FileAttributes) -> FileEntry {
    let kind = if attrs.is_dir() {
        FileKind::Dir
    } else if attrs.is_symlink() {
        FileKind::Symlink
    } else if attrs.is_regular() {
        FileKind::File
    } else {
        FileKind::Other
    };

    FileEntry {
        name,
        size: attrs.size.unwrap_or(0),
        modified: attrs
            .mtime
            .and_then(|t| jiff::Timestamp::from_second(i64::from(t)).ok()),
        mode: attrs.permissions.map(|p| p & 0o7777).unwrap_or(0),
        kind,
    }
}

#[async_trait]
impl Backend for SftpBackend {
    fn label(&self) -> &'static str {
        "remote"
    }

    async fn getwd(&self) -> Result<String> {
        self.sftp
            .canonicalize(".")
            .await
            .map_err(|e| map_sftp_error(e, "."))
    }

    async fn stat(&self, path: &str) -> Result<FileEntry> {
        let attrs = self
            .sftp
            .metadata(path)
            .await
            .map_err(|e| map_sftp_error(e, path))?;
        Ok(entry_from_attributes(path::base(path), &attrs))
    }

    async fn symlink_stat(&self, path: &str) -> Result<FileEntry> {
        let attrs = self
            .sftp
            .symlink_metadata(path)
            .await
            .map_err(|e| map_sftp_error(e, path))?;
        Ok(entry_from_attributes(path::base(path), &attrs))
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<FileEntry>> {
        let dir = self
            .sftp
            .read_dir(path)
            .await
            .map_err(|e| map_sftp_error(e, path))?;

        let entries: Vec<FileEntry> = dir
            .filter_map(|entry| {
                let name = entry.file_name();
                if name == "." || name == ".." {
                    return None;
                }
                Some(entry_from_attributes(name, &entry.metadata()))
            })
            .collect();
        debug!(path, count = entries.len(), "remote read_dir");
        Ok(entries)
    }

    async fn open(&self, path: &str) -> Result<Reader> {
        let file = self
            .sftp
            .open(path)
            .await
            .map_err(|e| map_sftp_error(e, path))?;
        Ok(Box::new(file))
    }

    async fn create(&self, path: &str) -> Result<Writer> {
        let file = self
            .sftp
            .create(path)
            .await
            .map_err(|e| map_sftp_error(e, path))?;
        Ok(Box::new(file))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let attrs = self
            .sftp
            .symlink_metadata(path)
            .await
            .map_err(|e| map_sftp_error(e, path))?;
        let result = if attrs.is_dir() {
            self.sftp.remove_dir(path).await
        } else {
            self.sftp.remove_file(path).await
        };
        result.map_err(|e| map_sftp_error(e, path))
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        match self.sftp.create_dir(path).await {
            Ok(()) => Ok(()),
            Err(e) => {
                // servers report an existing directory as a generic failure
                match self.sftp.metadata(path).await {
                    Ok(attrs) if attrs.is_dir() => Err(Error::AlreadyExists(path.to_string())),
                    _ => Err(map_sftp_error(e, path)),
                }
            }
        }
    }

    async fn mkdir_all(&self, path: &str) -> Result<()> {
        let clean = path::clean(path);
        let mut current = String::new();
        for component in clean.split(path::SEPARATOR) {
            if component.is_empty() {
                current.push(path::SEPARATOR);
                continue;
            }
            current = path::join(&current, component);
            match self.sftp.metadata(current.as_str()).await {
                Ok(attrs) if attrs.is_dir() => continue,
                Ok(_) => return Err(Error::NotADirectory(current)),
                Err(_) => {}
            }
            if let Err(e) = self.mkdir(&current).await {
                if !e.is_already_exists() {
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.sftp
            .rename(from, to)
            .await
            .map_err(|e| map_sftp_error(e, from))
    }
}
