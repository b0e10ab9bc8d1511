//! Local filesystem backend

use async_trait::async_trait;
use tracing::debug;

use crate::backend::{Backend, FileEntry, FileKind, Reader, Writer};
use crate::error::{Error, Result};
use crate::path;

/// Backend over the operator's own filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    pub fn new() -> Self {
        Self
    }
}

fn entry_from_metadata(name: String, meta: &std::fs::Metadata) -> FileEntry {
    let file_type = meta.file_type();
    let kind = if file_type.is_dir() {
        FileKind::Dir
    } else if file_type.is_file() {
        FileKind::File
    } else if file_type.is_symlink() {
        FileKind::Symlink
    } else {
        FileKind::Other
    };

    #[cfg(unix)]
    let mode = {
        use std::os::unix::fs::PermissionsExt;
        meta.permissions().mode() & 0o7777
    };
    #[cfg(not(unix))]
    let mode = if meta.permissions().readonly() { 0o444 } else { 0o644 };

    let modified = meta
        .modified()
        .ok()
        .and_then(|t| jiff::Timestamp::try_from(t).ok());

    FileEntry {
        name,
        size: meta.len(),
        modified,
        mode,
        kind,
    }
}

#[async_trait]
impl Backend for LocalFs {
    fn label(&self) -> &'static str {
        "local"
    }

    async fn getwd(&self) -> Result<String> {
        let cwd = std::env::current_dir()?;
        Ok(cwd.to_string_lossy().into_owned())
    }

    async fn stat(&self, path: &str) -> Result<FileEntry> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        Ok(entry_from_metadata(path::base(path), &meta))
    }

    async fn symlink_stat(&self, path: &str) -> Result<FileEntry> {
        let meta = tokio::fs::symlink_metadata(path)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        Ok(entry_from_metadata(path::base(path), &meta))
    }

    async fn read_dir(&self, path: &str) -> Result<Vec<FileEntry>> {
        let mut dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| Error::from_io(e, path))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| Error::from_io(e, path))? {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.metadata().await {
                Ok(meta) => entries.push(entry_from_metadata(name, &meta)),
                Err(e) => debug!(path, name = %name, error = %e, "skipping unreadable entry"),
            }
        }
        Ok(entries)
    }

    async fn open(&self, path: &str) -> Result<Reader> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        Ok(Box::new(file))
    }

    async fn create(&self, path: &str) -> Result<Writer> {
        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        Ok(Box::new(file))
    }

    async fn remove(&self, path: &str) -> Result<()> {
        let meta = tokio::fs::symlink_metadata(path)
            .await
            .map_err(|e| Error::from_io(e, path))?;
        let result = if meta.is_dir() {
            tokio::fs::remove_dir(path).await
        } else {
            tokio::fs::remove_file(path).await
        };
        result.map_err(|e| Error::from_io(e, path))
    }

    async fn mkdir(&self, path: &str) -> Result<()> {
        let mut builder = tokio::fs::DirBuilder::new();
        #[cfg(unix)]
        builder.mode(0o755);
        builder
            .create(path)
            .await
            .map_err(|e| Error::from_io(e, path))
    }

    async fn mkdir_all(&self, path: &str) -> Result<()> {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder
            .create(path)
            .await
            .map_err(|e| Error::from_io(e, path))
    }

    async fn rename(&self, from: &str, to: &str) -> Result<()> {
        tokio::fs::rename(from, to)
            .await
            .map_err(|e| Error::from_io(e, from))
    }

    async fn glob(&self, wd: &str, pattern: &str) -> Result<Vec<String>> {
        let absolute = path::is_absolute(pattern);
        let full = if absolute {
            pattern.to_string()
        } else {
            format!(
                "{}/{}",
                ::glob::Pattern::escape(wd.trim_end_matches(path::SEPARATOR)),
                pattern
            )
        };

        let paths = ::glob::glob(&full).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.msg.to_string(),
        })?;

        let mut matches = Vec::new();
        for entry in paths {
            let found = match entry {
                Ok(p) => p.to_string_lossy().into_owned(),
                Err(e) => {
                    debug!(pattern, error = %e, "skipping unreadable glob match");
                    continue;
                }
            };
            if absolute {
                matches.push(found);
            } else {
                matches.push(path::relative(wd, &found).unwrap_or(found));
            }
        }
        Ok(matches)
    }
}
