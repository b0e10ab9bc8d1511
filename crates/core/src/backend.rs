//! Backend capability trait
//!
//! This trait defines the file operations the shell needs from either side of
//! a session. It is implemented once for the local filesystem and once for the
//! remote SFTP endpoint, so every shell command runs the same code against both.

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::Result;

/// Readable handle returned by [`Backend::open`]
pub type Reader = Box<dyn AsyncRead + Send + Unpin>;

/// Writable handle returned by [`Backend::create`]
pub type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Kind of a filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Dir,
    Symlink,
    Other,
}

/// Metadata for a file or directory, normalized across backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Entry name (last path element)
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Last modification time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<Timestamp>,

    /// Permission bits (lower 12 bits of the mode)
    pub mode: u32,

    /// Entry kind
    pub kind: FileKind,
}

impl FileEntry {
    /// Create a new FileEntry for a regular file
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            modified: None,
            mode: 0o644,
            kind: FileKind::File,
        }
    }

    /// Create a new FileEntry for a directory
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: 0,
            modified: None,
            mode: 0o755,
            kind: FileKind::Dir,
        }
    }

    /// Entry offered by the browser to move one level up
    pub fn parent_marker() -> Self {
        Self::dir("..")
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    pub fn is_regular(&self) -> bool {
        self.kind == FileKind::File
    }

    /// Human-readable size
    pub fn size_human(&self) -> String {
        humansize::format_size(self.size, humansize::BINARY)
    }

    /// Permission string in `ls -l` style, e.g. `drwxr-xr-x`
    pub fn mode_string(&self) -> String {
        let kind = match self.kind {
            FileKind::Dir => 'd',
            FileKind::Symlink => 'l',
            FileKind::File => '-',
            FileKind::Other => '?',
        };
        let mut out = String::with_capacity(10);
        out.push(kind);
        for shift in [6u32, 3, 0] {
            let bits = (self.mode >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        out
    }
}

/// File operations shared by the local and remote sides of a session
///
/// Paths are absolute, `/`-separated strings. Errors are normalized into
/// [`crate::Error`] variants so callers can tell "not found" or "already exists"
/// apart without knowing which backend produced them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short label used in log lines ("local" or "remote")
    fn label(&self) -> &'static str;

    /// Directory the backend starts in
    async fn getwd(&self) -> Result<String>;

    /// Metadata for a path, following symlinks
    async fn stat(&self, path: &str) -> Result<FileEntry>;

    /// Metadata for the path itself; a symlink is reported as
    /// [`FileKind::Symlink`], not as its target
    async fn symlink_stat(&self, path: &str) -> Result<FileEntry>;

    /// Entries of a directory, excluding `.` and `..`
    async fn read_dir(&self, path: &str) -> Result<Vec<FileEntry>>;

    /// Open a file for reading
    async fn open(&self, path: &str) -> Result<Reader>;

    /// Create or truncate a file for writing
    async fn create(&self, path: &str) -> Result<Writer>;

    /// Remove a file or an empty directory
    async fn remove(&self, path: &str) -> Result<()>;

    /// Create a single directory; fails if the parent is missing
    async fn mkdir(&self, path: &str) -> Result<()>;

    /// Create a directory and any missing parents; succeeds if it already exists
    async fn mkdir_all(&self, path: &str) -> Result<()>;

    /// Rename or move a path
    async fn rename(&self, from: &str, to: &str) -> Result<()>;

    /// Expand a shell-style pattern relative to `wd`
    ///
    /// Matches are relative to `wd` unless the pattern is absolute. The default
    /// walks the tree with [`Backend::read_dir`]; backends with a native glob
    /// may override it.
    async fn glob(&self, wd: &str, pattern: &str) -> Result<Vec<String>> {
        crate::glob::walk(self, wd, pattern).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_entry_file() {
        let entry = FileEntry::file("test.txt", 1024);
        assert_eq!(entry.name, "test.txt");
        assert_eq!(entry.size, 1024);
        assert!(entry.is_regular());
        assert!(!entry.is_dir());
        assert_eq!(entry.size_human(), "1 KiB");
    }

    #[test]
    fn test_file_entry_dir() {
        let entry = FileEntry::dir("docs");
        assert!(entry.is_dir());
        assert!(!entry.is_regular());
        assert_eq!(entry.mode_string(), "drwxr-xr-x");
    }

    #[test]
    fn test_mode_string_file() {
        let mut entry = FileEntry::file("run.sh", 10);
        entry.mode = 0o750;
        assert_eq!(entry.mode_string(), "-rwxr-x---");
    }
}
