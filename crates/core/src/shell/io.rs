//! Operator-facing collaborators
//!
//! The shell never writes to the terminal itself. Batch progress goes to a
//! [`Reporter`], interactive selection to a [`Picker`] and file content to a
//! [`Viewer`]. The CLI provides console implementations; tests record calls.

use std::sync::Arc;

use crate::backend::FileEntry;
use crate::error::Result;
use crate::shell::Side;

/// Sink for non-fatal batch messages
pub trait Reporter: Send + Sync {
    /// Progress or success of one item
    fn info(&self, message: &str);

    /// Failure of one item; processing continues after this call
    fn error(&self, message: &str);
}

/// Interactive selection over directory entries
pub trait Picker: Send + Sync {
    /// Select any number of entries from `wd` for a transfer
    ///
    /// An empty result means the operator selected nothing.
    fn pick_many(&self, wd: &str, entries: &[FileEntry]) -> Result<Vec<String>>;

    /// Select a single entry for the browser; `None` means cancelled
    fn pick_one(&self, wd: &str, entries: &[FileEntry], side: Side) -> Result<Option<FileEntry>>;
}

/// Displays file content to the operator
pub trait Viewer: Send + Sync {
    /// Show `content` read from `name`, through an external pager if `pager` is set
    fn show(&self, name: &str, content: &[u8], pager: bool) -> Result<()>;
}

/// The collaborators a session talks to
#[derive(Clone)]
pub struct ShellIo {
    pub reporter: Arc<dyn Reporter>,
    pub picker: Arc<dyn Picker>,
    pub viewer: Arc<dyn Viewer>,
}

impl ShellIo {
    pub fn new(
        reporter: Arc<dyn Reporter>,
        picker: Arc<dyn Picker>,
        viewer: Arc<dyn Viewer>,
    ) -> Self {
        Self {
            reporter,
            picker,
            viewer,
        }
    }
}
