//! Interactive browser decisions
//!
//! The browser alternates between showing a directory and acting on what the
//! operator picked. Rendering belongs to the [`Picker`](crate::shell::Picker);
//! this module only decides what a selection means.

use crate::backend::FileEntry;
use crate::path;

/// What the browser does with a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseStep {
    /// Selection cancelled; leave the browser
    Quit,
    /// Move to the parent directory
    Ascend,
    /// Change into the named directory
    Enter(String),
    /// Show the named file
    View(String),
}

/// Map a picker result to the next browser step
pub fn next_step(selected: Option<&FileEntry>) -> BrowseStep {
    match selected {
        None => BrowseStep::Quit,
        Some(entry) if entry.name.is_empty() => BrowseStep::Quit,
        Some(entry) if entry.name == ".." => BrowseStep::Ascend,
        Some(entry) if entry.is_dir() => BrowseStep::Enter(entry.name.clone()),
        Some(entry) => BrowseStep::View(entry.name.clone()),
    }
}

/// Entries to offer for `wd`: a parent marker unless at the root, then
/// directories and files sorted by name
pub fn offered_entries(wd: &str, mut entries: Vec<FileEntry>) -> Vec<FileEntry> {
    entries.sort_by(|a, b| b.is_dir().cmp(&a.is_dir()).then_with(|| a.name.cmp(&b.name)));
    if path::clean(wd) != "/" {
        entries.insert(0, FileEntry::parent_marker());
    }
    entries
}
