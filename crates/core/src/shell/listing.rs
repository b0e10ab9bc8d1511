//! `ls` output
//!
//! Matches are grouped by the directory they were listed from. Files named
//! directly on the command line go into the current-directory bucket, which
//! is printed first and without a header.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use console::style;

use crate::backend::{Backend, FileEntry};
use crate::error::Result;
use crate::glob::find_matches;
use crate::path;
use crate::shell::Reporter;

/// Bucket key for the working directory itself
const CURRENT: &str = ".";

/// Width used when the terminal size is unknown
pub const DEFAULT_WIDTH: usize = 80;

/// Entries grouped by relative directory name
#[derive(Debug, Default)]
pub struct Listing {
    buckets: BTreeMap<String, BTreeMap<String, FileEntry>>,
}

impl Listing {
    /// Resolve `args` against `wd` and gather what to print
    ///
    /// A pattern error fails the whole listing. A match that cannot be
    /// stat'd or read is reported and left out.
    pub async fn collect(
        backend: &dyn Backend,
        reporter: &dyn Reporter,
        wd: &str,
        args: &[String],
    ) -> Result<Self> {
        let matches = find_matches(args, wd, backend).await?;
        let mut listing = Listing::default();
        listing.buckets.entry(CURRENT.to_string()).or_default();

        for matched in matches {
            let rel = path::relative(wd, &matched).unwrap_or_else(|| matched.clone());
            let entry = match backend.stat(&matched).await {
                Ok(entry) => entry,
                Err(e) => {
                    reporter.error(&format!("{rel}: {e}"));
                    continue;
                }
            };

            if entry.is_dir() {
                let children = match backend.read_dir(&matched).await {
                    Ok(children) => children,
                    Err(e) => {
                        reporter.error(&format!("{rel}: {e}"));
                        continue;
                    }
                };
                let bucket = listing.buckets.entry(rel).or_default();
                for child in children {
                    bucket.insert(child.name.clone(), child);
                }
            } else {
                let entry = FileEntry {
                    name: rel.clone(),
                    ..entry
                };
                listing
                    .buckets
                    .entry(CURRENT.to_string())
                    .or_default()
                    .insert(rel, entry);
            }
        }

        Ok(listing)
    }

    /// Relative directory names that will be printed, in print order
    pub fn directories(&self) -> Vec<&str> {
        let mut out = Vec::new();
        if self.buckets.get(CURRENT).is_some_and(|b| !b.is_empty()) {
            out.push(CURRENT);
        }
        out.extend(
            self.buckets
                .iter()
                .filter(|(dir, bucket)| dir.as_str() != CURRENT && !bucket.is_empty())
                .map(|(dir, _)| dir.as_str()),
        );
        out
    }

    /// Render every non-empty bucket as columns fitting `width`
    pub fn render(&self, width: usize, color: bool) -> String {
        let mut out = String::new();
        for dir in self.directories() {
            if dir != CURRENT {
                let _ = writeln!(out, "{dir}:");
            }
            if let Some(bucket) = self.buckets.get(dir) {
                let entries: Vec<&FileEntry> = bucket.values().collect();
                out.push_str(&columns(&entries, width, color));
            }
            out.push('\n');
        }
        out
    }
}

/// Lay out names top to bottom, then left to right
fn columns(entries: &[&FileEntry], width: usize, color: bool) -> String {
    if entries.is_empty() {
        return String::new();
    }

    let names: Vec<String> = entries
        .iter()
        .map(|e| {
            if e.is_dir() {
                format!("{}/", e.name)
            } else {
                e.name.clone()
            }
        })
        .collect();

    let cell = names.iter().map(|n| n.chars().count()).max().unwrap_or(0) + 2;
    let cols = (width / cell).max(1);
    let rows = names.len().div_ceil(cols);

    let mut out = String::new();
    for row in 0..rows {
        let mut line = String::new();
        for col in 0..cols {
            let idx = col * rows + row;
            let Some(name) = names.get(idx) else {
                break;
            };
            let pad = cell - name.chars().count();
            if color && entries[idx].is_dir() {
                let _ = write!(line, "{}", style(name).blue().bold().force_styling(true));
            } else {
                line.push_str(name);
            }
            line.extend(std::iter::repeat_n(' ', pad));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::local::LocalFs;
    use crate::shell::io::testing::RecordingReporter;

    fn s(p: &Path) -> String {
        p.to_string_lossy().into_owned()
    }

    fn args(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_columns_fill_top_to_bottom() {
        let entries: Vec<FileEntry> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| FileEntry::file(*n, 0))
            .collect();
        let refs: Vec<&FileEntry> = entries.iter().collect();
        // cell width 3, three columns fit in 9
        assert_eq!(columns(&refs, 9, false), "a  c  e\nb  d\n");
    }

    #[test]
    fn test_columns_narrow_terminal() {
        let entries = [FileEntry::file("long-name", 0), FileEntry::dir("dir")];
        let refs: Vec<&FileEntry> = entries.iter().collect();
        assert_eq!(columns(&refs, 4, false), "long-name\ndir/\n");
    }

    #[tokio::test]
    async fn test_no_args_lists_working_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b"), b"").unwrap();
        std::fs::write(dir.path().join("a"), b"").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let reporter = RecordingReporter::default();

        let listing = Listing::collect(&LocalFs::new(), &reporter, &s(dir.path()), &[])
            .await
            .unwrap();
        assert_eq!(listing.render(80, false), "a     b     sub/\n\n");
    }

    #[tokio::test]
    async fn test_patterns_group_by_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("x")).unwrap();
        std::fs::create_dir(dir.path().join("y")).unwrap();
        std::fs::write(dir.path().join("x/2.txt"), b"").unwrap();
        std::fs::write(dir.path().join("x/1.txt"), b"").unwrap();
        std::fs::write(dir.path().join("y/z.txt"), b"").unwrap();
        let reporter = RecordingReporter::default();

        let listing = Listing::collect(
            &LocalFs::new(),
            &reporter,
            &s(dir.path()),
            &args(&["y", "x"]),
        )
        .await
        .unwrap();

        assert_eq!(listing.directories(), vec!["x", "y"]);
        assert_eq!(
            listing.render(80, false),
            "x:\n1.txt  2.txt\n\ny:\nz.txt\n\n"
        );
    }

    #[tokio::test]
    async fn test_file_matches_share_current_bucket() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("x")).unwrap();
        std::fs::write(dir.path().join("x/a.log"), b"").unwrap();
        std::fs::write(dir.path().join("b.log"), b"").unwrap();
        let reporter = RecordingReporter::default();

        let listing = Listing::collect(
            &LocalFs::new(),
            &reporter,
            &s(dir.path()),
            &args(&["*.log", "x/*.log"]),
        )
        .await
        .unwrap();

        assert_eq!(listing.directories(), vec!["."]);
        assert_eq!(listing.render(80, false), "b.log    x/a.log\n\n");
    }

    #[tokio::test]
    async fn test_empty_directory_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        let reporter = RecordingReporter::default();

        let listing = Listing::collect(
            &LocalFs::new(),
            &reporter,
            &s(dir.path()),
            &args(&["empty"]),
        )
        .await
        .unwrap();
        assert_eq!(listing.render(80, false), "");
    }

    #[tokio::test]
    async fn test_bad_pattern_fails_listing() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::default();
        let err = Listing::collect(&LocalFs::new(), &reporter, &s(dir.path()), &args(&["[x"]))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid pattern [x"));
    }
}
