//! Glob matching
//!
//! Expands shell-style patterns against a backend's directory tree. The
//! generic walker only needs `stat` and `read_dir`, so it works over the
//! network; the local backend swaps in the `glob` crate's native walker.

use std::collections::BTreeSet;

use tracing::debug;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::path;

/// Whether the pattern contains glob metacharacters
pub fn has_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Compile a single pattern element
pub fn compile(pattern: &str, element: &str) -> Result<::glob::Pattern> {
    ::glob::Pattern::new(element).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.msg.to_string(),
    })
}

/// Expand `pattern` relative to `wd` using only `stat` and `read_dir`
///
/// A pattern without metacharacters matches itself if the path exists.
/// Matches are relative to `wd` unless the pattern is absolute, and are
/// sorted by name within each directory.
pub async fn walk<B: Backend + ?Sized>(backend: &B, wd: &str, pattern: &str) -> Result<Vec<String>> {
    if !has_meta(pattern) {
        return Ok(match backend.stat(&path::join(wd, pattern)).await {
            Ok(_) => vec![pattern.to_string()],
            Err(_) => Vec::new(),
        });
    }

    let dirs_only = pattern.len() > 1 && pattern.ends_with(path::SEPARATOR);
    let trimmed = if dirs_only {
        pattern.trim_end_matches(path::SEPARATOR)
    } else {
        pattern
    };

    let (dir_part, file_part) = match trimmed.rfind(path::SEPARATOR) {
        Some(0) => ("/", &trimmed[1..]),
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
        None => (".", trimmed),
    };
    let matcher = compile(pattern, file_part)?;

    let dirs = if has_meta(dir_part) {
        Box::pin(walk(backend, wd, dir_part)).await?
    } else {
        vec![dir_part.to_string()]
    };

    let mut matches = Vec::new();
    for dir in dirs {
        let listed = path::join(wd, &dir);
        let mut entries = match backend.read_dir(&listed).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(pattern, dir = %listed, error = %e, "skipping unreadable directory");
                continue;
            }
        };
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        for entry in entries {
            if dirs_only && !entry.is_dir() {
                continue;
            }
            if matcher.matches(&entry.name) {
                if dir == "." {
                    matches.push(entry.name);
                } else {
                    matches.push(path::join(&dir, &entry.name));
                }
            }
        }
    }

    debug!(pattern, count = matches.len(), "{} glob expanded", backend.label());
    Ok(matches)
}

/// Resolve shell arguments to a de-duplicated set of absolute paths
///
/// With no arguments the set holds only `wd`. A pattern that cannot be
/// expanded fails the whole call, since it points at a typing mistake rather
/// than a per-file condition.
pub async fn find_matches(
    args: &[String],
    wd: &str,
    backend: &dyn Backend,
) -> Result<BTreeSet<String>> {
    let mut all = BTreeSet::new();
    if args.is_empty() {
        all.insert(wd.to_string());
        return Ok(all);
    }

    for pattern in args {
        let matches = backend.glob(wd, pattern).await.map_err(|e| match e {
            Error::InvalidPattern { .. } => e,
            other => Error::InvalidPattern {
                pattern: pattern.clone(),
                reason: other.to_string(),
            },
        })?;
        for m in matches {
            all.insert(path::join(wd, &m));
        }
    }
    Ok(all)
}
