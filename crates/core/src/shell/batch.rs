//! Batch operations and recursive delete
//!
//! A batch applies one operation to each argument in turn. A failing item is
//! reported and skipped; the batch as a whole still succeeds.

use tracing::debug;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::path;
use crate::shell::Reporter;

/// Single-item operation applied by a batch command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOp {
    Mkdir,
    MkdirAll,
    Remove,
    RemoveTree,
}

impl BatchOp {
    async fn apply(self, backend: &dyn Backend, reporter: &dyn Reporter, target: &str) -> Result<()> {
        match self {
            BatchOp::Mkdir => backend.mkdir(target).await,
            BatchOp::MkdirAll => backend.mkdir_all(target).await,
            BatchOp::Remove => backend.remove(target).await,
            BatchOp::RemoveTree => remove_tree(backend, reporter, target).await,
        }
    }
}

/// Apply `op` to every argument resolved against `wd`
///
/// `command` names the operation in usage errors. Each failure is reported
/// as `<arg>: <error>`.
pub async fn run(
    op: BatchOp,
    command: &str,
    backend: &dyn Backend,
    reporter: &dyn Reporter,
    wd: &str,
    args: &[String],
) -> Result<String> {
    if args.is_empty() {
        return Err(Error::Usage(format!("{command} needs at least one argument")));
    }

    for name in args {
        let target = path::join(wd, name);
        debug!(?op, target = %target, "{} batch item", backend.label());
        if let Err(e) = op.apply(backend, reporter, &target).await {
            reporter.error(&format!("{name}: {e}"));
        }
    }
    Ok(String::new())
}

/// Remove a file, or a directory and everything below it
///
/// Symlinks are never followed: a link to a directory is removed as a
/// plain entry and its target is left alone. Children are removed depth first. A child that cannot be removed is
/// reported and its siblings are still processed. The directory itself is
/// always attempted; if any child failed, the first child error is returned
/// so the caller knows the tree was not fully removed.
pub async fn remove_tree(backend: &dyn Backend, reporter: &dyn Reporter, dir: &str) -> Result<()> {
    let entry = backend.symlink_stat(dir).await?;
    if !entry.is_dir() {
        return backend.remove(dir).await;
    }

    let mut first_error = None;
    remove_children(backend, reporter, dir, &mut first_error).await?;
    let removed = backend.remove(dir).await;

    match first_error {
        Some(e) => Err(e),
        None => removed,
    }
}

async fn remove_children(
    backend: &dyn Backend,
    reporter: &dyn Reporter,
    dir: &str,
    first_error: &mut Option<Error>,
) -> Result<()> {
    let entries = backend.read_dir(dir).await?;
    for entry in entries {
        let child = path::join(dir, &entry.name);
        let (verb, result) = if entry.is_dir() {
            ("rmdir", Box::pin(remove_tree(backend, reporter, &child)).await)
        } else {
            ("rm", backend.remove(&child).await)
        };
        if let Err(e) = result {
            reporter.error(&format!("{verb} on {child}: {e}"));
            first_error.get_or_insert(e);
        }
    }
    Ok(())
}
