//! Recursive transfers between two backends
//!
//! Downloads copy from the remote backend into the local working directory,
//! uploads go the other way. Both run the same engine with the roles of the
//! backends swapped.

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::path;
use crate::shell::Reporter;

/// Transfer direction, used for messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Download,
    Upload,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Direction::Download => "download",
            Direction::Upload => "upload",
        }
    }

    fn done(self) -> &'static str {
        match self {
            Direction::Download => "downloaded",
            Direction::Upload => "uploaded",
        }
    }
}

/// Copies files and trees from `source` to `target`
pub struct Transfer<'a> {
    source: &'a dyn Backend,
    target: &'a dyn Backend,
    reporter: &'a dyn Reporter,
    direction: Direction,
}

impl<'a> Transfer<'a> {
    pub fn new(
        source: &'a dyn Backend,
        target: &'a dyn Backend,
        reporter: &'a dyn Reporter,
        direction: Direction,
    ) -> Self {
        Self {
            source,
            target,
            reporter,
            direction,
        }
    }

    /// Copy each of `names` (resolved against `source_wd`) into `target_dir`
    ///
    /// Directories are copied before plain files. Names that cannot be
    /// stat'd, or that are neither a directory nor a regular file, are
    /// reported and skipped.
    pub async fn run(&self, source_wd: &str, target_dir: &str, names: &[String]) {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        for name in names {
            let source = path::join(source_wd, name);
            match self.source.stat(&source).await {
                Ok(entry) if entry.is_dir() => dirs.push(source),
                Ok(entry) if entry.is_regular() => files.push(source),
                Ok(_) => self.reporter.error(&format!("not a regular file: {name}")),
                Err(e) => self.reporter.error(&format!("{name}: {e}")),
            }
        }

        for dir in &dirs {
            if let Err(e) = self.copy_dir(target_dir, dir).await {
                self.reporter
                    .error(&format!("{} {dir}: {e}", self.direction.verb()));
            }
        }
        for file in &files {
            if let Err(e) = self.copy_file(target_dir, file).await {
                self.reporter
                    .error(&format!("{} {file}: {e}", self.direction.verb()));
            }
        }
    }

    /// Stream one file into `target_dir`, keeping its name
    pub async fn copy_file(&self, target_dir: &str, source_file: &str) -> Result<()> {
        let mut reader = self.source.open(source_file).await?;
        let dest = path::join(target_dir, &path::base(source_file));
        let mut writer = self.target.create(&dest).await?;

        let bytes = tokio::io::copy(&mut reader, &mut writer)
            .await
            .map_err(|e| Error::from_io(e, &dest))?;
        writer
            .shutdown()
            .await
            .map_err(|e| Error::from_io(e, &dest))?;

        debug!(source = source_file, dest = %dest, bytes, "{} complete", self.direction.verb());
        self.reporter
            .info(&format!("{} {source_file}", self.direction.done()));
        Ok(())
    }

    /// Mirror `source_dir` as a child of `target_dir`
    ///
    /// The destination directory may already exist. Failures on individual
    /// children are reported and do not stop their siblings; the step itself
    /// succeeds once every child has been attempted.
    pub async fn copy_dir(&self, target_dir: &str, source_dir: &str) -> Result<()> {
        let entries = self.source.read_dir(source_dir).await?;
        let dest = path::join(target_dir, &path::base(source_dir));
        if let Err(e) = self.target.mkdir(&dest).await {
            if !e.is_already_exists() {
                return Err(e);
            }
        }

        for entry in entries {
            let child = path::join(source_dir, &entry.name);
            let result = if entry.is_dir() {
                Box::pin(self.copy_dir(&dest, &child)).await
            } else if entry.is_regular() {
                self.copy_file(&dest, &child).await
            } else {
                debug!(path = %child, "skipping special file");
                continue;
            };
            if let Err(e) = result {
                self.reporter
                    .error(&format!("{} {child}: {e}", self.direction.verb()));
            }
        }

        self.reporter
            .info(&format!("{} {source_dir}", self.direction.done()));
        Ok(())
    }
}
