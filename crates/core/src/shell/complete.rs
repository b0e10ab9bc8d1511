//! Path completion
//!
//! Completes the token being typed against the entries of the directory it
//! points into. Candidates come back shell-quoted and prefixed with the
//! directory part the operator already typed.

use std::borrow::Cow;
use std::sync::Arc;

use crate::backend::{Backend, FileEntry};
use crate::path;
use crate::shell::command::{self, Command, Side};
use crate::shell::words;

/// Which entries a command accepts as a path argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// Directories only, each with a trailing separator
    DirsOnly,
    /// Regular files only
    FilesOnly,
    /// Anything; directories get a trailing separator
    Any,
}

/// Names from `entries` matching `prefix`, sorted
pub fn filter_names(prefix: &str, entries: &[FileEntry], kind: CompletionKind) -> Vec<String> {
    let mut names: Vec<String> = entries
        .iter()
        .filter_map(|entry| match kind {
            CompletionKind::DirsOnly if entry.is_dir() => Some(format!("{}/", entry.name)),
            CompletionKind::DirsOnly => None,
            CompletionKind::FilesOnly if entry.is_regular() => Some(entry.name.clone()),
            CompletionKind::FilesOnly => None,
            CompletionKind::Any if entry.is_dir() => Some(format!("{}/", entry.name)),
            CompletionKind::Any => Some(entry.name.clone()),
        })
        .filter(|name| name.starts_with(prefix))
        .collect();
    names.sort_unstable();
    names
}

/// Complete `input` relative to `wd` on `backend`
///
/// Returns nothing when the directory cannot be listed.
pub async fn complete_path(
    backend: &dyn Backend,
    wd: &str,
    input: &str,
    kind: CompletionKind,
) -> Vec<String> {
    let (cand, dir, display) = path::candidate(wd, input);
    let Ok(entries) = backend.read_dir(&dir).await else {
        return Vec::new();
    };

    filter_names(&cand, &entries, kind)
        .into_iter()
        .filter_map(|name| {
            let full = path::join(&display, &name);
            shlex::try_quote(&full).ok().map(Cow::into_owned)
        })
        .collect()
}

/// Completes whole input lines against a snapshot of a session
#[derive(Clone)]
pub struct LineCompleter {
    local: Arc<dyn Backend>,
    remote: Arc<dyn Backend>,
    local_wd: String,
    remote_wd: String,
}

impl LineCompleter {
    pub fn new(
        local: Arc<dyn Backend>,
        remote: Arc<dyn Backend>,
        local_wd: String,
        remote_wd: String,
    ) -> Self {
        Self {
            local,
            remote,
            local_wd,
            remote_wd,
        }
    }

    /// Completions for a partially typed line
    ///
    /// Each candidate is the whole line as it would read after completing.
    /// The first word completes to command names; later words complete to
    /// paths for commands that take them.
    pub async fn complete_line(&self, line: &str) -> Vec<String> {
        let scan = words::scan(line);
        let typing_command = match scan.words.as_slice() {
            [] => Some((line.len(), "")),
            [only] if !scan.trailing_space => Some((only.start, only.text.as_str())),
            _ => None,
        };
        if let Some((start, typed)) = typing_command {
            let typed = typed.to_lowercase();
            return command::NAMES
                .iter()
                .filter(|name| name.starts_with(&typed))
                .map(|name| format!("{}{name} ", &line[..start]))
                .collect();
        }
        let Some(first) = scan.words.first() else {
            return Vec::new();
        };

        let Ok(command) = first.text.to_lowercase().parse::<Command>() else {
            return Vec::new();
        };
        let Some(kind) = command.completion() else {
            return Vec::new();
        };

        // the word under the cursor, or a new empty one after trailing space
        let (start, current) = match scan.words.last() {
            Some(word) if !scan.trailing_space => (word.start, word.text.as_str()),
            _ => (line.len(), ""),
        };
        let arg_count = scan.words.len() - 1 + usize::from(scan.trailing_space);
        if command.single_argument() && arg_count > 1 {
            return Vec::new();
        }

        let (backend, wd) = match command.side() {
            Side::Local => (&self.local, &self.local_wd),
            Side::Remote => (&self.remote, &self.remote_wd),
        };
        let head = &line[..start];
        complete_path(backend.as_ref(), wd, current, kind)
            .await
            .into_iter()
            .map(|candidate| format!("{head}{candidate}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::local::LocalFs;

    fn s(p: &Path) -> String {
        p.to_string_lossy().into_owned()
    }

    fn sample() -> Vec<FileEntry> {
        vec![
            FileEntry::dir("foobar"),
            FileEntry::dir("foo"),
            FileEntry::file("bar.txt", 3),
            FileEntry::file("food.txt", 3),
        ]
    }

    #[test]
    fn test_filter_dirs_only() {
        assert_eq!(
            filter_names("foo", &sample(), CompletionKind::DirsOnly),
            vec!["foo/", "foobar/"]
        );
    }

    #[test]
    fn test_filter_files_only() {
        assert_eq!(
            filter_names("", &sample(), CompletionKind::FilesOnly),
            vec!["bar.txt", "food.txt"]
        );
    }

    #[test]
    fn test_filter_any_marks_directories() {
        assert_eq!(
            filter_names("foo", &sample(), CompletionKind::Any),
            vec!["foo/", "foobar/", "food.txt"]
        );
    }

    #[tokio::test]
    async fn test_complete_cd_in_working_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("foo")).unwrap();
        std::fs::create_dir(dir.path().join("foobar")).unwrap();
        std::fs::write(dir.path().join("bar.txt"), b"").unwrap();

        let got = complete_path(&LocalFs::new(), &s(dir.path()), "foo", CompletionKind::DirsOnly).await;
        assert_eq!(got, vec!["foo/", "foobar/"]);
    }

    #[tokio::test]
    async fn test_complete_nested_keeps_typed_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/bin")).unwrap();
        std::fs::write(dir.path().join("src/main.rs"), b"").unwrap();

        let fs = LocalFs::new();
        let got = complete_path(&fs, &s(dir.path()), "src/", CompletionKind::Any).await;
        assert_eq!(got, vec!["src/bin/", "src/main.rs"]);

        let got = complete_path(&fs, &s(dir.path()), "src/m", CompletionKind::Any).await;
        assert_eq!(got, vec!["src/main.rs"]);
    }

    #[tokio::test]
    async fn test_complete_absolute_input_stays_absolute() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("logs")).unwrap();

        let input = format!("{}/lo", s(dir.path()));
        let got = complete_path(&LocalFs::new(), "/", &input, CompletionKind::DirsOnly).await;
        assert_eq!(got, vec![format!("{}/logs/", s(dir.path()))]);
    }

    #[tokio::test]
    async fn test_complete_quotes_spaces() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("my docs")).unwrap();

        let got = complete_path(&LocalFs::new(), &s(dir.path()), "my", CompletionKind::DirsOnly).await;
        assert_eq!(got, vec!["'my docs/'"]);
    }

    #[tokio::test]
    async fn test_complete_unlistable_directory() {
        let dir = TempDir::new().unwrap();
        let got = complete_path(&LocalFs::new(), &s(dir.path()), "nope/", CompletionKind::Any).await;
        assert!(got.is_empty());
    }
}
