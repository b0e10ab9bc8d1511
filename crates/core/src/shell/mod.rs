//! Interactive shell session
//!
//! A [`Session`] owns both backends and both working directories. Each input
//! line goes through [`Session::dispatch`], which parses it into a
//! [`Command`] and runs the matching handler against the side the command
//! names. Per-item failures in batch commands go to the [`Reporter`]; only
//! usage errors and failures that stop a command outright are returned.

pub mod batch;
pub mod browse;
pub mod command;
pub mod complete;
pub mod io;
pub mod listing;
pub mod transfer;
pub mod words;

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::path;

pub use batch::BatchOp;
pub use browse::BrowseStep;
pub use command::{Command, Side};
pub use complete::{CompletionKind, LineCompleter};
pub use io::{Picker, Reporter, ShellIo, Viewer};
pub use listing::Listing;
pub use transfer::{Direction, Transfer};

/// Result of dispatching one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to print; may be empty
    Output(String),
    /// The operator asked to end the session
    Exit,
}

/// Display preferences for a session
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Send `less` output through an external pager
    pub pager: bool,
    /// Color directory names in listings
    pub color: bool,
    /// Terminal width for listings; 80 columns when unknown
    pub width: Option<usize>,
}

/// State of one interactive session
pub struct Session {
    local: Arc<dyn Backend>,
    remote: Arc<dyn Backend>,
    local_wd: String,
    remote_wd: String,
    initial_remote_wd: String,
    home_dir: Option<String>,
    io: ShellIo,
    options: SessionOptions,
}

impl Session {
    /// Start a session in the backends' current directories
    pub async fn new(
        local: Arc<dyn Backend>,
        remote: Arc<dyn Backend>,
        io: ShellIo,
        options: SessionOptions,
    ) -> Result<Self> {
        let local_wd = local.getwd().await?;
        let remote_wd = remote.getwd().await?;
        Ok(Self::with_working_dirs(
            local, remote, local_wd, remote_wd, io, options,
        ))
    }

    /// Start a session in explicit working directories
    ///
    /// `remote_wd` becomes the directory `cd` returns to without arguments.
    pub fn with_working_dirs(
        local: Arc<dyn Backend>,
        remote: Arc<dyn Backend>,
        local_wd: String,
        remote_wd: String,
        io: ShellIo,
        options: SessionOptions,
    ) -> Self {
        let home_dir = dirs::home_dir().map(|p| p.to_string_lossy().into_owned());
        Self {
            local,
            remote,
            local_wd: path::clean(&local_wd),
            initial_remote_wd: path::clean(&remote_wd),
            remote_wd: path::clean(&remote_wd),
            home_dir,
            io,
            options,
        }
    }

    /// Override where `lcd` without arguments goes
    pub fn set_home_dir(&mut self, home: impl Into<String>) {
        self.home_dir = Some(home.into());
    }

    /// Update the terminal width used by listings
    pub fn set_width(&mut self, width: Option<usize>) {
        self.options.width = width;
    }

    pub fn local_wd(&self) -> &str {
        &self.local_wd
    }

    pub fn remote_wd(&self) -> &str {
        &self.remote_wd
    }

    pub fn initial_remote_wd(&self) -> &str {
        &self.initial_remote_wd
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Backend for one side
    pub fn backend(&self, side: Side) -> Arc<dyn Backend> {
        match side {
            Side::Local => Arc::clone(&self.local),
            Side::Remote => Arc::clone(&self.remote),
        }
    }

    /// Working directory for one side
    pub fn wd(&self, side: Side) -> &str {
        match side {
            Side::Local => &self.local_wd,
            Side::Remote => &self.remote_wd,
        }
    }

    /// Parse and run one input line
    ///
    /// Blank lines do nothing. Unbalanced quotes and unknown commands are
    /// errors; `exit` and `logout` yield [`Outcome::Exit`].
    pub async fn dispatch(&mut self, line: &str) -> Result<Outcome> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Outcome::Output(String::new()));
        }

        let words = words::split(line)?;
        let Some((first, args)) = words.split_first() else {
            return Ok(Outcome::Output(String::new()));
        };

        let command: Command = first.to_lowercase().parse()?;
        debug!(command = command.name(), args = args.len(), "dispatch");
        if command == Command::Exit {
            return Ok(Outcome::Exit);
        }
        self.run(command, args).await.map(Outcome::Output)
    }

    async fn run(&mut self, command: Command, args: &[String]) -> Result<String> {
        match command {
            Command::Cd(side) => self.cd(side, args).await,
            Command::Pwd(side) => self.pwd(side, args),
            Command::Ls(side) => self.ls(side, args).await,
            Command::Browse(side) => self.browse(side, args).await,
            Command::Less(side) => self.less(side, args).await,
            Command::Get => self.transfer(Direction::Download, args).await,
            Command::Put => self.transfer(Direction::Upload, args).await,
            Command::Mkdir(side) => self.batch(BatchOp::Mkdir, command, side, args).await,
            Command::MkdirAll(side) => self.batch(BatchOp::MkdirAll, command, side, args).await,
            Command::Rm(side) => self.batch(BatchOp::Remove, command, side, args).await,
            Command::Rmdir(side) => self.batch(BatchOp::RemoveTree, command, side, args).await,
            Command::Rename => self.rename(args).await,
            Command::Help => Ok(Command::help().to_string()),
            Command::Exit => Ok(String::new()),
        }
    }

    /// Change a working directory after checking the target is a listable directory
    async fn cd(&mut self, side: Side, args: &[String]) -> Result<String> {
        let name = Command::Cd(side).name();
        if args.len() > 1 {
            return Err(Error::Usage(format!("{name} takes only one argument")));
        }

        let target = match (args.first(), side) {
            (Some(arg), _) => arg.clone(),
            (None, Side::Remote) => self.initial_remote_wd.clone(),
            (None, Side::Local) => self
                .home_dir
                .clone()
                .ok_or_else(|| Error::General("could not determine home directory".into()))?,
        };

        let dir = path::clean(&path::join(self.wd(side), &target));
        let backend = self.backend(side);
        let entry = backend.stat(&dir).await?;
        if !entry.is_dir() {
            return Err(Error::NotADirectory(dir));
        }
        backend.read_dir(&dir).await?;

        debug!(side = side.label(), dir = %dir, "working directory changed");
        match side {
            Side::Local => self.local_wd = dir,
            Side::Remote => self.remote_wd = dir,
        }
        Ok(String::new())
    }

    fn pwd(&self, side: Side, args: &[String]) -> Result<String> {
        if !args.is_empty() {
            let name = Command::Pwd(side).name();
            return Err(Error::Usage(format!("{name} takes no argument")));
        }
        Ok(self.wd(side).to_string())
    }

    async fn ls(&self, side: Side, args: &[String]) -> Result<String> {
        let backend = self.backend(side);
        let listing = Listing::collect(
            backend.as_ref(),
            self.io.reporter.as_ref(),
            self.wd(side),
            args,
        )
        .await?;
        let width = self.options.width.unwrap_or(listing::DEFAULT_WIDTH);
        Ok(listing.render(width, self.options.color))
    }

    async fn less(&self, side: Side, args: &[String]) -> Result<String> {
        if args.len() != 1 {
            let name = Command::Less(side).name();
            return Err(Error::Usage(format!("{name} takes one argument")));
        }
        let file = path::join(self.wd(side), &args[0]);
        let mut reader = self.backend(side).open(&file).await?;
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .await
            .map_err(|e| Error::from_io(e, &file))?;
        self.io.viewer.show(&file, &content, self.options.pager)?;
        Ok(String::new())
    }

    /// Browse a side until the operator cancels
    async fn browse(&mut self, side: Side, args: &[String]) -> Result<String> {
        if !args.is_empty() {
            let name = Command::Browse(side).name();
            return Err(Error::Usage(format!("{name} takes no argument")));
        }

        loop {
            let wd = self.wd(side).to_string();
            let entries = self.backend(side).read_dir(&wd).await?;
            let offered = browse::offered_entries(&wd, entries);
            let selected = self.io.picker.pick_one(&wd, &offered, side)?;

            match browse::next_step(selected.as_ref()) {
                BrowseStep::Quit => return Ok(String::new()),
                BrowseStep::Ascend => {
                    self.cd(side, &["..".to_string()]).await?;
                }
                BrowseStep::Enter(name) => {
                    self.cd(side, &[name]).await?;
                }
                BrowseStep::View(name) => {
                    self.less(side, &[name]).await?;
                }
            }
        }
    }

    async fn transfer(&self, direction: Direction, args: &[String]) -> Result<String> {
        let (source_side, target_side) = match direction {
            Direction::Download => (Side::Remote, Side::Local),
            Direction::Upload => (Side::Local, Side::Remote),
        };
        let source = self.backend(source_side);
        let target = self.backend(target_side);
        let source_wd = self.wd(source_side);

        let names = if args.is_empty() {
            let entries = source.read_dir(source_wd).await?;
            let picked = self.io.picker.pick_many(source_wd, &entries)?;
            if picked.is_empty() {
                return Ok(String::new());
            }
            picked
        } else {
            args.to_vec()
        };

        Transfer::new(
            source.as_ref(),
            target.as_ref(),
            self.io.reporter.as_ref(),
            direction,
        )
        .run(source_wd, self.wd(target_side), &names)
        .await;
        Ok(String::new())
    }

    async fn batch(
        &self,
        op: BatchOp,
        command: Command,
        side: Side,
        args: &[String],
    ) -> Result<String> {
        let backend = self.backend(side);
        batch::run(
            op,
            command.name(),
            backend.as_ref(),
            self.io.reporter.as_ref(),
            self.wd(side),
            args,
        )
        .await
    }

    async fn rename(&self, args: &[String]) -> Result<String> {
        let [from, to] = args else {
            return Err(Error::Usage("rename takes two arguments".to_string()));
        };
        let from = path::join(&self.remote_wd, from);
        let to = path::join(&self.remote_wd, to);
        self.remote.rename(&from, &to).await?;
        Ok(String::new())
    }

    /// Snapshot of the state tab completion needs
    ///
    /// The snapshot holds its own backend handles so a line editor can use
    /// it while the session is borrowed elsewhere.
    pub fn completer(&self) -> LineCompleter {
        LineCompleter::new(
            Arc::clone(&self.local),
            Arc::clone(&self.remote),
            self.local_wd.clone(),
            self.remote_wd.clone(),
        )
    }

    /// Completions for a partially typed line
    pub async fn complete_line(&self, line: &str) -> Vec<String> {
        self.completer().complete_line(line).await
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::io::testing::Harness;
    use super::*;
    use crate::backend::FileEntry;
    use crate::local::LocalFs;

    fn s(p: &Path) -> String {
        p.to_string_lossy().into_owned()
    }

    struct Fixture {
        local: TempDir,
        remote: TempDir,
        harness: Harness,
        session: Session,
    }

    fn fixture() -> Fixture {
        let local = TempDir::new().unwrap();
        let remote = TempDir::new().unwrap();
        let harness = Harness::new();
        let mut session = Session::with_working_dirs(
            Arc::new(LocalFs::new()),
            Arc::new(LocalFs::new()),
            s(local.path()),
            s(remote.path()),
            harness.io(),
            SessionOptions::default(),
        );
        session.set_home_dir(s(local.path()));
        Fixture {
            local,
            remote,
            harness,
            session,
        }
    }

    async fn output(session: &mut Session, line: &str) -> String {
        match session.dispatch(line).await.unwrap() {
            Outcome::Output(text) => text,
            Outcome::Exit => panic!("unexpected exit for {line}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_blank_and_exit() {
        let mut f = fixture();
        assert_eq!(output(&mut f.session, "   ").await, "");
        assert_eq!(f.session.dispatch("exit").await.unwrap(), Outcome::Exit);
        assert_eq!(f.session.dispatch("LOGOUT").await.unwrap(), Outcome::Exit);
    }

    #[tokio::test]
    async fn test_dispatch_errors() {
        let mut f = fixture();
        let err = f.session.dispatch("frob x").await.unwrap_err();
        assert_eq!(err.to_string(), "unknown command: frob");

        let err = f.session.dispatch("cd 'unterminated").await.unwrap_err();
        assert!(matches!(err, Error::Parse(_)));

        let err = f.session.dispatch("pwd extra").await.unwrap_err();
        assert_eq!(err.to_string(), "pwd takes no argument");

        let err = f.session.dispatch("rename only-one").await.unwrap_err();
        assert_eq!(err.to_string(), "rename takes two arguments");

        let err = f.session.dispatch("lless").await.unwrap_err();
        assert_eq!(err.to_string(), "lless takes one argument");
    }

    #[tokio::test]
    async fn test_pwd_both_sides() {
        let mut f = fixture();
        assert_eq!(output(&mut f.session, "pwd").await, s(f.remote.path()));
        assert_eq!(output(&mut f.session, "lpwd").await, s(f.local.path()));
    }

    #[tokio::test]
    async fn test_cd_and_reset() {
        let mut f = fixture();
        std::fs::create_dir_all(f.remote.path().join("a/b")).unwrap();
        let start = s(f.remote.path());

        output(&mut f.session, "cd a/b").await;
        assert_eq!(f.session.remote_wd(), format!("{start}/a/b"));

        output(&mut f.session, "cd ..").await;
        assert_eq!(f.session.remote_wd(), format!("{start}/a"));

        output(&mut f.session, "cd").await;
        assert_eq!(f.session.remote_wd(), start);

        output(&mut f.session, "cd a").await;
        output(&mut f.session, "cd ..").await;
        assert_eq!(f.session.remote_wd(), start);
    }

    #[tokio::test]
    async fn test_cd_rejects_bad_targets() {
        let mut f = fixture();
        std::fs::write(f.remote.path().join("file"), b"x").unwrap();
        let start = f.session.remote_wd().to_string();

        let err = f.session.dispatch("cd file").await.unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
        let err = f.session.dispatch("cd missing").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        let err = f.session.dispatch("cd a b").await.unwrap_err();
        assert_eq!(err.to_string(), "cd takes only one argument");

        assert_eq!(f.session.remote_wd(), start);
    }

    #[tokio::test]
    async fn test_lcd_without_argument_goes_home() {
        let mut f = fixture();
        std::fs::create_dir(f.local.path().join("sub")).unwrap();
        output(&mut f.session, "lcd sub").await;
        assert!(f.session.local_wd().ends_with("/sub"));

        output(&mut f.session, "lcd").await;
        assert_eq!(f.session.local_wd(), s(f.local.path()));
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let mut f = fixture();
        let tree = f.local.path().join("tree");
        std::fs::create_dir_all(tree.join("deep/er")).unwrap();
        std::fs::write(tree.join("one.txt"), b"first file").unwrap();
        std::fs::write(tree.join("deep/two.bin"), [9u8, 8, 7]).unwrap();
        std::fs::write(tree.join("deep/er/three"), b"").unwrap();

        output(&mut f.session, "put tree").await;
        assert!(f.harness.reporter.errors().is_empty());
        assert!(f.remote.path().join("tree/deep/er/three").exists());

        // fetch it back into a fresh local directory
        std::fs::create_dir(f.local.path().join("back")).unwrap();
        output(&mut f.session, "lcd back").await;
        output(&mut f.session, "get tree").await;
        assert!(f.harness.reporter.errors().is_empty());

        let back = f.local.path().join("back/tree");
        assert_eq!(std::fs::read(back.join("one.txt")).unwrap(), b"first file");
        assert_eq!(std::fs::read(back.join("deep/two.bin")).unwrap(), vec![9u8, 8, 7]);
        assert_eq!(std::fs::read(back.join("deep/er/three")).unwrap(), b"");
    }

    #[tokio::test]
    async fn test_get_without_arguments_uses_picker() {
        let mut f = fixture();
        std::fs::write(f.remote.path().join("wanted"), b"w").unwrap();
        std::fs::write(f.remote.path().join("skipped"), b"s").unwrap();

        f.harness.picker.push_many(&["wanted"]);
        output(&mut f.session, "get").await;
        assert!(f.local.path().join("wanted").exists());
        assert!(!f.local.path().join("skipped").exists());

        // nothing picked
        output(&mut f.session, "get").await;
        assert_eq!(f.harness.reporter.infos().len(), 1);
    }

    #[tokio::test]
    async fn test_rm_batch_reports_one_error() {
        let mut f = fixture();
        for name in ["a", "c"] {
            std::fs::write(f.remote.path().join(name), b"x").unwrap();
        }

        assert_eq!(output(&mut f.session, "rm a b c").await, "");
        assert!(!f.remote.path().join("a").exists());
        assert!(!f.remote.path().join("c").exists());
        assert_eq!(f.harness.reporter.errors().len(), 1);

        let err = f.session.dispatch("lrm").await.unwrap_err();
        assert_eq!(err.to_string(), "lrm needs at least one argument");
    }

    #[tokio::test]
    async fn test_mkdir_rmdir_rename() {
        let mut f = fixture();
        output(&mut f.session, "mkdirall x/y/z").await;
        std::fs::write(f.remote.path().join("x/y/z/f"), b"1").unwrap();
        output(&mut f.session, "rename x w").await;
        assert!(f.remote.path().join("w/y/z/f").exists());

        output(&mut f.session, "rmdir w").await;
        assert!(!f.remote.path().join("w").exists());

        output(&mut f.session, "lmkdir 'with space'").await;
        assert!(f.local.path().join("with space").is_dir());
        output(&mut f.session, "lrmdir 'with space'").await;
        assert!(!f.local.path().join("with space").exists());
        assert!(f.harness.reporter.errors().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_lrmdir_on_symlink_keeps_target() {
        let mut f = fixture();
        let target = TempDir::new().unwrap();
        std::fs::write(target.path().join("keep.txt"), b"keep").unwrap();
        std::os::unix::fs::symlink(target.path(), f.local.path().join("link")).unwrap();

        assert_eq!(output(&mut f.session, "lrmdir link").await, "");
        assert!(std::fs::symlink_metadata(f.local.path().join("link")).is_err());
        assert!(target.path().join("keep.txt").exists());
        assert!(f.harness.reporter.errors().is_empty());
    }

    #[tokio::test]
    async fn test_rm_argument_starting_with_hash() {
        let mut f = fixture();
        std::fs::write(f.remote.path().join("#draft#"), b"x").unwrap();

        assert_eq!(output(&mut f.session, "rm #draft#").await, "");
        assert!(!f.remote.path().join("#draft#").exists());
        assert!(f.harness.reporter.errors().is_empty());
    }

    #[tokio::test]
    async fn test_less_sends_content_to_viewer() {
        let mut f = fixture();
        std::fs::write(f.remote.path().join("notes.md"), b"# notes").unwrap();

        output(&mut f.session, "less notes.md").await;
        let shown = f.harness.viewer.shown.lock().unwrap().clone();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].0.ends_with("/notes.md"));
        assert_eq!(shown[0].1, b"# notes");
    }

    #[tokio::test]
    async fn test_ls_groups_under_headers() {
        let mut f = fixture();
        std::fs::create_dir(f.remote.path().join("p")).unwrap();
        std::fs::create_dir(f.remote.path().join("q")).unwrap();
        std::fs::write(f.remote.path().join("p/b.txt"), b"").unwrap();
        std::fs::write(f.remote.path().join("p/a.txt"), b"").unwrap();
        std::fs::write(f.remote.path().join("q/c.txt"), b"").unwrap();

        let out = output(&mut f.session, "ls q p").await;
        assert_eq!(out, "p:\na.txt  b.txt\n\nq:\nc.txt\n\n");
    }

    #[tokio::test]
    async fn test_browse_descends_views_and_ascends() {
        let mut f = fixture();
        std::fs::create_dir(f.remote.path().join("docs")).unwrap();
        std::fs::write(f.remote.path().join("docs/readme"), b"hello").unwrap();
        let start = f.session.remote_wd().to_string();

        f.harness.picker.push_one(Some(FileEntry::dir("docs")));
        f.harness.picker.push_one(Some(FileEntry::file("readme", 5)));
        f.harness.picker.push_one(Some(FileEntry::parent_marker()));
        f.harness.picker.push_one(None);

        assert_eq!(output(&mut f.session, "ll").await, "");
        assert_eq!(f.session.remote_wd(), start);
        assert_eq!(f.harness.viewer.shown.lock().unwrap()[0].1, b"hello");

        let offered = f.harness.picker.offered.lock().unwrap().clone();
        assert_eq!(offered[1], vec!["..", "readme"]);
    }

    #[tokio::test]
    async fn test_browse_propagates_handler_error() {
        let mut f = fixture();
        f.harness.picker.push_one(Some(FileEntry::dir("vanished")));
        let err = f.session.dispatch("lll").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_complete_line_commands() {
        let f = fixture();
        let got = f.session.complete_line("lm").await;
        assert_eq!(got, vec!["lmkdir ", "lmkdirall "]);
        assert_eq!(f.session.complete_line("").await.len(), command::NAMES.len());
    }

    #[tokio::test]
    async fn test_complete_line_cd() {
        let f = fixture();
        std::fs::create_dir(f.remote.path().join("foo")).unwrap();
        std::fs::create_dir(f.remote.path().join("foobar")).unwrap();
        std::fs::write(f.remote.path().join("bar.txt"), b"").unwrap();

        let got = f.session.complete_line("cd foo").await;
        assert_eq!(got, vec!["cd foo/", "cd foobar/"]);

        let got = f.session.complete_line("cd ").await;
        assert_eq!(got, vec!["cd foo/", "cd foobar/"]);

        assert!(f.session.complete_line("cd foo b").await.is_empty());
        assert!(f.session.complete_line("pwd ").await.is_empty());
    }

    #[tokio::test]
    async fn test_complete_line_multi_argument_uses_last_token() {
        let f = fixture();
        std::fs::write(f.local.path().join("alpha"), b"").unwrap();
        std::fs::write(f.local.path().join("beta"), b"").unwrap();

        let got = f.session.complete_line("put alpha b").await;
        assert_eq!(got, vec!["put alpha beta"]);
    }

    #[tokio::test]
    async fn test_complete_line_inside_quoted_directory() {
        let f = fixture();
        std::fs::create_dir_all(f.remote.path().join("my docs/sub")).unwrap();

        let got = f.session.complete_line("cd my").await;
        assert_eq!(got, vec!["cd 'my docs/'"]);

        let got = f.session.complete_line("cd 'my docs/'s").await;
        assert_eq!(got, vec!["cd 'my docs/sub/'"]);

        let got = f.session.complete_line("cd 'my docs/s").await;
        assert_eq!(got, vec!["cd 'my docs/sub/'"]);
    }
}
