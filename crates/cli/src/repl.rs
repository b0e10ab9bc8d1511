//! Read-eval-print loop
//!
//! Runs on a blocking thread: rustyline owns the terminal while a line is
//! read, and each line is dispatched by blocking on the runtime handle.
//! Completion does the same from inside the line editor.

use std::path::PathBuf;
use std::sync::Arc;

use console::Term;
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::runtime::Handle;
use tracing::debug;

use rsftp_core::{Error, LineCompleter, Outcome, Reporter, Result, Session};

/// Line editor helper completing against the session's backends
pub struct ShellHelper {
    completer: LineCompleter,
    handle: Handle,
}

impl ShellHelper {
    pub fn new(completer: LineCompleter, handle: Handle) -> Self {
        Self { completer, handle }
    }
}

impl Completer for ShellHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let candidates = self
            .handle
            .block_on(self.completer.complete_line(&line[..pos]));
        // candidates are whole lines, so they replace everything before the cursor
        Ok((0, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

/// Prompt shown before each line
pub fn prompt(remote_wd: &str) -> String {
    format!("[{remote_wd}] > ")
}

/// Text to print for a command result, or nothing for an empty result
pub fn format_output(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    if text.ends_with('\n') {
        Some(text.to_string())
    } else {
        Some(format!("{text}\n"))
    }
}

/// The interactive shell loop
pub struct Repl {
    session: Session,
    handle: Handle,
    reporter: Arc<dyn Reporter>,
    history: Option<PathBuf>,
}

impl Repl {
    pub fn new(
        session: Session,
        handle: Handle,
        reporter: Arc<dyn Reporter>,
        history: Option<PathBuf>,
    ) -> Self {
        Self {
            session,
            handle,
            reporter,
            history,
        }
    }

    /// Read and dispatch lines until `exit`, end of input or an interrupt
    ///
    /// Must be called off the async runtime, e.g. from `spawn_blocking`.
    pub fn run(mut self) -> Result<()> {
        let mut editor: Editor<ShellHelper, DefaultHistory> =
            Editor::new().map_err(readline_error)?;
        editor.set_helper(Some(ShellHelper::new(
            self.session.completer(),
            self.handle.clone(),
        )));

        if let Some(path) = &self.history {
            if let Err(e) = editor.load_history(path) {
                debug!(path = %path.display(), error = %e, "no history loaded");
            }
        }

        loop {
            let line = match editor.readline(&prompt(self.session.remote_wd())) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => return Err(readline_error(e)),
            };
            if !line.trim().is_empty() {
                if let Err(e) = editor.add_history_entry(line.as_str()) {
                    debug!(error = %e, "history entry not added");
                }
            }

            self.session
                .set_width(Term::stdout().size_checked().map(|(_, w)| usize::from(w)));
            match self.handle.block_on(self.session.dispatch(&line)) {
                Ok(Outcome::Exit) => break,
                Ok(Outcome::Output(text)) => {
                    if let Some(out) = format_output(&text) {
                        print!("{out}");
                    }
                }
                Err(e) => self.reporter.error(&e.to_string()),
            }

            if let Some(helper) = editor.helper_mut() {
                helper.completer = self.session.completer();
            }
        }

        if let Some(path) = &self.history {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            editor.save_history(path).map_err(readline_error)?;
        }
        Ok(())
    }
}

fn readline_error(err: ReadlineError) -> Error {
    match err {
        ReadlineError::Io(e) => Error::Io(e),
        other => Error::General(format!("line editor: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt() {
        assert_eq!(prompt("/home/alice"), "[/home/alice] > ");
    }

    #[test]
    fn test_format_output() {
        assert_eq!(format_output(""), None);
        assert_eq!(format_output("/srv"), Some("/srv\n".to_string()));
        assert_eq!(format_output("a  b\n\n"), Some("a  b\n\n".to_string()));
    }
}
