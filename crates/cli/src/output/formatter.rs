//! Output for one-shot subcommands
//!
//! `host` and the setup phase of `connect` print through here. In JSON mode
//! results go to stdout as JSON and errors to stderr as `{"error": ...}`.

use console::{style, StyledObject};
use serde::Serialize;

use super::OutputConfig;

#[derive(Debug, Clone, Default)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    fn mark<'a>(&self, mark: StyledObject<&'a str>) -> StyledObject<&'a str> {
        mark.force_styling(self.colors_enabled())
    }

    /// Confirmation after a change; silent in quiet and JSON mode
    pub fn success(&self, message: &str) {
        if !self.config.quiet && !self.config.json {
            println!("{} {message}", self.mark(style("✓").green()));
        }
    }

    /// Errors are printed in every mode
    pub fn error(&self, message: &str) {
        if self.config.json {
            eprintln!("{}", serde_json::json!({ "error": message }));
        } else {
            eprintln!("{} {message}", self.mark(style("✗").red()));
        }
    }

    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => self.error(&format!("cannot serialize output: {e}")),
        }
    }

    /// Plain line of human output; silent in quiet mode
    pub fn println(&self, message: &str) {
        if !self.config.quiet {
            println!("{message}");
        }
    }
}
