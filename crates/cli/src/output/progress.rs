//! Connection spinner

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::OutputConfig;

/// Spinner shown while a connection is being set up
///
/// Suppressed in quiet and JSON mode, and when stderr is not a terminal.
#[derive(Debug)]
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(config: &OutputConfig, message: &str) -> Self {
        let visible = !config.quiet && !config.json && console::Term::stderr().is_term();
        Self::with_visibility(visible, message)
    }

    fn with_visibility(visible: bool, message: &str) -> Self {
        if !visible {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.finish_and_clear();
    }
}
