//! Output formatting utilities
//!
//! Formatters for one-shot commands, the spinner shown while connecting,
//! and the console side of the shell's reporter and viewer.

mod formatter;
mod progress;
mod reporter;
mod viewer;

pub use formatter::Formatter;
pub use progress::Spinner;
pub use reporter::ConsoleReporter;
pub use viewer::{is_binary, ConsoleViewer};

use rsftp_core::ColorMode;

/// Output configuration derived from CLI flags
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Whether to color output under the configured mode; `--no-color` and `--json` always win
    pub fn use_color(&self, mode: ColorMode) -> bool {
        if self.no_color || self.json {
            return false;
        }
        match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => console::colors_enabled(),
        }
    }
}
