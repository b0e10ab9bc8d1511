//! Console reporter for batch commands

use console::Style;

use rsftp_core::Reporter;

/// Prints `-> message` for progress and `===> message` for failures on stderr
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    info_style: Style,
    error_style: Style,
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(color: bool, quiet: bool) -> Self {
        Self {
            info_style: Style::new().blue().force_styling(color),
            error_style: Style::new().red().force_styling(color),
            quiet,
        }
    }

    /// Line printed for an info message
    pub fn format_info(&self, message: &str) -> String {
        self.info_style.apply_to(format!("-> {message}")).to_string()
    }

    /// Line printed for an error message
    pub fn format_error(&self, message: &str) -> String {
        self.error_style.apply_to(format!("===> {message}")).to_string()
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", self.format_info(message));
        }
    }

    fn error(&self, message: &str) {
        eprintln!("{}", self.format_error(message));
    }
}
