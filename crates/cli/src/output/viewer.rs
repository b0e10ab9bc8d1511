//! File viewer for `less` and the browser

use std::io::Write;
use std::process::{Command, Stdio};

use rsftp_core::{Error, Result, Viewer};

/// How much of a file is sniffed for NUL bytes
const SNIFF_LEN: usize = 8000;

const DEFAULT_PAGER: &str = "less";

/// Whether `content` looks like binary data
pub fn is_binary(content: &[u8]) -> bool {
    content.iter().take(SNIFF_LEN).any(|&b| b == 0)
}

/// Writes file content to stdout or through `$PAGER`
#[derive(Debug, Clone, Default)]
pub struct ConsoleViewer {
    pager: Option<String>,
}

impl ConsoleViewer {
    pub fn new() -> Self {
        Self {
            pager: std::env::var("PAGER").ok().filter(|p| !p.trim().is_empty()),
        }
    }

    fn page(&self, content: &[u8]) -> Result<()> {
        let command = self.pager.as_deref().unwrap_or(DEFAULT_PAGER);
        let words = shlex::split(command)
            .filter(|w| !w.is_empty())
            .ok_or_else(|| Error::General(format!("invalid PAGER: {command}")))?;
        let (program, args) = words
            .split_first()
            .ok_or_else(|| Error::General(format!("invalid PAGER: {command}")))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| Error::General(format!("{program}: {e}")))?;
        if let Some(mut stdin) = child.stdin.take() {
            // the pager may quit before reading everything
            if let Err(e) = stdin.write_all(content) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(Error::Io(e));
                }
            }
        }
        child.wait()?;
        Ok(())
    }
}

impl Viewer for ConsoleViewer {
    fn show(&self, name: &str, content: &[u8], pager: bool) -> Result<()> {
        if is_binary(content) {
            return Err(Error::General(format!("{name}: binary file not shown")));
        }
        if pager {
            return self.page(content);
        }

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content)?;
        if !content.is_empty() && !content.ends_with(b"\n") {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_binary() {
        assert!(!is_binary(b"hello\nworld\n"));
        assert!(is_binary(b"\x7fELF\x00\x01"));
        assert!(!is_binary(b""));
    }

    #[test]
    fn test_nul_past_sniff_window_is_text() {
        let mut content = vec![b'a'; SNIFF_LEN];
        content.push(0);
        assert!(!is_binary(&content));
    }

    #[test]
    fn test_binary_refused() {
        let viewer = ConsoleViewer::default();
        let err = viewer.show("a.bin", b"\x00\x01", false).unwrap_err();
        assert_eq!(err.to_string(), "a.bin: binary file not shown");
    }

    #[test]
    fn test_pager_receives_content() {
        let viewer = ConsoleViewer {
            pager: Some("cat".to_string()),
        };
        viewer.show("notes.txt", b"line\n", true).unwrap();
    }
}
