//! Console picker
//!
//! Shows directory entries as a numbered table and reads the operator's
//! choice from the terminal. Used for `get`/`put` without arguments and for
//! the `ll`/`lll` browser.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use console::{style, Term};
use jiff::tz::TimeZone;

use rsftp_core::{Error, FileEntry, Picker, Result, Side};

/// Picker that talks to the operator on stderr
#[derive(Debug, Clone)]
pub struct ConsolePicker {
    term: Term,
    color: bool,
}

impl ConsolePicker {
    pub fn new(color: bool) -> Self {
        Self {
            term: Term::stderr(),
            color,
        }
    }

    fn heading(&self, text: &str) -> Result<()> {
        let line = if self.color {
            style(text).bold().to_string()
        } else {
            text.to_string()
        };
        self.term.write_line(&line)?;
        Ok(())
    }

    /// Ask until the input parses; an empty answer returns an empty selection
    fn ask(&self, prompt: &str, count: usize, single: bool) -> Result<Vec<usize>> {
        loop {
            self.term.write_str(prompt)?;
            let input = self.term.read_line()?;
            match parse_selection(&input, count) {
                Ok(picked) if single && picked.len() > 1 => {
                    self.term.write_line("pick a single entry")?;
                }
                Ok(picked) => return Ok(picked),
                Err(e) => self.term.write_line(&e.to_string())?,
            }
        }
    }
}

impl Picker for ConsolePicker {
    fn pick_many(&self, wd: &str, entries: &[FileEntry]) -> Result<Vec<String>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        self.heading(wd)?;
        self.term.write_line(&entry_table(entries).to_string())?;

        let picked = self.ask(
            "select entries (e.g. 1 3 5-7, empty to cancel): ",
            entries.len(),
            false,
        )?;
        Ok(picked.into_iter().map(|i| entries[i].name.clone()).collect())
    }

    fn pick_one(&self, wd: &str, entries: &[FileEntry], side: Side) -> Result<Option<FileEntry>> {
        self.heading(&format!("{} {wd}", side.label()))?;
        if entries.is_empty() {
            self.term.write_line("(empty)")?;
            return Ok(None);
        }
        self.term.write_line(&entry_table(entries).to_string())?;

        let picked = self.ask("select entry (empty to leave): ", entries.len(), true)?;
        Ok(picked.first().map(|&i| entries[i].clone()))
    }
}

/// Numbered table of entries: name, size, modification time, permissions
pub fn entry_table(entries: &[FileEntry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Name", "Size", "Modified", "Mode"]);

    let tz = TimeZone::system();
    for (i, entry) in entries.iter().enumerate() {
        let name = if entry.is_dir() && entry.name != ".." {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        let size = if entry.is_dir() {
            String::new()
        } else {
            entry.size_human()
        };
        let modified = entry
            .modified
            .map(|ts| ts.to_zoned(tz.clone()).strftime("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let mode = if entry.name == ".." {
            String::new()
        } else {
            entry.mode_string()
        };

        table.add_row(vec![
            Cell::new(i + 1).set_alignment(CellAlignment::Right),
            Cell::new(name),
            Cell::new(size).set_alignment(CellAlignment::Right),
            Cell::new(modified),
            Cell::new(mode),
        ]);
    }
    table
}

/// Parse `1 3 5-7` style input into zero-based indices below `count`
///
/// Duplicates are dropped; order of first appearance is kept.
pub fn parse_selection(input: &str, count: usize) -> Result<Vec<usize>> {
    let mut picked = Vec::new();
    for token in input.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        let (start, end) = match token.split_once('-') {
            Some((a, b)) => (parse_index(a, count)?, parse_index(b, count)?),
            None => {
                let i = parse_index(token, count)?;
                (i, i)
            }
        };
        if start > end {
            return Err(Error::Usage(format!("invalid range: {token}")));
        }
        for i in start..=end {
            if !picked.contains(&i) {
                picked.push(i);
            }
        }
    }
    Ok(picked)
}

fn parse_index(token: &str, count: usize) -> Result<usize> {
    match token.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(Error::Usage(format!(
            "invalid selection: {token} (choose 1-{count})"
        ))),
    }
}
