//! Command line tokenizer
//!
//! Splits a line into words with POSIX-style quoting: single quotes are
//! literal, double quotes allow `\` before `"`, `\`, `$` and `` ` ``, and a
//! bare backslash escapes the next character. `#` has no special meaning, so
//! `rm #draft#` removes a file called `#draft#`.

use crate::error::{Error, Result};

/// One word of a line, after quote removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Byte offset where the word starts in the input, quotes included
    pub start: usize,
    /// Word text with quoting removed
    pub text: String,
}

/// Outcome of scanning a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    pub words: Vec<Word>,
    /// A quote or trailing backslash was left open
    pub unterminated: bool,
    /// The line ends outside any word, so the next word has not started
    pub trailing_space: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Between,
    Bare,
    Single,
    Double,
}

/// Scan `line` without failing on open quotes
///
/// Used for completion, where the operator is usually in the middle of a word.
pub fn scan(line: &str) -> Scan {
    let mut words = Vec::new();
    let mut current: Option<Word> = None;
    let mut state = State::Between;
    let mut chars = line.char_indices().peekable();
    let mut unterminated = false;

    while let Some((pos, c)) = chars.next() {
        match state {
            State::Between if c.is_whitespace() => continue,
            State::Between | State::Bare => {
                if state == State::Between {
                    current = Some(Word {
                        start: pos,
                        text: String::new(),
                    });
                    state = State::Bare;
                }
                match c {
                    c if c.is_whitespace() => {
                        words.extend(current.take());
                        state = State::Between;
                    }
                    '\'' => state = State::Single,
                    '"' => state = State::Double,
                    '\\' => match chars.next() {
                        Some((_, next)) => push(&mut current, next),
                        None => unterminated = true,
                    },
                    c => push(&mut current, c),
                }
            }
            State::Single => match c {
                '\'' => state = State::Bare,
                c => push(&mut current, c),
            },
            State::Double => match c {
                '"' => state = State::Bare,
                '\\' => match chars.peek() {
                    Some(&(_, next @ ('"' | '\\' | '$' | '`'))) => {
                        chars.next();
                        push(&mut current, next);
                    }
                    Some(_) => push(&mut current, '\\'),
                    None => unterminated = true,
                },
                c => push(&mut current, c),
            },
        }
    }

    if matches!(state, State::Single | State::Double) {
        unterminated = true;
    }
    let trailing_space = state == State::Between;
    words.extend(current);
    Scan {
        words,
        unterminated,
        trailing_space,
    }
}

fn push(word: &mut Option<Word>, c: char) {
    if let Some(word) = word.as_mut() {
        word.text.push(c);
    }
}

/// Split a complete line into words
///
/// An open quote or a trailing backslash is a parse error.
pub fn split(line: &str) -> Result<Vec<String>> {
    let scan = scan(line);
    if scan.unterminated {
        return Err(Error::Parse("incomplete quoting".to_string()));
    }
    Ok(scan.words.into_iter().map(|w| w.text).collect())
}
