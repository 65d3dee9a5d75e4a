use regex::{Regex, RegexBuilder};
use std::fmt;

use crate::error::{ManifestError, Result};

/// A filename glob compiled to an anchored regex.
///
/// Supports `*`, `?`, `[abc]`, `[a-z]` and `[!abc]`. A pattern always matches a
/// single path component, so separators are rejected.
#[derive(Debug, Clone)]
pub struct FilePattern {
    glob: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(glob: &str, ignore_case: bool) -> Result<Self> {
        let invalid = |reason: String| ManifestError::InvalidPattern {
            pattern: glob.to_string(),
            reason,
        };

        if glob.is_empty() {
            return Err(invalid("pattern is empty".into()));
        }
        if glob.contains('/') || glob.contains(std::path::MAIN_SEPARATOR) {
            return Err(invalid("pattern must not contain a path separator".into()));
        }

        let regex = RegexBuilder::new(&glob_to_regex(glob))
            .case_insensitive(ignore_case)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            glob: glob.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.glob)
    }
}

fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i + 1..end]));
                    i = end;
                }
                None => out.push_str(r"\["),
            },
            c => out.push_str(&escape_char(c)),
        }
        i += 1;
    }

    out.push('$');
    out
}

/// Index of the `]` closing the class opened at `start`. A `]` right after
/// `[` or `[!` is a literal member of the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if chars.get(i) == Some(&'!') {
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        i += 1;
    }

    let from = i.min(chars.len());
    chars[from..]
        .iter()
        .position(|&c| c == ']')
        .map(|pos| pos + from)
}

fn translate_class(body: &[char]) -> String {
    let (negated, body) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut out = String::from(if negated { "[^" } else { "[" });
    for &c in body {
        match c {
            '-' => out.push('-'),
            c => out.push_str(&escape_char(c)),
        }
    }
    out.push(']');
    out
}

fn escape_char(c: char) -> String {
    regex::escape(c.encode_utf8(&mut [0; 4]))
}
