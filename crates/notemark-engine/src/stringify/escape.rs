//! Backslash escaping so that literal text reparses as the same text.

use crate::parsing::blocks::kinds::{BlockQuote, Heading, ListMarker, Table};

/// Characters that start an inline construct anywhere in a line.
const INLINE_SPECIAL: [char; 9] = ['\\', '`', '*', '_', '[', ']', '<', '~', '|'];

/// Escapes inline-special characters in literal text.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if INLINE_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes a character at the start of a paragraph line that would
/// otherwise open a block: `#`, `>`, `-`, `+` or an ordinal's delimiter.
/// A line that reads as a table delimiter row under the previous line is
/// escaped too.
pub fn protect_line_start(line: &str) -> String {
    let Some(first) = line.chars().next() else {
        return String::new();
    };
    if first.is_ascii_punctuation() && Table::delimiter_row(line.trim()).is_some() {
        return format!("\\{line}");
    }
    if first == Heading::MARKER {
        let rest = line.trim_start_matches(Heading::MARKER);
        if rest.is_empty() || rest.starts_with([' ', '\t']) {
            return format!("\\{line}");
        }
    }
    if first == BlockQuote::PREFIX || first == '-' || first == '+' {
        return format!("\\{line}");
    }
    if first.is_ascii_digit() {
        let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        let rest = &line[digits..];
        if let Some(delim) = rest.chars().next()
            && ListMarker::DELIMITERS.contains(&delim)
        {
            let after = &rest[1..];
            if after.is_empty() || after.starts_with([' ', '\t']) {
                return format!("{}\\{rest}", &line[..digits]);
            }
        }
    }
    line.to_string()
}

/// Escapes a trailing `#` run that would be read as a closing sequence.
pub fn protect_heading_end(content: &str) -> String {
    let stripped = Heading::strip_closing(content);
    if stripped.len() == content.len() {
        return content.to_string();
    }
    let run_start = content.trim_end_matches(Heading::MARKER).len();
    format!("{}\\{}", &content[..run_start], &content[run_start..])
}
