use std::sync::OnceLock;

use notemark_syntax::{TokenKind, lex};
use regex::Regex;

use crate::parsing::blocks::classify::Line;
use crate::parsing::inline::cursor::TokenCursor;
use crate::tree::Alignment;

fn delimiter_regex() -> &'static Regex {
    static DELIMITER_ROW: OnceLock<Regex> = OnceLock::new();
    DELIMITER_ROW.get_or_init(|| {
        Regex::new(r"^\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?\s*$")
            .expect("Invalid delimiter row regex")
    })
}

/// Pipe table rows and the delimiter row that follows the header.
pub struct Table;

impl Table {
    pub const PIPE: char = '|';

    /// Parses a delimiter row such as `|:--|:-:|--:|` into column alignments.
    pub fn delimiter_row(text: &str) -> Option<Vec<Alignment>> {
        if !delimiter_regex().is_match(text) {
            return None;
        }
        let alignments = Self::split_cells(text)
            .into_iter()
            .map(|(_, cell)| {
                let cell = cell.trim();
                match (cell.starts_with(':'), cell.ends_with(':')) {
                    (true, true) => Alignment::Center,
                    (true, false) => Alignment::Left,
                    (false, true) => Alignment::Right,
                    (false, false) => Alignment::None,
                }
            })
            .collect();
        Some(alignments)
    }

    /// Splits a row into trimmed cells, dropping the optional outer pipes.
    pub fn split_row(line: &Line) -> Vec<Line> {
        Self::split_cells(&line.text)
            .into_iter()
            .map(|(start, cell)| Line {
                offset: line.offset + start,
                text: cell.to_string(),
            }
            .trim_start())
            .map(|mut cell| {
                cell.text.truncate(cell.text.trim_end().len());
                cell
            })
            .collect()
    }

    /// Whether a header line and the line after it open a table.
    pub fn open(header: &Line, delimiter: &Line) -> Option<Vec<Alignment>> {
        let alignments = Self::delimiter_row(delimiter.text.trim())?;
        if Self::cell_pipes(&header.text).is_empty() && !delimiter.text.contains(Self::PIPE) {
            return None;
        }
        (Self::split_row(header).len() == alignments.len()).then_some(alignments)
    }

    /// Percent-encodes the pipes in raw text (an autolink) that would
    /// otherwise end a cell. Escaped pipes already stay in the cell.
    pub fn encode_pipes(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut backslashes = 0;
        for c in text.chars() {
            if c == Self::PIPE && backslashes % 2 == 0 {
                out.push_str("%7C");
            } else {
                out.push(c);
            }
            backslashes = if c == '\\' { backslashes + 1 } else { 0 };
        }
        out
    }

    /// Byte offsets of the pipes that separate cells. Escaped pipes and
    /// pipes inside a closed code span are cell content.
    fn cell_pipes(text: &str) -> Vec<usize> {
        let tokens = lex(text);
        let mut pipes = vec![];
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            match token.kind {
                TokenKind::Pipe => pipes.push(token.span.start),
                TokenKind::Backticks => {
                    let cursor = TokenCursor::new(&tokens, i + 1, tokens.len());
                    if let Some(close) = cursor.find_run(TokenKind::Backticks, token.len()) {
                        i = close;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        pipes
    }

    /// Byte ranges of cells, split on the pipes `cell_pipes` finds.
    fn split_cells(text: &str) -> Vec<(usize, &str)> {
        let mut cells = vec![];
        let mut start = 0;
        for pipe in Self::cell_pipes(text) {
            cells.push((start, &text[start..pipe]));
            start = pipe + 1;
        }
        cells.push((start, &text[start..]));

        if cells.len() > 1 && cells[0].1.trim().is_empty() {
            cells.remove(0);
        }
        if cells.len() > 1 && cells.last().is_some_and(|(_, c)| c.trim().is_empty()) {
            cells.pop();
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cells(text: &str) -> Vec<String> {
        Table::split_row(&Line::new(0, text))
            .into_iter()
            .map(|c| c.text)
            .collect()
    }

    #[test]
    fn splits_with_outer_pipes() {
        assert_eq!(cells("| a | b |"), vec!["a", "b"]);
    }

    #[test]
    fn splits_without_outer_pipes() {
        assert_eq!(cells("a | b"), vec!["a", "b"]);
    }

    #[test]
    fn escaped_pipe_stays_in_cell() {
        assert_eq!(cells("| a \\| b | c |"), vec!["a \\| b", "c"]);
    }

    #[test]
    fn pipe_inside_code_span_stays_in_cell() {
        assert_eq!(cells("| `a|b` | c |"), vec!["`a|b`", "c"]);
    }

    #[test]
    fn unclosed_backticks_do_not_hide_pipes() {
        assert_eq!(cells("| a`b | c`` | d |"), vec!["a`b", "c``", "d"]);
    }

    #[test]
    fn escaped_backslash_before_pipe_still_splits() {
        assert_eq!(cells("a\\\\| b"), vec!["a\\\\", "b"]);
    }

    #[test]
    fn cell_offsets_point_at_content() {
        let row = Table::split_row(&Line::new(10, "| ab |"));
        assert_eq!(row[0].offset, 12);
    }

    #[test]
    fn delimiter_alignments() {
        assert_eq!(
            Table::delimiter_row("| --- | :-- | :-: | --: |"),
            Some(vec![
                Alignment::None,
                Alignment::Left,
                Alignment::Center,
                Alignment::Right
            ])
        );
    }

    #[test]
    fn not_a_delimiter_row() {
        assert_eq!(Table::delimiter_row("| a | b |"), None);
    }

    #[test]
    fn open_requires_matching_cell_count() {
        let header = Line::new(0, "| a | b |");
        assert!(Table::open(&header, &Line::new(10, "|---|---|")).is_some());
        assert!(Table::open(&header, &Line::new(10, "|---|")).is_none());
    }

    #[test]
    fn open_requires_a_pipe() {
        assert!(Table::open(&Line::new(0, "a"), &Line::new(2, "---")).is_none());
    }

    #[test]
    fn open_ignores_escaped_and_code_pipes() {
        assert!(Table::open(&Line::new(0, "a \\| b"), &Line::new(7, ":--")).is_none());
        assert!(Table::open(&Line::new(0, "`a|b`"), &Line::new(6, "---")).is_none());
        assert!(Table::open(&Line::new(0, "a | b"), &Line::new(6, ":-- | --")).is_some());
    }

    #[test]
    fn encode_pipes_keeps_escaped_ones() {
        assert_eq!(Table::encode_pipes("a|b\\|c\\\\|d"), "a%7Cb\\|c\\\\%7Cd");
    }
}
