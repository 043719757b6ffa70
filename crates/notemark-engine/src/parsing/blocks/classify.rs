use notemark_syntax::lex;

use super::kinds::{
    BlockQuote, CodeFence, FenceOpen, Heading, HeadingOpen, ListMarker, ThematicBreak,
};

/// Columns per tab stop when expanding leading indentation.
const TAB_STOP: usize = 4;

/// Indentation that turns a line into indented code.
pub const CODE_INDENT: usize = 4;

/// One line of block content with container prefixes already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Byte offset of `text` in the source.
    pub offset: usize,
    /// Line text without its line ending; leading tabs expanded to spaces.
    pub text: String,
}

impl Line {
    pub fn new(offset: usize, raw: &str) -> Self {
        Self {
            offset,
            text: expand_leading_tabs(raw),
        }
    }

    pub fn blank(offset: usize) -> Self {
        Self {
            offset,
            text: String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Leading spaces (tabs are already expanded).
    pub fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start_matches(' ').len()
    }

    /// Removes up to `n` columns of leading indentation.
    pub fn strip_columns(&self, n: usize) -> Line {
        let k = n.min(self.indent());
        Line {
            offset: self.offset + k,
            text: self.text[k..].to_string(),
        }
    }

    pub fn trim_start(&self) -> Line {
        let trimmed = self.text.trim_start();
        Line {
            offset: self.offset + (self.text.len() - trimmed.len()),
            text: trimmed.to_string(),
        }
    }
}

fn expand_leading_tabs(raw: &str) -> String {
    if !raw.starts_with([' ', '\t']) || !raw.contains('\t') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len() + TAB_STOP);
    let mut rest = raw;
    while let Some(c) = rest.chars().next() {
        match c {
            ' ' => out.push(' '),
            '\t' => {
                let pad = TAB_STOP - out.len() % TAB_STOP;
                out.extend(std::iter::repeat_n(' ', pad));
            }
            _ => break,
        }
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

/// A block that a line can open, in precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockStart {
    ThematicBreak,
    Heading(HeadingOpen),
    Fence(FenceOpen),
    /// Content of the line after the `>` prefix.
    BlockQuote(Line),
    ListItem(ListMarker),
    IndentedCode,
}

impl BlockStart {
    /// Whether this start may interrupt an open paragraph.
    ///
    /// Empty list items and ordered lists not starting at 1 cannot, so that
    /// wrapped prose like "in 2024. we ..." stays one paragraph.
    pub fn interrupts_paragraph(&self) -> bool {
        match self {
            BlockStart::IndentedCode => false,
            BlockStart::ListItem(marker) => marker.can_interrupt_paragraph(),
            _ => true,
        }
    }
}

/// Classification of a single line containing only local facts.
///
/// This is phase 1 of block parsing: each line is classified independently
/// without reference to surrounding context.
#[derive(Debug, Clone)]
pub struct LineClass {
    pub indent: usize,
    pub is_blank: bool,
    pub start: Option<BlockStart>,
}

/// Classifies individual lines for the block parsing phase.
pub struct MarkdownLineClassifier;

impl MarkdownLineClassifier {
    /// Classifies a line, trying block openers in precedence order:
    /// thematic break > heading > fence > block quote > list marker.
    pub fn classify(&self, line: &Line) -> LineClass {
        let indent = line.indent();
        if line.is_blank() {
            return LineClass {
                indent,
                is_blank: true,
                start: None,
            };
        }
        if indent >= CODE_INDENT {
            return LineClass {
                indent,
                is_blank: false,
                start: Some(BlockStart::IndentedCode),
            };
        }

        let rest = &line.text[indent..];
        let base = line.offset + indent;
        let tokens = lex(rest);

        let start = if ThematicBreak::matches(&tokens) {
            Some(BlockStart::ThematicBreak)
        } else if let Some(open) = Heading::open(&tokens, rest, base) {
            Some(BlockStart::Heading(open))
        } else if let Some(open) = CodeFence::open(&tokens, rest, indent) {
            Some(BlockStart::Fence(open))
        } else if let Some(content) = BlockQuote::open(rest, base) {
            Some(BlockStart::BlockQuote(content))
        } else {
            ListMarker::open(&tokens, rest, indent, base).map(BlockStart::ListItem)
        };

        LineClass {
            indent,
            is_blank: false,
            start,
        }
    }
}
