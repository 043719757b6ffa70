use notemark_syntax::{Token, TokenKind, lex};

use crate::parsing::diagnostics::{Warning, WarningKind};
use crate::parsing::rope::SourceMap;
use crate::tree::{Node, NodeKind};

use super::{
    cursor::TokenCursor,
    kinds::{CodeSpan, DelimiterRun, LinkSyntax},
};

/// Intermediate inline content before delimiter runs are resolved.
#[derive(Debug)]
enum Piece {
    Node(Node),
    Text(String),
    Delimiter(DelimiterRun),
}

/// Parses a block's inline text into inline nodes.
///
/// `map` translates offsets in `text` back to the source for warnings.
/// Parsing never fails: unmatched delimiters, unclosed code spans and
/// malformed links degrade to literal text, each with a warning.
pub fn parse_inline(text: &str, map: &SourceMap) -> (Vec<Node>, Vec<Warning>) {
    let tokens = lex(text);
    let mut parser = InlineParser {
        text,
        tokens: &tokens,
        map,
        warnings: vec![],
    };
    let nodes = parser.parse_range(0, tokens.len(), 0);
    (nodes, parser.warnings)
}

struct InlineParser<'t, 's> {
    text: &'s str,
    tokens: &'t [Token<'s>],
    map: &'t SourceMap,
    warnings: Vec<Warning>,
}

impl<'t, 's> InlineParser<'t, 's> {
    /// Parses tokens `lo..hi` as an independent run of inline content.
    fn parse_range(&mut self, lo: usize, hi: usize, depth: usize) -> Vec<Node> {
        let tokens = self.tokens;
        let lo_byte = tokens.get(lo).map_or(0, |t| t.span.start);
        let hi_byte = match hi.checked_sub(1).and_then(|k| tokens.get(k)) {
            Some(t) if hi > lo => t.span.end,
            _ => lo_byte,
        };

        let mut pieces = vec![];
        let mut i = lo;
        while i < hi {
            let tok = &tokens[i];
            match tok.kind {
                TokenKind::Escape => {
                    push_text(&mut pieces, &tok.text[1..]);
                    i += 1;
                }
                TokenKind::HardBreak => {
                    pieces.push(Piece::Node(Node::leaf(NodeKind::LineBreak { hard: true })));
                    i += 1;
                }
                TokenKind::Newline => {
                    trim_trailing_whitespace(&mut pieces);
                    pieces.push(Piece::Node(Node::leaf(NodeKind::LineBreak { hard: false })));
                    i += 1;
                }
                TokenKind::Backticks => match self.code_span(i, hi) {
                    Some((node, next)) => {
                        pieces.push(Piece::Node(node));
                        i = next;
                    }
                    None => {
                        self.warn(
                            WarningKind::UnclosedCodeSpan,
                            tok.span.start,
                            format!("unclosed code span `{}`, treated as literal text", tok.text),
                        );
                        push_text(&mut pieces, tok.text);
                        i += 1;
                    }
                },
                TokenKind::Lt => match self.autolink(i, hi) {
                    Some((node, next)) => {
                        pieces.push(Piece::Node(node));
                        i = next;
                    }
                    None => {
                        push_text(&mut pieces, tok.text);
                        i += 1;
                    }
                },
                TokenKind::Bang
                    if i + 1 < hi && tokens[i + 1].kind == TokenKind::LBracket =>
                {
                    match self.link(i, true, hi, depth) {
                        Some((node, next)) => {
                            pieces.push(Piece::Node(node));
                            i = next;
                        }
                        None => {
                            push_text(&mut pieces, tok.text);
                            i += 1;
                        }
                    }
                }
                TokenKind::LBracket => match self.link(i, false, hi, depth) {
                    Some((node, next)) => {
                        pieces.push(Piece::Node(node));
                        i = next;
                    }
                    None => {
                        push_text(&mut pieces, tok.text);
                        i += 1;
                    }
                },
                TokenKind::Stars | TokenKind::Underscores | TokenKind::Tildes
                    if tok.kind != TokenKind::Tildes || tok.len() >= DelimiterRun::STRIKE_LEN =>
                {
                    let prev = self.text[lo_byte..tok.span.start].chars().next_back();
                    let next = self.text[tok.span.end..hi_byte].chars().next();
                    let ch = tok.kind.run_char().unwrap_or(DelimiterRun::STAR);
                    pieces.push(Piece::Delimiter(DelimiterRun::new(
                        ch,
                        tok.len(),
                        prev,
                        next,
                        tok.span.start,
                    )));
                    i += 1;
                }
                _ => {
                    push_text(&mut pieces, tok.text);
                    i += 1;
                }
            }
        }

        self.resolve_delimiters(&mut pieces);
        self.finish(pieces)
    }

    /// Matches each closing run against the nearest compatible opener and
    /// wraps everything between them.
    fn resolve_delimiters(&mut self, pieces: &mut Vec<Piece>) {
        let mut closer = 0;
        while closer < pieces.len() {
            let Piece::Delimiter(close) = &pieces[closer] else {
                closer += 1;
                continue;
            };
            let close = *close;
            if !close.can_close {
                closer += 1;
                continue;
            }
            let opener = (0..closer).rev().find(|&j| {
                matches!(&pieces[j], Piece::Delimiter(open) if open.pairs_with(&close))
            });
            let Some(opener) = opener else {
                closer += 1;
                continue;
            };
            let Piece::Delimiter(open) = &pieces[opener] else {
                closer += 1;
                continue;
            };
            let (used, kind) = open.consume(&close);

            let inner: Vec<Piece> = pieces.drain(opener + 1..closer).collect();
            let children = self.finish(inner);
            pieces.insert(opener + 1, Piece::Node(Node::new(kind, children)));

            let mut next = opener + 2;
            if let Piece::Delimiter(run) = &mut pieces[next] {
                run.remaining -= used;
                if run.remaining == 0 {
                    pieces.remove(next);
                }
            }
            if let Piece::Delimiter(run) = &mut pieces[opener] {
                run.remaining -= used;
                if run.remaining == 0 {
                    pieces.remove(opener);
                    next -= 1;
                }
            }
            closer = next;
        }
    }

    /// Turns pieces into nodes. Leftover runs become literal text, merged
    /// with neighbouring text.
    fn finish(&mut self, pieces: Vec<Piece>) -> Vec<Node> {
        let mut out = vec![];
        let mut pending = String::new();
        for piece in pieces {
            match piece {
                Piece::Text(text) => pending.push_str(&text),
                Piece::Delimiter(run) => {
                    if run.was_delimiter() {
                        self.warn(
                            WarningKind::UnclosedDelimiter,
                            run.offset,
                            format!("unclosed `{}` delimiter, treated as literal text", run.ch),
                        );
                    }
                    pending.extend(std::iter::repeat_n(run.ch, run.remaining));
                }
                Piece::Node(node) => {
                    if !pending.is_empty() {
                        out.push(Node::text(std::mem::take(&mut pending)));
                    }
                    out.push(node);
                }
            }
        }
        if !pending.is_empty() {
            out.push(Node::text(pending));
        }
        out
    }

    fn code_span(&self, i: usize, hi: usize) -> Option<(Node, usize)> {
        let open = &self.tokens[i];
        let cur = TokenCursor::new(self.tokens, i + 1, hi);
        let close = cur.find_run(TokenKind::Backticks, open.len())?;
        let raw = &self.text[open.span.end..self.tokens[close].span.start];
        let node = Node::leaf(NodeKind::InlineCode {
            literal: CodeSpan::literal(raw),
        });
        Some((node, close + 1))
    }

    fn autolink(&self, i: usize, hi: usize) -> Option<(Node, usize)> {
        let mut cur = TokenCursor::new(self.tokens, i + 1, hi);
        while let Some(tok) = cur.bump() {
            match tok.kind {
                TokenKind::Gt => {
                    let url = &self.text[self.tokens[i].span.end..tok.span.start];
                    if !LinkSyntax::is_autolink(url) {
                        return None;
                    }
                    let node = Node::leaf(NodeKind::Autolink {
                        url: url.to_string(),
                    });
                    return Some((node, cur.i));
                }
                TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::HardBreak
                | TokenKind::Lt => {
                    return None;
                }
                _ => {}
            }
        }
        None
    }

    /// Parses `[text](dest "title")` (or the image form when `image`)
    /// starting at token `i`.
    ///
    /// Brackets with no `(` after them stay plain text silently; a `(` that
    /// does not lead to a well-formed destination and closing paren is a
    /// malformed link and is reported.
    fn link(&mut self, i: usize, image: bool, hi: usize, depth: usize) -> Option<(Node, usize)> {
        if depth >= LinkSyntax::MAX_NESTING {
            return None;
        }
        let open = if image { i + 1 } else { i };
        let close = self.matching_bracket(open, hi)?;
        let mut cur = TokenCursor::new(self.tokens, close + 1, hi);
        if !cur.at(TokenKind::LParen) {
            return None;
        }
        cur.bump();

        let Some((destination, title)) = destination_and_title(&mut cur) else {
            let offset = self.tokens[i].span.start;
            self.warn(
                WarningKind::MalformedLink,
                offset,
                "link destination is malformed, treated as literal text",
            );
            return None;
        };

        let children = self.parse_range(open + 1, close, depth + 1);
        let node = if image {
            Node::leaf(NodeKind::Image {
                destination,
                alt: children.iter().map(Node::plain_text).collect(),
                title,
            })
        } else {
            Node::new(NodeKind::Link { destination, title }, children)
        };
        Some((node, cur.i))
    }

    /// Index of the `]` closing the `[` at `open`, skipping code spans.
    fn matching_bracket(&self, open: usize, hi: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut cur = TokenCursor::new(self.tokens, open + 1, hi);
        while let Some(tok) = cur.bump() {
            match tok.kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket if depth == 0 => return Some(cur.i - 1),
                TokenKind::RBracket => depth -= 1,
                TokenKind::Backticks => {
                    if let Some(end) = cur.find_run(TokenKind::Backticks, tok.len()) {
                        cur.i = end + 1;
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn warn(&mut self, kind: WarningKind, local: usize, message: impl Into<String>) {
        self.warnings
            .push(Warning::at(kind, self.map.absolute(local), message));
    }
}

/// Reads `dest "title")` after the opening paren, leaving the cursor past
/// the closing paren.
fn destination_and_title(cur: &mut TokenCursor<'_, '_>) -> Option<(String, Option<String>)> {
    cur.skip_whitespace();
    let mut destination = String::new();
    if cur.at(TokenKind::Lt) {
        cur.bump();
        loop {
            let tok = cur.bump()?;
            match tok.kind {
                TokenKind::Gt => break,
                TokenKind::Lt | TokenKind::Newline | TokenKind::HardBreak => return None,
                TokenKind::Escape => destination.push_str(&tok.text[1..]),
                _ => destination.push_str(tok.text),
            }
        }
    } else {
        let mut parens = 0usize;
        while let Some(tok) = cur.peek() {
            match tok.kind {
                TokenKind::Whitespace | TokenKind::Newline | TokenKind::HardBreak => break,
                TokenKind::RParen if parens == 0 => break,
                TokenKind::RParen => parens -= 1,
                TokenKind::LParen => parens += 1,
                _ => {}
            }
            match tok.kind {
                TokenKind::Escape => destination.push_str(&tok.text[1..]),
                _ => destination.push_str(tok.text),
            }
            cur.bump();
        }
    }

    let before_title = cur.i;
    cur.skip_whitespace();
    let mut title = None;
    let quote = cur.peek_kind();
    if matches!(quote, Some(TokenKind::DoubleQuote | TokenKind::SingleQuote))
        && (cur.i > before_title || destination.is_empty())
    {
        cur.bump();
        let mut text = String::new();
        loop {
            let tok = cur.bump()?;
            if Some(tok.kind) == quote {
                break;
            }
            match tok.kind {
                TokenKind::Escape => text.push_str(&tok.text[1..]),
                _ => text.push_str(tok.text),
            }
        }
        title = Some(text);
        cur.skip_whitespace();
    }

    if cur.at(TokenKind::RParen) {
        cur.bump();
        Some((destination, title))
    } else {
        None
    }
}

fn push_text(pieces: &mut Vec<Piece>, text: &str) {
    if let Some(Piece::Text(last)) = pieces.last_mut() {
        last.push_str(text);
    } else {
        pieces.push(Piece::Text(text.to_string()));
    }
}

/// Spaces at the end of a line before a soft break are not content.
fn trim_trailing_whitespace(pieces: &mut Vec<Piece>) {
    if let Some(Piece::Text(last)) = pieces.last_mut() {
        last.truncate(last.trim_end_matches([' ', '\t']).len());
        if last.is_empty() {
            pieces.pop();
        }
    }
}
