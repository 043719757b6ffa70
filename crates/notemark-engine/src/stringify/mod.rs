//! # Stringify
//!
//! Serializes a node tree, or any sub-list of nodes, back into canonical
//! markdown. Output is not byte-identical to the text that was parsed; it
//! is chosen so that parsing it again yields the same tree:
//!
//! - `#` headings, `---` breaks, backtick fences (tildes when the info
//!   string holds a backtick)
//! - `-` bullets and `.` ordinals, switching to `*` and `)` when a list
//!   directly follows another list of the same kind
//! - `*`/`**`/`~~` delimiters. Nested spans alternate with `_`/`__`, and a
//!   span whose preferred marker would not reparse as written (it merges
//!   with a neighbouring run or fails the flanking rules) takes the other
//! - backslash escapes for literal characters that would open a construct
//!
//! Blocks are separated by a blank line; list items by a single newline.
//! Runs of inline nodes in a sub-list are written as one paragraph-like run.

pub mod escape;

use crate::parsing::blocks::kinds::{CodeFence, ListMarker, Table, ThematicBreak};
use crate::parsing::inline::kinds::{CodeSpan, DelimiterRun, LinkSyntax};
use crate::tree::{Alignment, Node, NodeKind};
use escape::{escape_text, protect_heading_end, protect_line_start};

const BLOCK_SEPARATOR: &str = "\n\n";

/// Emphasis nesting beyond which a span keeps its preferred marker without
/// trying the other one.
const MARKER_SEARCH_DEPTH: usize = 8;

/// Serializes nodes to markdown. Document nodes contribute their children.
pub fn stringify(nodes: &[Node]) -> String {
    let mut flat = vec![];
    for node in nodes {
        if node.kind == NodeKind::Document {
            flat.extend(node.children.iter());
        } else {
            flat.push(node);
        }
    }
    Writer.blocks(&flat, None)
}

/// Where inline content is written. Line breaks only survive in paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineContext {
    Paragraph,
    SingleLine,
    /// A table cell: single line, and raw text may not hold a bare pipe.
    Cell,
}

struct Writer;

impl Writer {
    /// Writes a sequence of sibling blocks. `bullet` is the marker of the
    /// list item that owns them, if any.
    fn blocks(&self, nodes: &[&Node], bullet: Option<char>) -> String {
        let mut parts: Vec<String> = vec![];
        let mut previous: Option<&NodeKind> = None;
        let mut alternate = false;
        let mut i = 0;
        while i < nodes.len() {
            let node = nodes[i];
            if node.kind.is_inline() {
                let run_end = nodes[i..]
                    .iter()
                    .position(|n| !n.kind.is_inline())
                    .map_or(nodes.len(), |p| i + p);
                let run: Vec<Node> = nodes[i..run_end].iter().map(|n| (*n).clone()).collect();
                parts.push(self.paragraph(&run));
                previous = None;
                i = run_end;
                continue;
            }

            alternate = match previous {
                Some(prev) if same_list_kind(prev, &node.kind) => !alternate,
                _ => false,
            };
            let first_in_item = i == 0 && bullet.is_some();
            parts.push(self.block(node, alternate, first_in_item.then_some(bullet).flatten()));
            previous = Some(&node.kind);
            i += 1;
        }
        parts.join(BLOCK_SEPARATOR)
    }

    fn block(&self, node: &Node, alternate: bool, bullet: Option<char>) -> String {
        match &node.kind {
            NodeKind::Document => {
                let children: Vec<&Node> = node.children.iter().collect();
                self.blocks(&children, None)
            }
            NodeKind::Paragraph | NodeKind::TableCell => self.paragraph(&node.children),
            NodeKind::Heading { level } => {
                let marker = "#".repeat((*level).clamp(1, 6) as usize);
                let content = self.inlines(&node.children, InlineContext::SingleLine);
                let content = protect_heading_end(content.trim());
                if content.is_empty() {
                    marker
                } else {
                    format!("{marker} {content}")
                }
            }
            NodeKind::CodeBlock { language, literal } => {
                let marker = if language.contains(CodeFence::BACKTICK) {
                    CodeFence::TILDE
                } else {
                    CodeFence::BACKTICK
                };
                let fence = CodeFence::fence_for(literal, marker);
                if literal.is_empty() {
                    format!("{fence}{language}\n{fence}")
                } else {
                    format!("{fence}{language}\n{literal}\n{fence}")
                }
            }
            NodeKind::BlockQuote => {
                let children: Vec<&Node> = node.children.iter().collect();
                let inner = self.blocks(&children, None);
                inner
                    .split('\n')
                    .map(|line| {
                        if line.is_empty() {
                            ">".to_string()
                        } else {
                            format!("> {line}")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            NodeKind::UnorderedList => {
                let marker = if alternate { '*' } else { '-' };
                node.children
                    .iter()
                    .map(|item| self.list_item(item, &marker.to_string(), marker))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            NodeKind::OrderedList { start } => {
                let delimiter = ListMarker::DELIMITERS[usize::from(alternate)];
                node.children
                    .iter()
                    .enumerate()
                    .map(|(n, item)| {
                        let number = start.saturating_add(n as u64).min(ListMarker::MAX_START);
                        self.list_item(item, &format!("{number}{delimiter}"), delimiter)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            NodeKind::ListItem { .. } => self.list_item(node, "-", '-'),
            NodeKind::ThematicBreak => match bullet {
                Some('-') => "***".to_string(),
                _ => ThematicBreak::CANONICAL.to_string(),
            },
            NodeKind::Table {
                columns,
                alignments,
            } => self.table(node, *columns, alignments),
            NodeKind::TableRow => self.table_row(&node.children, node.children.len()),
            _ => self.paragraph(std::slice::from_ref(node)),
        }
    }

    /// Writes one item: marker, optional task box, then content with
    /// continuation lines indented to the content column.
    fn list_item(&self, item: &Node, marker: &str, bullet: char) -> String {
        let mut head = marker.to_string();
        if let NodeKind::ListItem {
            checked: Some(checked),
        } = item.kind
        {
            head.push_str(if checked { " [x]" } else { " [ ]" });
        }

        let children: Vec<&Node> = item.children.iter().collect();
        let content = self.blocks(&children, Some(bullet));
        if content.is_empty() {
            return head;
        }

        let indent = " ".repeat(marker.len() + 1);
        let mut out = String::new();
        for (n, line) in content.split('\n').enumerate() {
            if n == 0 {
                out.push_str(&head);
                out.push(' ');
                out.push_str(line);
            } else {
                out.push('\n');
                if !line.is_empty() {
                    out.push_str(&indent);
                    out.push_str(line);
                }
            }
        }
        out
    }

    fn table(&self, node: &Node, columns: usize, alignments: &[Alignment]) -> String {
        let columns = columns.max(node.children.first().map_or(0, |r| r.children.len()));
        if columns == 0 {
            return String::new();
        }
        let mut rows = node.children.iter();
        let header = rows
            .next()
            .map(|r| self.table_row(&r.children, columns))
            .unwrap_or_else(|| self.table_row(&[], columns));
        let delimiter = (0..columns)
            .map(|c| match alignments.get(c).copied().unwrap_or_default() {
                Alignment::None => "---",
                Alignment::Left => ":--",
                Alignment::Center => ":-:",
                Alignment::Right => "--:",
            })
            .collect::<Vec<_>>()
            .join(" | ");

        let mut lines = vec![header, format!("| {delimiter} |")];
        lines.extend(rows.map(|r| self.table_row(&r.children, columns)));
        lines.join("\n")
    }

    fn table_row(&self, cells: &[Node], columns: usize) -> String {
        let cells: Vec<String> = (0..columns)
            .map(|c| {
                cells
                    .get(c)
                    .map(|cell| self.inlines(&cell.children, InlineContext::Cell))
                    .unwrap_or_default()
            })
            .collect();
        format!("| {} |", cells.join(" | "))
    }

    /// Inline content as paragraph lines, each protected against reading
    /// as a block start.
    fn paragraph(&self, children: &[Node]) -> String {
        self.inlines(children, InlineContext::Paragraph)
            .split('\n')
            .map(protect_line_start)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn inlines(&self, nodes: &[Node], context: InlineContext) -> String {
        let mut out = String::new();
        self.run(nodes, context, &mut Vec::new(), None, &mut out);
        out
    }

    /// Writes sibling inlines. `open` holds the markers of the enclosing
    /// emphasis spans and `after` is the character written after the run.
    /// Returns false when some span has no marker that reparses as written.
    fn run(
        &self,
        nodes: &[Node],
        context: InlineContext,
        open: &mut Vec<char>,
        after: Option<char>,
        out: &mut String,
    ) -> bool {
        let mut exact = true;
        for (i, node) in nodes.iter().enumerate() {
            let next = lead_char(&nodes[i + 1..], context, after);
            exact &= self.inline(node, context, open, next, out);
        }
        exact
    }

    fn inline(
        &self,
        node: &Node,
        context: InlineContext,
        open: &mut Vec<char>,
        next: Option<char>,
        out: &mut String,
    ) -> bool {
        match &node.kind {
            NodeKind::Text { literal } => {
                let text = escape_text(literal);
                match context {
                    InlineContext::Paragraph => out.push_str(&text),
                    _ => out.push_str(&text.replace('\n', " ")),
                }
            }
            NodeKind::Emphasis => return self.emphasis(node, 1, context, open, next, out),
            NodeKind::Strong => return self.emphasis(node, 2, context, open, next, out),
            NodeKind::Strikethrough => {
                out.push_str("~~");
                let tilde = Some(DelimiterRun::TILDE);
                let exact = self.run(&node.children, context, open, tilde, out);
                out.push_str("~~");
                return exact;
            }
            NodeKind::InlineCode { literal } => {
                let literal = literal.replace('\n', " ");
                if !literal.is_empty() {
                    let (fence, pad) = CodeSpan::delimit(&literal);
                    out.push_str(&format!("{fence}{pad}{literal}{pad}{fence}"));
                }
            }
            NodeKind::Link { destination, title } => {
                // `!` right before the bracket would make this an image.
                if ends_with_unescaped(out, LinkSyntax::IMAGE) {
                    out.insert(out.len() - 1, '\\');
                }
                // Link text is parsed as its own range.
                let mut text = String::new();
                let exact = self.run(&node.children, context, &mut Vec::new(), None, &mut text);
                out.push(LinkSyntax::OPEN);
                out.push_str(&text);
                out.push(LinkSyntax::CLOSE);
                out.push_str(&destination_and_title(destination, title.as_deref()));
                return exact;
            }
            NodeKind::Image {
                destination,
                alt,
                title,
            } => {
                out.push(LinkSyntax::IMAGE);
                out.push(LinkSyntax::OPEN);
                out.push_str(&escape_text(alt));
                out.push(LinkSyntax::CLOSE);
                out.push_str(&destination_and_title(destination, title.as_deref()));
            }
            NodeKind::Autolink { url } => {
                out.push(LinkSyntax::AUTOLINK_OPEN);
                match context {
                    InlineContext::Cell => out.push_str(&Table::encode_pipes(url)),
                    _ => out.push_str(url),
                }
                out.push(LinkSyntax::AUTOLINK_CLOSE);
            }
            NodeKind::LineBreak { hard } => match context {
                InlineContext::Paragraph if *hard => out.push_str("\\\n"),
                InlineContext::Paragraph => out.push('\n'),
                _ => out.push(' '),
            },
            NodeKind::Escape { character } => out.push_str(&escape_node(character)),
            _ => {
                // Blocks in inline position contribute their text.
                out.push_str(&escape_text(&node.plain_text()));
            }
        }
        true
    }

    /// Writes an emphasis (`len` 1) or strong (`len` 2) span.
    ///
    /// The preferred marker alternates with the enclosing span's. When the
    /// span written with it would not parse back as this span, the other
    /// marker is tried; if neither fits, the preferred rendering is kept and
    /// false is returned.
    fn emphasis(
        &self,
        node: &Node,
        len: usize,
        context: InlineContext,
        open: &mut Vec<char>,
        next: Option<char>,
        out: &mut String,
    ) -> bool {
        let preferred = if open.last() == Some(&DelimiterRun::STAR) {
            DelimiterRun::UNDERSCORE
        } else {
            DelimiterRun::STAR
        };
        let other = if preferred == DelimiterRun::STAR {
            DelimiterRun::UNDERSCORE
        } else {
            DelimiterRun::STAR
        };
        let tries = if open.len() < MARKER_SEARCH_DEPTH { 2 } else { 1 };

        let mut fallback: Option<String> = None;
        for &marker in &[preferred, other][..tries] {
            let delimiter = marker.to_string().repeat(len);
            // Children see the opening delimiter as the character before them.
            let mut written = delimiter.clone();
            open.push(marker);
            let nested = self.run(&node.children, context, open, Some(marker), &mut written);
            open.pop();

            let content = &written[delimiter.len()..];
            if nested && marker_fits(marker, out, content, next, open) {
                out.push_str(&written);
                out.push_str(&delimiter);
                return true;
            }
            fallback.get_or_insert_with(|| written + &delimiter);
        }
        out.push_str(&fallback.unwrap_or_default());
        false
    }
}

/// First character the writer emits for `nodes`, or `after` when they emit
/// nothing. An emphasis span reports `None`: whatever marker it takes
/// differs from the run before it.
fn lead_char(nodes: &[Node], context: InlineContext, after: Option<char>) -> Option<char> {
    for node in nodes {
        let first = match &node.kind {
            NodeKind::Emphasis | NodeKind::Strong => return None,
            NodeKind::Text { literal } => {
                escape_text(literal).chars().next().map(|c| match context {
                    InlineContext::Paragraph => c,
                    _ if c == '\n' => ' ',
                    _ => c,
                })
            }
            NodeKind::Strikethrough => Some(DelimiterRun::TILDE),
            NodeKind::InlineCode { literal } => (!literal.is_empty()).then_some(CodeSpan::TICK),
            NodeKind::Link { .. } => Some(LinkSyntax::OPEN),
            NodeKind::Image { .. } => Some(LinkSyntax::IMAGE),
            NodeKind::Autolink { .. } => Some(LinkSyntax::AUTOLINK_OPEN),
            NodeKind::LineBreak { hard } => Some(match context {
                InlineContext::Paragraph if *hard => '\\',
                InlineContext::Paragraph => '\n',
                _ => ' ',
            }),
            NodeKind::Escape { character } => escape_node(character).chars().next(),
            _ => escape_text(&node.plain_text()).chars().next(),
        };
        if first.is_some() {
            return first;
        }
    }
    after
}

/// Whether `marker` + `content` + `marker`, written after `before` and
/// followed by `next`, parses back as one span around `content`.
fn marker_fits(
    marker: char,
    before: &str,
    content: &str,
    next: Option<char>,
    enclosing: &[char],
) -> bool {
    let (Some(first), Some(last)) = (content.chars().next(), content.chars().next_back()) else {
        return false;
    };
    // Adjacent runs of the same character merge with the delimiters.
    if ends_with_unescaped(before, marker)
        || first == marker
        || ends_with_unescaped(content, marker)
        || next == Some(marker)
    {
        return false;
    }
    let opener = DelimiterRun::new(marker, 1, before.chars().next_back(), Some(first), 0);
    let closer = DelimiterRun::new(marker, 1, Some(last), next, 0);
    // An opener that can also close would pair with an enclosing opener.
    opener.can_open && closer.can_close && !(opener.can_close && enclosing.contains(&marker))
}

/// Whether `text` ends with `c` that is not backslash-escaped.
fn ends_with_unescaped(text: &str, c: char) -> bool {
    let Some(rest) = text.strip_suffix(c) else {
        return false;
    };
    let backslashes = rest.len() - rest.trim_end_matches('\\').len();
    backslashes % 2 == 0
}

fn escape_node(character: &str) -> String {
    if !character.is_empty() && character.chars().all(|c| c.is_ascii_punctuation()) {
        format!("\\{character}")
    } else {
        escape_text(character)
    }
}

fn same_list_kind(a: &NodeKind, b: &NodeKind) -> bool {
    matches!(
        (a, b),
        (NodeKind::UnorderedList, NodeKind::UnorderedList)
            | (NodeKind::OrderedList { .. }, NodeKind::OrderedList { .. })
    )
}

/// `(destination "title")`. Pipes are escaped everywhere so the same text
/// works inside a table cell.
fn destination_and_title(destination: &str, title: Option<&str>) -> String {
    let escaped = destination
        .replace('\\', "\\\\")
        .replace(Table::PIPE, "\\|");
    let destination = if LinkSyntax::needs_angle_brackets(destination) {
        let escaped = escaped.replace('<', "\\<").replace('>', "\\>");
        format!("<{escaped}>")
    } else {
        escaped
    };
    match title {
        Some(title) => {
            let title = title
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace(Table::PIPE, "\\|");
            format!("({destination} \"{title}\")")
        }
        None => format!("({destination})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::parse_markdown;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn round_trip(text: &str) -> String {
        stringify(&[parse_markdown(text).document])
    }

    fn wrap(kind: NodeKind, children: Vec<Node>) -> Node {
        Node::new(kind, children)
    }

    #[test]
    fn heading_and_strong() {
        assert_eq!(round_trip("# Title\n\nHello **world**"), "# Title\n\nHello **world**");
    }

    #[test]
    fn emphasis_inside_strong_switches_marker() {
        let node = Node::paragraph(vec![wrap(
            NodeKind::Strong,
            vec![wrap(NodeKind::Emphasis, vec![Node::text("a")])],
        )]);
        assert_snapshot!(stringify(&[node]), @"**_a_**");
    }

    #[test]
    fn adjacent_emphasis_switches_marker() {
        let node = Node::paragraph(vec![
            wrap(NodeKind::Emphasis, vec![Node::text("a")]),
            wrap(NodeKind::Emphasis, vec![Node::text("b")]),
        ]);
        assert_snapshot!(stringify(&[node]), @"*a*_b_");
    }

    #[test]
    fn strong_before_a_letter_takes_the_other_marker() {
        let node = Node::paragraph(vec![wrap(
            NodeKind::Emphasis,
            vec![
                wrap(NodeKind::Strong, vec![Node::text("a")]),
                Node::text("b"),
            ],
        )]);
        assert_snapshot!(stringify(&[node]), @"_**a**b_");
    }

    #[test]
    fn triple_nested_emphasis_alternates() {
        let node = Node::paragraph(vec![wrap(
            NodeKind::Emphasis,
            vec![wrap(
                NodeKind::Emphasis,
                vec![wrap(NodeKind::Emphasis, vec![Node::text("a")])],
            )],
        )]);
        assert_snapshot!(stringify(&[node]), @"_*_a_*_");
    }

    #[test]
    fn bang_before_link_is_escaped() {
        let node = Node::paragraph(vec![
            Node::text("wow!"),
            wrap(
                NodeKind::Link {
                    destination: "u".into(),
                    title: None,
                },
                vec![Node::text("x")],
            ),
        ]);
        assert_snapshot!(stringify(&[node]), @r"wow\![x](u)");
    }

    #[test]
    fn pipes_in_cells_stay_in_the_cell() {
        let cell = |child: Node| wrap(NodeKind::TableCell, vec![child]);
        let table = wrap(
            NodeKind::Table {
                columns: 2,
                alignments: vec![Alignment::None; 2],
            },
            vec![wrap(
                NodeKind::TableRow,
                vec![
                    cell(Node::leaf(NodeKind::Autolink {
                        url: "https://x.test/a|b".into(),
                    })),
                    cell(wrap(
                        NodeKind::Link {
                            destination: "a|b".into(),
                            title: Some("c|d".into()),
                        },
                        vec![Node::text("e")],
                    )),
                ],
            )],
        );
        assert_snapshot!(
            stringify(&[table]),
            @r#"
        | <https://x.test/a%7Cb> | [e](a\|b "c\|d") |
        | --- | --- |
        "#
        );
    }

    #[test]
    fn code_ending_in_backslash_is_padded() {
        let node = Node::paragraph(vec![Node::leaf(NodeKind::InlineCode {
            literal: "a\\".into(),
        })]);
        let written = stringify(&[node.clone()]);
        assert_eq!(written, "` a\\ `");
        assert_eq!(parse_markdown(&written).document.children, vec![node]);
    }

    #[test]
    fn literal_specials_are_escaped() {
        let node = Node::paragraph(vec![Node::text("# 2*3 [x]")]);
        assert_snapshot!(stringify(&[node]), @r"\# 2\*3 \[x\]");
    }

    #[test]
    fn inline_sub_list_is_written_as_a_run() {
        let nodes = [
            Node::text("see "),
            Node::leaf(NodeKind::Autolink {
                url: "https://x.test".into(),
            }),
        ];
        assert_snapshot!(stringify(&nodes), @"see <https://x.test>");
    }

    #[test]
    fn block_sub_list_uses_blank_line_separator() {
        let nodes = [
            Node::heading(2, vec![Node::text("a")]),
            Node::leaf(NodeKind::ThematicBreak),
        ];
        assert_eq!(stringify(&nodes), "## a\n\n---");
    }

    #[test]
    fn code_fence_outgrows_content() {
        let node = Node::leaf(NodeKind::CodeBlock {
            language: "md".into(),
            literal: "```\nx\n```".into(),
        });
        assert_eq!(stringify(&[node]), "````md\n```\nx\n```\n````");
    }

    #[test]
    fn lists_renumber_from_start() {
        let list = wrap(
            NodeKind::OrderedList { start: 7 },
            vec![
                wrap(
                    NodeKind::ListItem { checked: None },
                    vec![Node::paragraph(vec![Node::text("a")])],
                ),
                wrap(
                    NodeKind::ListItem { checked: None },
                    vec![Node::paragraph(vec![Node::text("b")])],
                ),
            ],
        );
        assert_eq!(stringify(&[list]), "7. a\n8. b");
    }

    #[test]
    fn adjacent_lists_alternate_markers() {
        let item = |t: &str| {
            wrap(
                NodeKind::ListItem { checked: None },
                vec![Node::paragraph(vec![Node::text(t)])],
            )
        };
        let nodes = [
            wrap(NodeKind::UnorderedList, vec![item("a")]),
            wrap(NodeKind::UnorderedList, vec![item("b")]),
        ];
        assert_eq!(stringify(&nodes), "- a\n\n* b");
    }

    #[test]
    fn table_with_alignments() {
        assert_eq!(
            round_trip("a | b\n:-: | --:\n1 | 2"),
            "| a | b |\n| :-: | --: |\n| 1 | 2 |"
        );
    }

    #[test]
    fn link_destination_needing_angles() {
        let link = wrap(
            NodeKind::Link {
                destination: "a b".into(),
                title: Some("say \"hi\"".into()),
            },
            vec![Node::text("x")],
        );
        assert_snapshot!(stringify(&[link]), @r#"[x](<a b> "say \"hi\"")"#);
    }

    #[test]
    fn client_escape_node() {
        let node = Node::paragraph(vec![Node::leaf(NodeKind::Escape {
            character: "*".into(),
        })]);
        assert_eq!(stringify(&[node]), "\\*");
    }

    #[rstest]
    #[case("# Title\n\nHello **world**")]
    #[case("> quote with *emphasis*\n>\n> - item\n>   continued")]
    #[case("- [ ] todo\n- [x] done\n\n1. one\n2. two\n\n3) three")]
    #[case("- a\n\n- b\n\n* c")]
    #[case("Text with \\*escapes\\* and `code` and ~~strike~~.")]
    #[case("line one\\\nline two\nline three")]
    #[case("[link](https://x.test \"T\") and ![img](i.png) and <https://y.test>")]
    #[case("```rust\nfn main() {}\n```\n\n    indented\n\n---")]
    #[case("| a | b |\n|:--|--:|\n| `x\\|y` | **z** |")]
    #[case("***both*** and **_mixed_** and *a*_b_")]
    #[case("1\\. not a list\n\n\\# not a heading")]
    #[case("- ***\n- a")]
    #[case("## C# and a \\#")]
    #[case("a\\![x](u) and b![y](v)")]
    #[case("***a**b*")]
    #[case("*see (_this_)*")]
    #[case("*`_]_*")]
    #[case("a \\| b\n\\:--")]
    #[case("~|:\n:-")]
    #[case("| h |\n|---|\n| [x](a\\|b) |")]
    #[case("| `a|b` | c |\n|---|---|\n| d | e |")]
    #[case("``a`b`` and ` `` `")]
    fn parse_stringify_parse_is_stable(#[case] text: &str) {
        let first = parse_markdown(text).document;
        let written = stringify(&[first.clone()]);
        let second = parse_markdown(&written).document;
        assert_eq!(first, second, "stringified as:\n{written}");
    }
}
