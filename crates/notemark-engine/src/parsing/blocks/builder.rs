use crate::parsing::diagnostics::{Warning, WarningKind};
use crate::parsing::inline::parse_inline_lines;
use crate::tree::{Alignment, Node, NodeKind};

use super::{
    classify::{BlockStart, CODE_INDENT, Line, LineClass, MarkdownLineClassifier},
    kinds::{CodeFence, FenceOpen, ListMarker, MarkerKind, Table},
};

/// Container nesting beyond which `>` and list markers are read as text.
pub const MAX_NESTING: usize = 64;

/// The block currently accepting lines at this nesting level.
#[derive(Debug)]
enum Open {
    None,
    Paragraph(Vec<Line>),
    Table {
        alignments: Vec<Alignment>,
        rows: Vec<Vec<Line>>,
    },
    Fence {
        open: FenceOpen,
        offset: usize,
        lines: Vec<Line>,
    },
    IndentedCode(Vec<Line>),
    Quote(Vec<Line>),
    List {
        first: ListMarker,
        items: Vec<Item>,
        after_blank: bool,
    },
}

#[derive(Debug)]
struct Item {
    checked: Option<bool>,
    content_indent: usize,
    lines: Vec<Line>,
}

impl Item {
    fn new(marker: ListMarker) -> Self {
        Self {
            checked: marker.checked,
            content_indent: marker.content_indent,
            lines: vec![marker.content],
        }
    }

    fn ends_in_text(&self) -> bool {
        self.lines.last().is_some_and(|l| !l.is_blank())
    }
}

/// Block construction state machine for one nesting level.
///
/// Each line is offered to the open block's continuation rule first; a
/// line it rejects closes the block and is then matched against the
/// block-start rules. Container blocks (quotes, list items) collect their
/// stripped lines and are re-parsed by a nested builder when they close.
pub struct BlockBuilder {
    classifier: MarkdownLineClassifier,
    depth: usize,
    open: Open,
    out: Vec<Node>,
    warnings: Vec<Warning>,
}

impl BlockBuilder {
    pub fn new(depth: usize) -> Self {
        Self {
            classifier: MarkdownLineClassifier,
            depth,
            open: Open::None,
            out: vec![],
            warnings: vec![],
        }
    }

    /// Parses a complete run of lines into block nodes.
    pub fn parse(lines: Vec<Line>, depth: usize) -> (Vec<Node>, Vec<Warning>) {
        let mut builder = Self::new(depth);
        for line in lines {
            builder.push(line);
        }
        builder.finish()
    }

    pub fn push(&mut self, line: Line) {
        let class = self.classify(&line);
        if self.continue_open(&line, &class) {
            return;
        }
        self.close();
        self.start(line, class);
    }

    pub fn finish(mut self) -> (Vec<Node>, Vec<Warning>) {
        // EOF flush
        self.close();
        (self.out, self.warnings)
    }

    fn classify(&self, line: &Line) -> LineClass {
        let mut class = self.classifier.classify(line);
        if self.depth >= MAX_NESTING
            && matches!(
                class.start,
                Some(BlockStart::BlockQuote(_) | BlockStart::ListItem(_))
            )
        {
            class.start = None;
        }
        class
    }

    /// Offers a line to the open block. Returns false if the block rejects
    /// it; the caller then closes the block and reprocesses the line.
    fn continue_open(&mut self, line: &Line, class: &LineClass) -> bool {
        match &mut self.open {
            Open::None => false,
            Open::Fence { open, lines, .. } => {
                if let Some(BlockStart::Fence(candidate)) = &class.start
                    && CodeFence::closes(open, candidate)
                {
                    let literal = join_lines(lines);
                    let language = open.language.clone();
                    self.open = Open::None;
                    self.out.push(Node::leaf(NodeKind::CodeBlock { language, literal }));
                } else {
                    lines.push(line.strip_columns(open.indent));
                }
                true
            }
            Open::IndentedCode(lines) => {
                if class.is_blank || class.indent >= CODE_INDENT {
                    lines.push(line.strip_columns(CODE_INDENT));
                    true
                } else {
                    false
                }
            }
            Open::Paragraph(lines) => {
                if class.is_blank {
                    self.close();
                    return true;
                }
                if lines.len() == 1
                    && let Some(alignments) = Table::open(&lines[0], &line.trim_start())
                {
                    let header = Table::split_row(&lines[0]);
                    self.open = Open::Table {
                        alignments,
                        rows: vec![header],
                    };
                    return true;
                }
                if class.start.as_ref().is_some_and(BlockStart::interrupts_paragraph) {
                    return false;
                }
                lines.push(line.trim_start());
                true
            }
            Open::Table { rows, .. } => {
                if class.is_blank {
                    self.close();
                    return true;
                }
                if class.start.is_some() {
                    return false;
                }
                rows.push(Table::split_row(&line.trim_start()));
                true
            }
            Open::Quote(lines) => {
                if class.is_blank {
                    self.close();
                    return true;
                }
                if let Some(BlockStart::BlockQuote(content)) = &class.start {
                    lines.push(content.clone());
                    return true;
                }
                if lazy_continuation(&self.classifier, lines, class) {
                    lines.push(line.trim_start());
                    return true;
                }
                false
            }
            Open::List {
                first,
                items,
                after_blank,
            } => {
                let Some(item) = items.last_mut() else {
                    return false;
                };
                if class.is_blank {
                    item.lines.push(Line::blank(line.offset));
                    *after_blank = true;
                    return true;
                }
                if class.indent >= item.content_indent {
                    item.lines.push(line.strip_columns(item.content_indent));
                    *after_blank = false;
                    return true;
                }
                if let Some(BlockStart::ListItem(marker)) = &class.start
                    && first.accepts(marker)
                {
                    items.push(Item::new(marker.clone()));
                    *after_blank = false;
                    return true;
                }
                if !*after_blank
                    && item.ends_in_text()
                    && lazy_continuation(&self.classifier, &item.lines, class)
                {
                    item.lines.push(line.trim_start());
                    return true;
                }
                false
            }
        }
    }

    fn start(&mut self, line: Line, class: LineClass) {
        if class.is_blank {
            return;
        }
        self.open = match class.start {
            None => Open::Paragraph(vec![line.trim_start()]),
            Some(BlockStart::ThematicBreak) => {
                self.out.push(Node::leaf(NodeKind::ThematicBreak));
                Open::None
            }
            Some(BlockStart::Heading(open)) => {
                let (children, warnings) = parse_inline_lines(&[open.content]);
                self.warnings.extend(warnings);
                self.out.push(Node::heading(open.level, children));
                Open::None
            }
            Some(BlockStart::Fence(open)) => Open::Fence {
                open,
                offset: line.offset,
                lines: vec![],
            },
            Some(BlockStart::IndentedCode) => {
                Open::IndentedCode(vec![line.strip_columns(CODE_INDENT)])
            }
            Some(BlockStart::BlockQuote(content)) => Open::Quote(vec![content]),
            Some(BlockStart::ListItem(marker)) => Open::List {
                first: marker.clone(),
                items: vec![Item::new(marker)],
                after_blank: false,
            },
        };
    }

    /// Closes the open block, emitting its node.
    fn close(&mut self) {
        let node = match std::mem::replace(&mut self.open, Open::None) {
            Open::None => return,
            Open::Paragraph(lines) => {
                let (children, warnings) = parse_inline_lines(&lines);
                self.warnings.extend(warnings);
                Node::paragraph(children)
            }
            Open::Table { alignments, rows } => self.close_table(alignments, rows),
            Open::Fence {
                open,
                offset,
                lines,
            } => {
                self.warnings.push(Warning::at(
                    WarningKind::UnclosedCodeFence,
                    offset,
                    "code fence is not closed; it runs to the end of its container",
                ));
                Node::leaf(NodeKind::CodeBlock {
                    language: open.language,
                    literal: join_lines(&lines),
                })
            }
            Open::IndentedCode(mut lines) => {
                while lines.last().is_some_and(Line::is_blank) {
                    lines.pop();
                }
                Node::leaf(NodeKind::CodeBlock {
                    language: String::new(),
                    literal: join_lines(&lines),
                })
            }
            Open::Quote(lines) => {
                let children = self.nested(lines);
                Node::new(NodeKind::BlockQuote, children)
            }
            Open::List { first, items, .. } => {
                let items = items
                    .into_iter()
                    .map(|item| {
                        let children = self.nested(item.lines);
                        Node::new(
                            NodeKind::ListItem {
                                checked: item.checked,
                            },
                            children,
                        )
                    })
                    .collect();
                let kind = match first.kind {
                    MarkerKind::Bullet(_) => NodeKind::UnorderedList,
                    MarkerKind::Ordered { start, .. } => NodeKind::OrderedList { start },
                };
                Node::new(kind, items)
            }
        };
        self.out.push(node);
    }

    fn close_table(&mut self, alignments: Vec<Alignment>, rows: Vec<Vec<Line>>) -> Node {
        let columns = alignments.len();
        let rows = rows
            .into_iter()
            .map(|cells| {
                let mut row: Vec<Node> = cells
                    .into_iter()
                    .take(columns)
                    .map(|cell| {
                        let (children, warnings) = parse_inline_lines(&[cell]);
                        self.warnings.extend(warnings);
                        Node::new(NodeKind::TableCell, children)
                    })
                    .collect();
                row.resize_with(columns, || Node::leaf(NodeKind::TableCell));
                Node::new(NodeKind::TableRow, row)
            })
            .collect();
        Node::new(
            NodeKind::Table {
                columns,
                alignments,
            },
            rows,
        )
    }

    fn nested(&mut self, lines: Vec<Line>) -> Vec<Node> {
        let (children, warnings) = Self::parse(lines, self.depth + 1);
        self.warnings.extend(warnings);
        children
    }
}

/// A non-blank line with no block start continues a container whose last
/// line is paragraph text.
fn lazy_continuation(
    classifier: &MarkdownLineClassifier,
    lines: &[Line],
    class: &LineClass,
) -> bool {
    if !matches!(class.start, None | Some(BlockStart::IndentedCode)) {
        return false;
    }
    match lines.last() {
        Some(last) if !last.is_blank() => {
            let last_class = classifier.classify(last);
            matches!(
                last_class.start,
                None | Some(BlockStart::BlockQuote(_)) | Some(BlockStart::ListItem(_))
            )
        }
        _ => false,
    }
}

fn join_lines(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|l| l.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> (Vec<Node>, Vec<Warning>) {
        let mut offset = 0;
        let lines = text
            .split('\n')
            .map(|l| {
                let line = Line::new(offset, l);
                offset += l.len() + 1;
                line
            })
            .collect();
        BlockBuilder::parse(lines, 0)
    }

    fn kinds(nodes: &[Node]) -> Vec<&'static str> {
        nodes.iter().map(|n| n.kind.name()).collect()
    }

    #[test]
    fn paragraph_then_heading() {
        let (nodes, _) = parse("a\nb\n# c");
        assert_eq!(kinds(&nodes), vec!["paragraph", "heading"]);
    }

    #[test]
    fn fence_is_a_raw_zone() {
        let (nodes, warnings) = parse("```rust\n# not a heading\n```");
        assert_eq!(
            nodes,
            vec![Node::leaf(NodeKind::CodeBlock {
                language: "rust".into(),
                literal: "# not a heading".into(),
            })]
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn unclosed_fence_closes_at_eof_with_warning() {
        let (nodes, warnings) = parse("text\n\n```\ncode");
        assert_eq!(kinds(&nodes), vec!["paragraph", "code block"]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnclosedCodeFence);
        assert_eq!(warnings[0].offset, Some(6));
    }

    #[test]
    fn indented_code_drops_trailing_blank_lines() {
        let (nodes, _) = parse("    a\n\n    b\n\n\nc");
        assert_eq!(
            nodes[0],
            Node::leaf(NodeKind::CodeBlock {
                language: String::new(),
                literal: "a\n\nb".into(),
            })
        );
        assert_eq!(kinds(&nodes), vec!["code block", "paragraph"]);
    }

    #[test]
    fn indented_line_does_not_interrupt_paragraph() {
        let (nodes, _) = parse("a\n    b");
        assert_eq!(kinds(&nodes), vec!["paragraph"]);
    }

    #[test]
    fn quote_with_lazy_continuation() {
        let (nodes, _) = parse("> a\nb\n\nc");
        assert_eq!(kinds(&nodes), vec!["block quote", "paragraph"]);
        assert_eq!(nodes[0].plain_text(), "a b");
    }

    #[test]
    fn nested_quotes() {
        let (nodes, _) = parse("> > a");
        assert_eq!(kinds(&nodes[0].children), vec!["block quote"]);
    }

    #[test]
    fn list_items_and_nested_list() {
        let (nodes, _) = parse("- a\n  - b\n- c");
        assert_eq!(kinds(&nodes), vec!["unordered list"]);
        let items = &nodes[0].children;
        assert_eq!(items.len(), 2);
        assert_eq!(kinds(&items[0].children), vec!["paragraph", "unordered list"]);
    }

    #[test]
    fn different_bullet_starts_new_list() {
        let (nodes, _) = parse("- a\n* b");
        assert_eq!(kinds(&nodes), vec!["unordered list", "unordered list"]);
    }

    #[test]
    fn ordered_list_keeps_start() {
        let (nodes, _) = parse("3. a\n4. b");
        assert_eq!(nodes[0].kind, NodeKind::OrderedList { start: 3 });
        assert_eq!(nodes[0].children.len(), 2);
    }

    #[test]
    fn ordered_item_not_at_one_does_not_interrupt_paragraph() {
        let (nodes, _) = parse("in\n2024. we");
        assert_eq!(kinds(&nodes), vec!["paragraph"]);
    }

    #[test]
    fn blank_line_inside_item_keeps_list_open() {
        let (nodes, _) = parse("- a\n\n  b\n- c");
        assert_eq!(kinds(&nodes), vec!["unordered list"]);
        assert_eq!(kinds(&nodes[0].children[0].children), vec!["paragraph", "paragraph"]);
    }

    #[test]
    fn task_items() {
        let (nodes, _) = parse("- [x] done\n- [ ] todo");
        let checked: Vec<_> = nodes[0]
            .children
            .iter()
            .map(|i| i.kind.clone())
            .collect();
        assert_eq!(
            checked,
            vec![
                NodeKind::ListItem {
                    checked: Some(true)
                },
                NodeKind::ListItem {
                    checked: Some(false)
                },
            ]
        );
    }

    #[test]
    fn table_rows_padded_and_truncated() {
        let (nodes, _) = parse("| a | b |\n|:--|--:|\n| 1 |\n| 1 | 2 | 3 |");
        let table = &nodes[0];
        assert_eq!(
            table.kind,
            NodeKind::Table {
                columns: 2,
                alignments: vec![Alignment::Left, Alignment::Right],
            }
        );
        assert_eq!(table.children.len(), 3);
        assert!(table.children.iter().all(|r| r.children.len() == 2));
        assert_eq!(table.children[1].children[1], Node::leaf(NodeKind::TableCell));
    }

    #[test]
    fn table_needs_header_on_single_line() {
        let (nodes, _) = parse("a\n| b |\n|---|");
        assert_eq!(kinds(&nodes), vec!["paragraph"]);
    }

    #[test]
    fn thematic_break_interrupts_paragraph() {
        let (nodes, _) = parse("a\n---\nb");
        assert_eq!(kinds(&nodes), vec!["paragraph", "thematic break", "paragraph"]);
    }

    #[test]
    fn deep_quote_nesting_is_bounded() {
        let text = ">".repeat(MAX_NESTING * 4);
        let (nodes, _) = parse(&text);
        assert_eq!(kinds(&nodes), vec!["block quote"]);
    }
}
