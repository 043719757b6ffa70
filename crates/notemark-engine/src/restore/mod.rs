//! # Restore
//!
//! Repairs a client-supplied node list into a valid document tree.
//!
//! Input typically comes from a lossy rich editor, so nothing is rejected:
//! every structural problem is normalized and reported as a [`Warning`]
//! carrying the affected node's identifier.
//!
//! ## Passes
//!
//! 1. **Structure**: inline runs under a block container are wrapped in an
//!    implicit paragraph, stray list items and table rows get a parent,
//!    leaf kinds lose any children, empty containers are dropped.
//! 2. **Fields**: missing or out-of-range fields fall back to kind defaults
//!    (heading level 1), and derived fields (table `columns` and
//!    `alignments`) are recomputed from the children instead of trusted.
//! 3. **Canonical inline form**: escapes fold into text, adjacent text
//!    merges, embedded newlines become soft breaks. Whitespace and breaks
//!    that a line edge or a delimiter run would swallow are trimmed or moved
//!    outside the span, and a soft break never follows another break.
//!
//! Restoring an already-restored tree changes nothing and warns nothing.

use crate::parsing::blocks::kinds::{ListMarker, Table};
use crate::parsing::diagnostics::{ParseResult, Warning, WarningKind};
use crate::parsing::inline::kinds::LinkSyntax;
use crate::tree::{ContentModel, Node, NodeKind};

/// Where inline content ends up. Line breaks only survive in paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineContext {
    Paragraph,
    SingleLine,
    Cell,
}

/// Restores a node list into a document. Document nodes in the list
/// contribute their children.
pub fn restore(nodes: Vec<Node>) -> ParseResult {
    let mut restorer = Restorer::default();
    let mut top = vec![];
    for node in nodes {
        if node.kind == NodeKind::Document {
            top.extend(node.children);
        } else {
            top.push(node);
        }
    }
    let children = restorer.blocks(top);
    log::debug!(
        "restored {} blocks with {} warnings",
        children.len(),
        restorer.warnings.len()
    );
    ParseResult {
        document: Node::document(children),
        warnings: restorer.warnings,
    }
}

#[derive(Default)]
struct Restorer {
    warnings: Vec<Warning>,
}

impl Restorer {
    fn warn(&mut self, kind: WarningKind, node: &Node, message: impl Into<String>) {
        let warning = Warning::on(kind, node, message);
        log::debug!("restore: {}", warning.message);
        self.warnings.push(warning);
    }

    /// Normalizes children of a block container (document, quote, item).
    fn blocks(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        let mut out = vec![];
        let mut nodes = nodes.into_iter().peekable();
        while let Some(node) = nodes.next() {
            match node.kind {
                _ if node.kind.is_inline() => {
                    self.warn(
                        WarningKind::MisplacedNode,
                        &node,
                        format!("{} outside a paragraph, wrapped in one", node.kind.name()),
                    );
                    let mut run = vec![node];
                    while let Some(next) = nodes.next_if(|n| n.kind.is_inline()) {
                        run.push(next);
                    }
                    out.extend(self.block(Node::paragraph(run)));
                }
                NodeKind::ListItem { .. } => {
                    self.warn(
                        WarningKind::MisplacedNode,
                        &node,
                        "list item outside a list, wrapped in one",
                    );
                    let mut run = vec![node];
                    while let Some(next) =
                        nodes.next_if(|n| matches!(n.kind, NodeKind::ListItem { .. }))
                    {
                        run.push(next);
                    }
                    out.extend(self.block(Node::new(NodeKind::UnorderedList, run)));
                }
                NodeKind::TableRow => {
                    self.warn(
                        WarningKind::MisplacedNode,
                        &node,
                        "table row outside a table, wrapped in one",
                    );
                    let mut run = vec![node];
                    while let Some(next) = nodes.next_if(|n| n.kind == NodeKind::TableRow) {
                        run.push(next);
                    }
                    let table = Node::new(
                        NodeKind::Table {
                            columns: 0,
                            alignments: vec![],
                        },
                        run,
                    );
                    out.extend(self.block(table));
                }
                NodeKind::TableCell => {
                    self.warn(
                        WarningKind::MisplacedNode,
                        &node,
                        "table cell outside a table, kept as a paragraph",
                    );
                    let paragraph = Node {
                        id: node.id,
                        kind: NodeKind::Paragraph,
                        children: node.children,
                    };
                    out.extend(self.block(paragraph));
                }
                NodeKind::Document => {
                    self.warn(
                        WarningKind::MisplacedNode,
                        &node,
                        "nested document, children spliced into parent",
                    );
                    out.extend(self.blocks(node.children));
                }
                _ => out.extend(self.block(node)),
            }
        }
        out
    }

    /// Normalizes one block node. Returns `None` if it is dropped.
    fn block(&mut self, node: Node) -> Option<Node> {
        let Node {
            id,
            kind,
            children,
        } = node;
        let mut node = Node {
            id,
            kind,
            children: vec![],
        };

        match &mut node.kind {
            NodeKind::Paragraph => {
                node.children = self.inlines(children, InlineContext::Paragraph);
                if node.children.is_empty() {
                    self.warn(WarningKind::EmptyNode, &node, "empty paragraph dropped");
                    return None;
                }
            }
            NodeKind::Heading { level } => {
                if *level == 0 || *level > 6 {
                    let fixed = (*level).clamp(1, 6);
                    let message = format!("heading level {level} out of range, set to {fixed}");
                    *level = fixed;
                    self.warn(WarningKind::InvalidField, &node, message);
                }
                node.children = self.inlines(children, InlineContext::SingleLine);
            }
            NodeKind::CodeBlock { language, .. } => {
                let first_word = language.split_whitespace().next().unwrap_or_default();
                if first_word.len() != language.len() {
                    *language = first_word.to_string();
                    self.warn(
                        WarningKind::InvalidField,
                        &node,
                        "code block language trimmed to its first word",
                    );
                }
                self.drop_children(&node, &children);
            }
            NodeKind::ThematicBreak => self.drop_children(&node, &children),
            NodeKind::BlockQuote | NodeKind::ListItem { .. } => {
                node.children = self.blocks(children);
            }
            NodeKind::OrderedList { start } if *start > ListMarker::MAX_START => {
                let message =
                    format!("list start {start} too large, set to {}", ListMarker::MAX_START);
                *start = ListMarker::MAX_START;
                self.warn(WarningKind::InvalidField, &node, message);
                node.children = self.list_items(children);
                if node.children.is_empty() {
                    self.warn(WarningKind::EmptyNode, &node, "empty list dropped");
                    return None;
                }
            }
            NodeKind::OrderedList { .. } | NodeKind::UnorderedList => {
                node.children = self.list_items(children);
                if node.children.is_empty() {
                    self.warn(WarningKind::EmptyNode, &node, "empty list dropped");
                    return None;
                }
            }
            NodeKind::Table { .. } => return self.table(node, children),
            NodeKind::Document
            | NodeKind::TableRow
            | NodeKind::TableCell
            | NodeKind::Text { .. }
            | NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Strikethrough
            | NodeKind::InlineCode { .. }
            | NodeKind::Link { .. }
            | NodeKind::Image { .. }
            | NodeKind::Autolink { .. }
            | NodeKind::LineBreak { .. }
            | NodeKind::Escape { .. } => {
                // Routed by `blocks` before reaching here.
                node.children = children;
            }
        }
        Some(node)
    }

    fn list_items(&mut self, children: Vec<Node>) -> Vec<Node> {
        let mut items = vec![];
        let mut children = children.into_iter().peekable();
        while let Some(child) = children.next() {
            let item = match child.kind {
                NodeKind::ListItem { .. } => child,
                _ => {
                    self.warn(
                        WarningKind::MisplacedNode,
                        &child,
                        format!("{} directly in a list, wrapped in an item", child.kind.name()),
                    );
                    let mut run = vec![child];
                    if run[0].kind.is_inline() {
                        while let Some(next) = children.next_if(|n| n.kind.is_inline()) {
                            run.push(next);
                        }
                    }
                    Node::new(NodeKind::ListItem { checked: None }, run)
                }
            };
            items.extend(self.block(item));
        }
        items
    }

    fn table(&mut self, mut node: Node, children: Vec<Node>) -> Option<Node> {
        let mut rows = vec![];
        let mut children = children.into_iter().peekable();
        while let Some(child) = children.next() {
            let row = match child.kind {
                NodeKind::TableRow => child,
                NodeKind::TableCell => {
                    self.warn(
                        WarningKind::MisplacedNode,
                        &child,
                        "table cell directly in a table, wrapped in a row",
                    );
                    let mut run = vec![child];
                    while let Some(next) = children.next_if(|n| n.kind == NodeKind::TableCell) {
                        run.push(next);
                    }
                    Node::new(NodeKind::TableRow, run)
                }
                _ => {
                    self.warn(
                        WarningKind::MisplacedNode,
                        &child,
                        format!("{} directly in a table, wrapped in a row", child.kind.name()),
                    );
                    Node::new(NodeKind::TableRow, vec![child])
                }
            };
            rows.push(self.table_row(row));
        }

        let columns = rows.first().map_or(0, |r| r.children.len());
        if columns == 0 {
            self.warn(WarningKind::EmptyNode, &node, "table without columns dropped");
            return None;
        }
        for row in &mut rows {
            row.children.resize_with(columns, || Node::leaf(NodeKind::TableCell));
        }
        if let NodeKind::Table {
            columns: stored,
            alignments,
        } = &mut node.kind
        {
            if *stored != columns || alignments.len() != columns {
                log::debug!("table columns re-derived: {stored} -> {columns}");
            }
            *stored = columns;
            alignments.resize(columns, Default::default());
        }
        node.children = rows;
        Some(node)
    }

    fn table_row(&mut self, row: Node) -> Node {
        let Node { id, kind, children } = row;
        let cells = children
            .into_iter()
            .map(|child| {
                let cell = match child.kind {
                    NodeKind::TableCell => child,
                    _ => {
                        self.warn(
                            WarningKind::MisplacedNode,
                            &child,
                            format!(
                                "{} directly in a table row, wrapped in a cell",
                                child.kind.name()
                            ),
                        );
                        Node::new(NodeKind::TableCell, vec![child])
                    }
                };
                let Node { id, kind, children } = cell;
                Node {
                    id,
                    kind,
                    children: self.inlines(children, InlineContext::Cell),
                }
            })
            .collect();
        Node {
            id,
            kind,
            children: cells,
        }
    }

    /// Normalizes the content of a paragraph, heading or cell: fixes each
    /// node, then trims what cannot be written at the edges. A hard break
    /// can open a paragraph; no break can end one.
    fn inlines(&mut self, nodes: Vec<Node>, context: InlineContext) -> Vec<Node> {
        let mut out = self.inlines_nested(nodes, context);

        while let Some(first) = out.first() {
            if matches!(first.kind, NodeKind::LineBreak { hard: false }) {
                let edge = out.remove(0);
                self.warn(WarningKind::MisplacedNode, &edge, "line break at start dropped");
            } else if !(matches!(first.kind, NodeKind::Text { .. })
                && self.trim_text(&mut out, 0, str::trim_start))
            {
                break;
            }
        }
        while let Some(last) = out.last() {
            let index = out.len() - 1;
            if matches!(last.kind, NodeKind::LineBreak { .. }) {
                if let Some(edge) = out.pop() {
                    self.warn(WarningKind::MisplacedNode, &edge, "line break at end dropped");
                }
            } else if !(matches!(last.kind, NodeKind::Text { .. })
                && self.trim_text(&mut out, index, str::trim_end))
            {
                break;
            }
        }
        out
    }

    fn inline(&mut self, node: Node, context: InlineContext, out: &mut Vec<Node>) {
        if node.kind.is_block() {
            self.warn(
                WarningKind::MisplacedNode,
                &node,
                format!("{} inside inline content, kept as its text", node.kind.name()),
            );
            match node.kind.content_model() {
                ContentModel::Inlines => {
                    for child in node.children {
                        self.inline(child, context, out);
                    }
                }
                _ => {
                    let text = node.plain_text();
                    if !text.is_empty() {
                        self.inline(Node::text(text), context, out);
                    }
                }
            }
            return;
        }

        if node.kind.content_model() == ContentModel::Leaf && !node.children.is_empty() {
            self.warn(
                WarningKind::UnexpectedChildren,
                &node,
                format!("{} cannot have children, dropped them", node.kind.name()),
            );
        }

        let Node { id, kind, children } = node;
        match kind {
            NodeKind::Text { literal } => self.text(id, literal, context, out),
            NodeKind::Escape { character } => self.text(id, character, context, out),
            NodeKind::Emphasis | NodeKind::Strong | NodeKind::Strikethrough => {
                let mut children = self.inlines_nested(children, context);
                let leading = peel_start(&mut children);
                let trailing = peel_end(&mut children);
                let node = Node { id, kind, children };
                if !leading.is_empty() || !trailing.is_empty() {
                    self.warn(
                        WarningKind::MisplacedNode,
                        &node,
                        format!("whitespace at the edge of {} moved outside it", node.kind.name()),
                    );
                }
                out.extend(leading);
                if node.children.is_empty() {
                    self.warn(
                        WarningKind::EmptyNode,
                        &node,
                        format!("empty {} dropped", node.kind.name()),
                    );
                } else {
                    out.push(node);
                }
                out.extend(trailing);
            }
            NodeKind::Link { destination, title } => {
                let mut children = self.inlines_nested(children, context);
                let node = Node {
                    id,
                    kind: NodeKind::Link {
                        destination: destination.clone(),
                        title,
                    },
                    children: vec![],
                };
                if children.is_empty() {
                    if destination.is_empty() {
                        self.warn(WarningKind::EmptyNode, &node, "empty link dropped");
                        return;
                    }
                    self.warn(
                        WarningKind::EmptyNode,
                        &node,
                        "link without text, destination used as text",
                    );
                    children.push(Node::text(destination));
                }
                out.push(Node { children, ..node });
            }
            NodeKind::InlineCode { literal } => {
                let literal = literal.replace("\r\n", " ").replace('\n', " ");
                let node = Node {
                    id,
                    kind: NodeKind::InlineCode { literal },
                    children: vec![],
                };
                if matches!(&node.kind, NodeKind::InlineCode { literal } if literal.is_empty()) {
                    self.warn(WarningKind::EmptyNode, &node, "empty inline code dropped");
                } else {
                    out.push(node);
                }
            }
            NodeKind::Autolink { url } => {
                let mut node = Node {
                    id,
                    kind: NodeKind::Autolink { url: url.clone() },
                    children: vec![],
                };
                if url.is_empty() {
                    self.warn(WarningKind::EmptyNode, &node, "empty autolink dropped");
                } else if LinkSyntax::is_autolink(&url) {
                    let encoded = Table::encode_pipes(&url);
                    if context == InlineContext::Cell && encoded != url {
                        self.warn(
                            WarningKind::InvalidField,
                            &node,
                            "pipe in autolink URL percent-encoded inside a table cell",
                        );
                        node.kind = NodeKind::Autolink { url: encoded };
                    }
                    out.push(node);
                } else {
                    self.warn(
                        WarningKind::InvalidField,
                        &node,
                        "autolink URL is not absolute, kept as a link",
                    );
                    out.push(Node {
                        id: node.id,
                        kind: NodeKind::Link {
                            destination: url.clone(),
                            title: None,
                        },
                        children: vec![Node::text(url)],
                    });
                }
            }
            NodeKind::LineBreak { .. } if context != InlineContext::Paragraph => {
                out.push(Node {
                    id,
                    ..Node::text(" ")
                });
            }
            kind @ (NodeKind::Image { .. } | NodeKind::LineBreak { .. }) => {
                out.push(Node {
                    id,
                    kind,
                    children: vec![],
                });
            }
            kind => {
                // Block kinds are handled above.
                out.push(Node { id, kind, children });
            }
        }
    }

    fn inlines_nested(&mut self, children: Vec<Node>, context: InlineContext) -> Vec<Node> {
        let mut out = vec![];
        for child in children {
            self.inline(child, context, &mut out);
        }
        self.tidy_lines(merge_text(out))
    }

    /// Drops a soft break that directly follows another break (it would
    /// write a blank line) and trims the whitespace a line edge strips.
    fn tidy_lines(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
        let mut line_start = false;
        for node in nodes {
            match node.kind {
                NodeKind::LineBreak { hard: false } => {
                    if let Some(last) = out.len().checked_sub(1) {
                        self.trim_text(&mut out, last, trim_line_end);
                    }
                    if out
                        .last()
                        .is_some_and(|n| matches!(n.kind, NodeKind::LineBreak { .. }))
                    {
                        self.warn(
                            WarningKind::MisplacedNode,
                            &node,
                            "line break after a line break dropped",
                        );
                        continue;
                    }
                    line_start = true;
                    out.push(node);
                }
                NodeKind::LineBreak { hard: true } => {
                    line_start = true;
                    out.push(node);
                }
                NodeKind::Text { .. } if line_start => {
                    out.push(node);
                    let last = out.len() - 1;
                    line_start = self.trim_text(&mut out, last, str::trim_start);
                }
                _ => {
                    line_start = false;
                    out.push(node);
                }
            }
        }
        out
    }

    /// Trims the text node at `index` with `trim`, dropping it when nothing
    /// is left. Returns true if it was dropped.
    fn trim_text(&mut self, nodes: &mut Vec<Node>, index: usize, trim: fn(&str) -> &str) -> bool {
        let Some(NodeKind::Text { literal }) = nodes.get_mut(index).map(|n| &mut n.kind) else {
            return false;
        };
        let trimmed = trim(literal);
        if trimmed.len() == literal.len() {
            return false;
        }
        *literal = trimmed.to_string();
        let empty = literal.is_empty();
        self.warn(
            WarningKind::InvalidField,
            &nodes[index],
            "whitespace at a line edge trimmed",
        );
        if empty {
            nodes.remove(index);
        }
        empty
    }

    /// Literal text; embedded newlines become soft breaks (or spaces where
    /// breaks cannot appear).
    fn text(
        &mut self,
        id: Option<String>,
        literal: String,
        context: InlineContext,
        out: &mut Vec<Node>,
    ) {
        if literal.is_empty() {
            let node = Node {
                id,
                ..Node::text("")
            };
            self.warn(WarningKind::EmptyNode, &node, "empty text dropped");
            return;
        }
        let literal = literal.replace("\r\n", "\n");
        if context != InlineContext::Paragraph || !literal.contains('\n') {
            out.push(Node {
                id,
                ..Node::text(literal.replace('\n', " "))
            });
            return;
        }
        for (n, part) in literal.split('\n').enumerate() {
            if n > 0 {
                out.push(Node::leaf(NodeKind::LineBreak { hard: false }));
            }
            if !part.is_empty() {
                out.push(Node {
                    id: if n == 0 { id.clone() } else { None },
                    ..Node::text(part)
                });
            }
        }
    }

    fn drop_children(&mut self, node: &Node, children: &[Node]) {
        if !children.is_empty() {
            self.warn(
                WarningKind::UnexpectedChildren,
                node,
                format!("{} cannot have children, dropped them", node.kind.name()),
            );
        }
    }
}

/// Line ends drop trailing spaces and tabs only.
fn trim_line_end(text: &str) -> &str {
    text.trim_end_matches([' ', '\t'])
}

/// Splits leading whitespace text and soft breaks off a span's children.
/// A delimiter run followed by whitespace cannot open.
fn peel_start(children: &mut Vec<Node>) -> Vec<Node> {
    let mut peeled = vec![];
    while let Some(first) = children.first_mut() {
        match &mut first.kind {
            NodeKind::LineBreak { hard: false } => peeled.push(children.remove(0)),
            NodeKind::Text { literal } if literal.starts_with(char::is_whitespace) => {
                let rest = literal.split_off(literal.len() - literal.trim_start().len());
                peeled.push(Node::text(std::mem::replace(literal, rest)));
                if literal.is_empty() {
                    children.remove(0);
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    peeled
}

/// Splits trailing whitespace text and line breaks off a span's children.
/// A delimiter run preceded by whitespace cannot close.
fn peel_end(children: &mut Vec<Node>) -> Vec<Node> {
    let mut peeled = vec![];
    while let Some(last) = children.last_mut() {
        match &mut last.kind {
            NodeKind::LineBreak { .. } => peeled.extend(children.pop()),
            NodeKind::Text { literal } if literal.ends_with(char::is_whitespace) => {
                let kept = literal.trim_end().len();
                peeled.push(Node::text(literal.split_off(kept)));
                if literal.is_empty() {
                    children.pop();
                } else {
                    break;
                }
            }
            _ => break,
        }
    }
    peeled.reverse();
    peeled
}

/// Merges adjacent text nodes. A node carrying an identifier keeps it; two
/// identified neighbours stay separate.
fn merge_text(nodes: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Some(last), NodeKind::Text { literal }) = (out.last_mut(), &node.kind)
            && let NodeKind::Text { literal: previous } = &mut last.kind
            && (last.id.is_none() || node.id.is_none())
        {
            previous.push_str(literal);
            if last.id.is_none() {
                last.id = node.id;
            }
            continue;
        }
        out.push(node);
    }
    out
}
