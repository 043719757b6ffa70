//! # Node Tree
//!
//! The unified in-memory representation of a markdown document: a single
//! exclusively-owned tree rooted at a [`NodeKind::Document`] node. Parents own
//! their children by value; there are no back-references, so cycles and
//! shared nodes are unrepresentable.
//!
//! ## Wire Format
//!
//! Nodes serialize as tagged objects so the surrounding service can marshal
//! them over JSON:
//!
//! ```text
//! { "type": "heading", "level": 1, "children": [{ "type": "text", "literal": "Title" }] }
//! ```
//!
//! Fields that clients omit deserialize to kind defaults (e.g. `level: 0`),
//! which the restorer then repairs.

pub mod links;

use serde::{Deserialize, Serialize};

pub use links::{LinkKind, LinkReference, links};

/// One element of the document tree (block or inline).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Optional stable identifier used for partial restores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

/// The closed set of node kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum NodeKind {
    // === Blocks ===
    Document,
    Paragraph,
    Heading {
        /// 1-6; `0` means the level was not supplied.
        #[serde(default)]
        level: u8,
    },
    CodeBlock {
        #[serde(default)]
        language: String,
        #[serde(default)]
        literal: String,
    },
    BlockQuote,
    OrderedList {
        #[serde(default = "default_start")]
        start: u64,
    },
    UnorderedList,
    ListItem {
        /// `Some` for task list items.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
    },
    ThematicBreak,
    Table {
        /// Derived from the header row.
        #[serde(default)]
        columns: usize,
        #[serde(default)]
        alignments: Vec<Alignment>,
    },
    TableRow,
    TableCell,

    // === Inlines ===
    Text {
        #[serde(default)]
        literal: String,
    },
    Emphasis,
    Strong,
    Strikethrough,
    InlineCode {
        #[serde(default)]
        literal: String,
    },
    Link {
        #[serde(default)]
        destination: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Image {
        #[serde(default)]
        destination: String,
        #[serde(default)]
        alt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Autolink {
        #[serde(default)]
        url: String,
    },
    LineBreak {
        #[serde(default)]
        hard: bool,
    },
    Escape {
        #[serde(default)]
        character: String,
    },
}

fn default_start() -> u64 {
    1
}

/// Column alignment taken from a table's delimiter row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Alignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// What a node kind may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// Block children only (Document, BlockQuote, ListItem).
    Blocks,
    /// Inline children only (Paragraph, Heading, TableCell, Emphasis, ...).
    Inlines,
    /// ListItem children only.
    ListItems,
    /// TableRow children only.
    TableRows,
    /// TableCell children only.
    TableCells,
    /// No children.
    Leaf,
}

impl NodeKind {
    /// True for kinds occupying whole lines.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Document
                | NodeKind::Paragraph
                | NodeKind::Heading { .. }
                | NodeKind::CodeBlock { .. }
                | NodeKind::BlockQuote
                | NodeKind::OrderedList { .. }
                | NodeKind::UnorderedList
                | NodeKind::ListItem { .. }
                | NodeKind::ThematicBreak
                | NodeKind::Table { .. }
                | NodeKind::TableRow
                | NodeKind::TableCell
        )
    }

    pub fn is_inline(&self) -> bool {
        !self.is_block()
    }

    pub fn is_list(&self) -> bool {
        matches!(self, NodeKind::OrderedList { .. } | NodeKind::UnorderedList)
    }

    pub fn content_model(&self) -> ContentModel {
        match self {
            NodeKind::Document | NodeKind::BlockQuote | NodeKind::ListItem { .. } => {
                ContentModel::Blocks
            }
            NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::TableCell
            | NodeKind::Emphasis
            | NodeKind::Strong
            | NodeKind::Strikethrough
            | NodeKind::Link { .. } => ContentModel::Inlines,
            NodeKind::OrderedList { .. } | NodeKind::UnorderedList => ContentModel::ListItems,
            NodeKind::Table { .. } => ContentModel::TableRows,
            NodeKind::TableRow => ContentModel::TableCells,
            NodeKind::CodeBlock { .. }
            | NodeKind::ThematicBreak
            | NodeKind::Text { .. }
            | NodeKind::InlineCode { .. }
            | NodeKind::Image { .. }
            | NodeKind::Autolink { .. }
            | NodeKind::LineBreak { .. }
            | NodeKind::Escape { .. } => ContentModel::Leaf,
        }
    }

    /// Short human-readable name used in warnings.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document => "document",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::CodeBlock { .. } => "code block",
            NodeKind::BlockQuote => "block quote",
            NodeKind::OrderedList { .. } => "ordered list",
            NodeKind::UnorderedList => "unordered list",
            NodeKind::ListItem { .. } => "list item",
            NodeKind::ThematicBreak => "thematic break",
            NodeKind::Table { .. } => "table",
            NodeKind::TableRow => "table row",
            NodeKind::TableCell => "table cell",
            NodeKind::Text { .. } => "text",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::Strikethrough => "strikethrough",
            NodeKind::InlineCode { .. } => "inline code",
            NodeKind::Link { .. } => "link",
            NodeKind::Image { .. } => "image",
            NodeKind::Autolink { .. } => "autolink",
            NodeKind::LineBreak { .. } => "line break",
            NodeKind::Escape { .. } => "escape",
        }
    }
}

impl ContentModel {
    /// Whether a child of `kind` is allowed under this content model.
    pub fn admits(self, kind: &NodeKind) -> bool {
        match self {
            ContentModel::Blocks => {
                kind.is_block()
                    && !matches!(
                        kind,
                        NodeKind::Document
                            | NodeKind::ListItem { .. }
                            | NodeKind::TableRow
                            | NodeKind::TableCell
                    )
            }
            ContentModel::Inlines => kind.is_inline(),
            ContentModel::ListItems => matches!(kind, NodeKind::ListItem { .. }),
            ContentModel::TableRows => matches!(kind, NodeKind::TableRow),
            ContentModel::TableCells => matches!(kind, NodeKind::TableCell),
            ContentModel::Leaf => false,
        }
    }
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            id: None,
            kind,
            children,
        }
    }

    pub fn leaf(kind: NodeKind) -> Self {
        Self::new(kind, vec![])
    }

    pub fn document(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Document, children)
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Paragraph, children)
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Self {
        Self::new(NodeKind::Heading { level }, children)
    }

    pub fn text(literal: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Text {
            literal: literal.into(),
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Concatenated literal text of this subtree, as used for image alt text.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { literal } | NodeKind::InlineCode { literal } => out.push_str(literal),
            NodeKind::Escape { character } => out.push_str(character),
            NodeKind::Autolink { url } => out.push_str(url),
            NodeKind::Image { alt, .. } => out.push_str(alt),
            NodeKind::LineBreak { .. } => out.push(' '),
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Pre-order traversal.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }

    /// Replaces the first node (pre-order) carrying `id` with `replacement`.
    ///
    /// Returns the replaced node, or gives `replacement` back if no node
    /// carries the identifier.
    pub fn replace_by_id(&mut self, id: &str, replacement: Node) -> Result<Node, Node> {
        if self.id.as_deref() == Some(id) {
            return Ok(std::mem::replace(self, replacement));
        }
        let mut replacement = replacement;
        for child in &mut self.children {
            match child.replace_by_id(id, replacement) {
                Ok(old) => return Ok(old),
                Err(back) => replacement = back,
            }
        }
        Err(replacement)
    }

    /// Checks the nesting invariant for the whole subtree, returning a
    /// description of every violation found.
    pub fn nesting_violations(&self) -> Vec<String> {
        let mut out = vec![];
        self.collect_violations(&mut out);
        out
    }

    fn collect_violations(&self, out: &mut Vec<String>) {
        let model = self.kind.content_model();
        for child in &self.children {
            if !model.admits(&child.kind) {
                out.push(format!(
                    "{} cannot contain {}",
                    self.kind.name(),
                    child.kind.name()
                ));
            }
            child.collect_violations(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn heading_admits_only_inlines() {
        let model = NodeKind::Heading { level: 1 }.content_model();
        assert!(model.admits(&NodeKind::Strong));
        assert!(!model.admits(&NodeKind::Paragraph));
    }

    #[test]
    fn list_item_admits_only_blocks() {
        let model = NodeKind::ListItem { checked: None }.content_model();
        assert!(model.admits(&NodeKind::Paragraph));
        assert!(!model.admits(&NodeKind::Text {
            literal: "x".into()
        }));
        assert!(!model.admits(&NodeKind::ListItem { checked: None }));
    }

    #[test]
    fn violations_are_reported() {
        let doc = Node::document(vec![Node::text("x")]);
        assert_eq!(doc.nesting_violations(), vec!["document cannot contain text"]);
    }

    #[test]
    fn replace_by_id_swaps_matching_node() {
        let mut doc = Node::document(vec![
            Node::paragraph(vec![Node::text("a")]).with_id("p1"),
            Node::paragraph(vec![Node::text("b")]).with_id("p2"),
        ]);
        let old = doc
            .replace_by_id("p2", Node::heading(2, vec![Node::text("c")]).with_id("p2"))
            .unwrap();
        assert_eq!(old.plain_text(), "b");
        assert_eq!(doc.children[1].kind, NodeKind::Heading { level: 2 });
    }

    #[test]
    fn replace_by_id_returns_replacement_when_missing() {
        let mut doc = Node::document(vec![]);
        let back = doc.replace_by_id("nope", Node::text("x")).unwrap_err();
        assert_eq!(back, Node::text("x"));
    }

    #[test]
    fn serializes_with_type_tag() {
        let node = Node::heading(1, vec![Node::text("Title")]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "heading",
                "level": 1,
                "children": [{ "type": "text", "literal": "Title" }]
            })
        );
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let node: Node = serde_json::from_str(r#"{"type":"heading"}"#).unwrap();
        assert_eq!(node.kind, NodeKind::Heading { level: 0 });
        let list: Node = serde_json::from_str(r#"{"type":"orderedList"}"#).unwrap();
        assert_eq!(list.kind, NodeKind::OrderedList { start: 1 });
    }
}
