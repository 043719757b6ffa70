use serde::Serialize;

use crate::tree::Node;

/// Category of a non-fatal problem found while parsing or restoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// An emphasis/strong/strikethrough run with no partner.
    UnclosedDelimiter,
    /// A backtick run with no closing run of the same length.
    UnclosedCodeSpan,
    /// `[text](` without a well-formed destination and closing paren.
    MalformedLink,
    /// A fenced code block still open at end of input.
    UnclosedCodeFence,
    /// A node under a parent that cannot contain it.
    MisplacedNode,
    /// A required field absent or out of range.
    InvalidField,
    /// A node with no content that cannot be written.
    EmptyNode,
    /// Children on a kind that has none.
    UnexpectedChildren,
}

/// A non-fatal warning. Parsing and restoring never abort; problems are
/// degraded and reported here in encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    /// Byte offset into the source text (parse warnings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    /// Identifier of the affected node (restore warnings).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl Warning {
    pub fn at(kind: WarningKind, offset: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            offset: Some(offset),
            node_id: None,
        }
    }

    pub fn on(kind: WarningKind, node: &Node, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            offset: None,
            node_id: node.id.clone(),
        }
    }
}

/// A best-effort document tree plus the warnings produced building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub document: Node,
    pub warnings: Vec<Warning>,
}

impl ParseResult {
    /// Orders warnings nearest-first relative to a caret byte offset.
    ///
    /// The editor surface passes its caret so the diagnostic it most likely
    /// cares about comes first. Warnings without an offset go last; ties keep
    /// source order.
    pub fn anchor_at(&mut self, caret: usize) {
        self.warnings.sort_by_key(|w| match w.offset {
            Some(offset) => (0, offset.abs_diff(caret), offset),
            None => (1, 0, 0),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn anchor_orders_by_distance_from_caret() {
        let mut result = ParseResult {
            document: Node::document(vec![]),
            warnings: vec![
                Warning::at(WarningKind::UnclosedDelimiter, 0, "a"),
                Warning::on(WarningKind::EmptyNode, &Node::text(""), "b"),
                Warning::at(WarningKind::UnclosedDelimiter, 40, "c"),
                Warning::at(WarningKind::UnclosedDelimiter, 18, "d"),
            ],
        };
        result.anchor_at(30);
        let order: Vec<_> = result.warnings.iter().map(|w| w.message.as_str()).collect();
        assert_eq!(order, vec!["c", "d", "a", "b"]);
    }
}
