//! Request and response shapes for the three synchronous operations the
//! service layer exposes. Transport is the caller's concern; these only
//! fix the JSON field names.

use serde::{Deserialize, Serialize};

use crate::parsing::{Warning, parse_markdown};
use crate::restore::restore;
use crate::stringify::stringify;
use crate::tree::Node;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseMarkdownRequest {
    pub markdown: String,
    /// Byte offset of the editor caret; orders warnings nearest-first.
    #[serde(default)]
    pub caret: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodesResponse {
    /// Top-level blocks of the document.
    pub nodes: Vec<Node>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreMarkdownNodesRequest {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringifyMarkdownNodesRequest {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringifyMarkdownNodesResponse {
    pub markdown: String,
}

pub fn parse_markdown_nodes(request: ParseMarkdownRequest) -> NodesResponse {
    let mut result = parse_markdown(&request.markdown);
    if let Some(caret) = request.caret {
        result.anchor_at(caret.min(request.markdown.len()));
    }
    NodesResponse {
        nodes: result.document.children,
        warnings: result.warnings,
    }
}

pub fn restore_markdown_nodes(request: RestoreMarkdownNodesRequest) -> NodesResponse {
    let result = restore(request.nodes);
    NodesResponse {
        nodes: result.document.children,
        warnings: result.warnings,
    }
}

pub fn stringify_markdown_nodes(
    request: StringifyMarkdownNodesRequest,
) -> StringifyMarkdownNodesResponse {
    StringifyMarkdownNodesResponse {
        markdown: stringify(&request.nodes),
    }
}
