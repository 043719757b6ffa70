use serde::Serialize;

use super::{Node, NodeKind};

/// Which construct a link reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
    Link,
    Image,
    Autolink,
}

/// A destination URL found in the tree, with the identifier of the node
/// that owns it. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReference {
    pub url: String,
    pub kind: LinkKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Collects every link, image and autolink destination in reading order.
pub fn links(root: &Node) -> Vec<LinkReference> {
    let mut out = vec![];
    root.walk(&mut |node| {
        let (url, kind) = match &node.kind {
            NodeKind::Link { destination, .. } => (destination, LinkKind::Link),
            NodeKind::Image { destination, .. } => (destination, LinkKind::Image),
            NodeKind::Autolink { url } => (url, LinkKind::Autolink),
            _ => return,
        };
        if url.is_empty() {
            return;
        }
        out.push(LinkReference {
            url: url.clone(),
            kind,
            node_id: node.id.clone(),
        });
    });
    out
}
