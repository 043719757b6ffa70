//! Metadata extraction from fetched HTML.
//!
//! The body is parsed into a DOM with html5ever, which never fails: absent
//! or malformed markup leaves the corresponding field empty. Script and style
//! bodies and comments are not markup, so tags written inside them are not
//! seen.

use html5ever::tendril::TendrilSink;
use html5ever::{Attribute, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use url::Url;

use crate::LinkMetadata;

/// Metadata keys in priority order per field.
const TITLE_KEYS: &[&str] = &["og:title", "twitter:title"];
const DESCRIPTION_KEYS: &[&str] = &["og:description", "twitter:description", "description"];
const IMAGE_KEYS: &[&str] = &["og:image", "og:image:url", "twitter:image"];

/// The `<title>` text and `(property-or-name, content)` meta pairs, in
/// document order.
#[derive(Default)]
struct Head {
    title: Option<String>,
    metas: Vec<(String, String)>,
}

/// Extracts title, description and preview image from an HTML body.
/// Relative image URLs resolve against `page`.
pub fn scan(body: &str, page: &Url) -> LinkMetadata {
    let dom = parse_document(RcDom::default(), Default::default()).one(body);
    let mut head = Head::default();
    collect(&dom.document, &mut head);

    let lookup = |keys: &[&str]| {
        keys.iter().find_map(|key| {
            head.metas
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|(_, content)| content.clone())
        })
    };

    let title = lookup(TITLE_KEYS).or_else(|| head.title.clone());
    let description = lookup(DESCRIPTION_KEYS);
    let image_url = lookup(IMAGE_KEYS).and_then(|src| match page.join(&src) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            log::debug!("ignoring preview image {src:?}: {e}");
            None
        }
    });

    LinkMetadata {
        url: page.to_string(),
        title,
        description,
        image_url,
    }
}

fn collect(handle: &Handle, head: &mut Head) {
    if let NodeData::Element { name, attrs, .. } = &handle.data {
        match name.local.as_ref() {
            "title" if head.title.is_none() => {
                let title = clean(&element_text(handle));
                if !title.is_empty() {
                    head.title = Some(title);
                }
            }
            "meta" => {
                let attrs = attrs.borrow();
                let key = get_attr(&attrs, "property").or_else(|| get_attr(&attrs, "name"));
                if let Some(key) = key
                    && let Some(content) = get_attr(&attrs, "content").map(|c| clean(&c))
                    && !content.is_empty()
                {
                    head.metas.push((key.trim().to_string(), content));
                }
            }
            "script" | "style" => return,
            _ => {}
        }
    }

    for child in handle.children.borrow().iter() {
        collect(child, head);
    }
}

fn element_text(handle: &Handle) -> String {
    let mut text = String::new();
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => text.push_str(&contents.borrow()),
            _ => text.push_str(&element_text(child)),
        }
    }
    text
}

fn get_attr(attrs: &[Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|a| a.name.local.as_ref() == name)
        .map(|a| a.value.to_string())
}

/// Collapses whitespace runs to single spaces.
fn clean(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page() -> Url {
        Url::parse("https://example.test/posts/1").unwrap()
    }

    #[test]
    fn title_element() {
        let meta = scan("<html><head><title>Example</title></head></html>", &page());
        assert_eq!(meta.title.as_deref(), Some("Example"));
        assert_eq!(meta.description, None);
        assert_eq!(meta.image_url, None);
    }

    #[test]
    fn open_graph_wins_over_title() {
        let html = r#"
            <title>Plain</title>
            <meta name="twitter:title" content="Twitter">
            <meta property="og:title" content="Graph &amp; Co">
            <meta name="description" content="  spread
                over lines ">
        "#;
        let meta = scan(html, &page());
        assert_eq!(meta.title.as_deref(), Some("Graph & Co"));
        assert_eq!(meta.description.as_deref(), Some("spread over lines"));
    }

    #[test]
    fn attribute_order_and_quotes_vary() {
        let html = "<META content='Desc' property=og:description />";
        assert_eq!(scan(html, &page()).description.as_deref(), Some("Desc"));
    }

    #[test]
    fn angle_bracket_inside_content_is_kept() {
        let html = r#"<meta property="og:description" content="a > b < c"><title>T</title>"#;
        let meta = scan(html, &page());
        assert_eq!(meta.description.as_deref(), Some("a > b < c"));
        assert_eq!(meta.title.as_deref(), Some("T"));
    }

    #[test]
    fn tags_in_scripts_and_comments_are_not_markup() {
        let html = r#"
            <script>document.write("<title>Fake</title>");</script>
            <!-- <title>Old</title> <meta property="og:title" content="Old"> -->
            <title>Real</title>
        "#;
        assert_eq!(scan(html, &page()).title.as_deref(), Some("Real"));
    }

    #[test]
    fn relative_image_resolves_against_page() {
        let html = r#"<meta property="og:image" content="../img/cover.png">"#;
        assert_eq!(
            scan(html, &page()).image_url.as_deref(),
            Some("https://example.test/img/cover.png")
        );
    }

    #[test]
    fn incomplete_tags_yield_empty_fields() {
        let html = r#"<meta property="og:title"><meta content="orphan"><title> </title>"#;
        assert_eq!(
            scan(html, &page()),
            LinkMetadata {
                url: "https://example.test/posts/1".into(),
                title: None,
                description: None,
                image_url: None,
            }
        );
    }

    #[test]
    fn truncated_body_still_scans() {
        let meta = scan("<title>cut off <meta property=", &page());
        assert_eq!(meta.title.as_deref(), Some("cut off <meta property="));
        assert_eq!(meta.description, None);
    }
}
