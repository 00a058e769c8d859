//! Markup serialization.

use core::fmt::Write as _;

use crate::document::{DftEvent, Document, Element, NodeData};
use crate::registry;
use crate::tree::NodeId;

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Returns true if the element appears in markup.
fn is_rendered(element: &Element) -> bool {
    !element.name().contains('-')
        || registry::get(element.name()).map_or(true, |definition| definition.rendered)
}

/// Serializes the children of the node.
pub(super) fn inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let mut events = doc.descendants(id);
    while let Some(ev) = events.next() {
        match ev {
            DftEvent::Open(node) | DftEvent::Close(node) if node == id => {}
            DftEvent::Open(node) => match doc.data(node) {
                Some(NodeData::Text(text)) => escape(&mut out, text, false),
                Some(NodeData::Element(element)) if is_rendered(element) => {
                    out.push('<');
                    out.push_str(element.name());
                    for (name, value) in element.attributes() {
                        let _ = write!(out, " {}=\"", name);
                        escape(&mut out, value, true);
                        out.push('"');
                    }
                    out.push('>');
                }
                Some(NodeData::Element(_)) => events.skip_children(node),
                _ => {}
            },
            DftEvent::Close(node) => {
                if let Some(element) = doc.data(node).and_then(NodeData::as_element) {
                    if is_rendered(element) && !VOID_ELEMENTS.contains(&element.name()) {
                        let _ = write!(out, "</{}>", element.name());
                    }
                }
            }
        }
    }
    out
}

/// Appends the escaped text.
fn escape(out: &mut String, text: &str, in_attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !in_attribute => out.push_str("&lt;"),
            '>' if !in_attribute => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            '\u{A0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::document::Content;
    use crate::registry::ElementDefinition;

    #[test]
    fn text_and_attributes_are_escaped() {
        let mut doc = Document::new();
        let link = doc.create_element("a");
        doc.set_attribute(link, "title", "\"x\" & y").expect("element");
        doc.append(link, ["1 < 2"]).expect("fresh nodes");
        let root = doc.root();
        doc.append(root, [link]).expect("fresh nodes");

        assert_eq!(
            doc.inner_html(root),
            r#"<a title="&quot;x&quot; &amp; y">1 &lt; 2</a>"#
        );
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let br = doc.create_element("br");
        let contents: [Content; 3] = ["a".into(), br.into(), "b".into()];
        doc.append(p, contents).expect("fresh nodes");
        assert_eq!(doc.inner_html(p), "a<br>b");
    }

    #[test]
    fn hidden_elements_are_skipped() {
        registry::define(
            "markup-test-hidden",
            ElementDefinition {
                rendered: false,
                ..ElementDefinition::default()
            },
        )
        .expect("valid name");

        let mut doc = Document::new();
        let p = doc.create_element("p");
        let hidden = doc.create_element("markup-test-hidden");
        doc.append(hidden, ["secret"]).expect("fresh nodes");
        doc.append(p, [hidden]).expect("fresh nodes");
        doc.append(p, ["shown"]).expect("fresh nodes");
        assert_eq!(doc.inner_html(p), "shown");
    }
}
