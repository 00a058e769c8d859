//! Node payloads.

use core::fmt;

use indexmap::IndexMap;

use crate::group::GroupId;
use crate::tree::NodeId;

/// Data associated to a document node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeData {
    /// The document node, root of the live tree.
    Document,
    /// Element.
    Element(Element),
    /// Text.
    Text(String),
    /// Fragment. Inserting it moves its children instead.
    Fragment,
}

impl NodeData {
    /// Returns the element if the node is an element.
    #[inline]
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the text if the node is a text node.
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns true if the node can be placed as a child of another node.
    #[inline]
    #[must_use]
    pub fn is_child_node(&self) -> bool {
        matches!(self, Self::Element(_) | Self::Text(_))
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => f.write_str("#document"),
            Self::Fragment => f.write_str("#fragment"),
            Self::Text(text) => write!(f, "{:?}", text),
            Self::Element(element) => element.fmt(f),
        }
    }
}

/// Element payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    /// Local name.
    name: String,
    /// Attributes in insertion order.
    attributes: IndexMap<String, String>,
}

impl Element {
    /// Creates an element without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Returns the local name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attribute value.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Sets the attribute value, keeping the position of an existing attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Returns an iterator of attribute name-value pairs in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (name, value) in self.attributes() {
            write!(f, " {}={:?}", name, value)?;
        }
        f.write_str(">")
    }
}

/// Something that can be inserted into a tree.
///
/// Strings become new text nodes; a group contributes its holding container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Existing node.
    Node(NodeId),
    /// Text to be materialized as a new text node.
    Text(String),
    /// Group.
    Group(GroupId),
}

impl From<NodeId> for Content {
    #[inline]
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<GroupId> for Content {
    #[inline]
    fn from(id: GroupId) -> Self {
        Self::Group(id)
    }
}

impl From<&str> for Content {
    #[inline]
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Content {
    #[inline]
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_display_keeps_attribute_order() {
        let mut element = Element::new("input");
        element.set_attribute("name", "q");
        element.set_attribute("id", "search");
        element.set_attribute("name", "query");
        assert_eq!(element.to_string(), r#"<input name="query" id="search">"#);
    }

    #[test]
    fn only_elements_and_texts_are_child_nodes() {
        assert!(NodeData::Text("x".into()).is_child_node());
        assert!(NodeData::Element(Element::new("p")).is_child_node());
        assert!(!NodeData::Fragment.is_child_node());
        assert!(!NodeData::Document.is_child_node());
    }
}
