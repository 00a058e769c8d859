//! Live views of group members.

use core::ops;

use crate::document::{Document, NodeData};
use crate::ordered::OrderedIndex;
use crate::tree::NodeId;

/// All members of a group, in index order.
#[derive(Debug, Clone, Copy)]
pub struct NodeList<'a> {
    /// Members.
    members: &'a OrderedIndex<NodeId>,
}

impl<'a> NodeList<'a> {
    /// Creates a view.
    #[inline]
    #[must_use]
    pub(super) fn new(members: &'a OrderedIndex<NodeId>) -> Self {
        Self { members }
    }

    /// Returns the number of members.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if there are no members.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns the member at the position.
    #[inline]
    #[must_use]
    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.members.get(index)
    }

    /// Returns an iterator of the members.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator + 'a {
        self.members.iter()
    }
}

impl ops::Index<usize> for NodeList<'_> {
    type Output = NodeId;

    #[inline]
    fn index(&self, index: usize) -> &NodeId {
        &self.members[index]
    }
}

/// Element members of a group, in index order.
#[derive(Debug, Clone, Copy)]
pub struct ElementCollection<'a> {
    /// Document.
    doc: &'a Document,
    /// Members.
    members: &'a OrderedIndex<NodeId>,
}

impl<'a> ElementCollection<'a> {
    /// Creates a view.
    #[inline]
    #[must_use]
    pub(super) fn new(doc: &'a Document, members: &'a OrderedIndex<NodeId>) -> Self {
        Self { doc, members }
    }

    /// Returns an iterator of the element members.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + 'a {
        let doc = self.doc;
        self.members
            .iter()
            .filter(move |&id| matches!(doc.data(id), Some(NodeData::Element(_))))
    }

    /// Returns the number of element members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if no member is an element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Returns the element at the position among element members.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<NodeId> {
        self.iter().nth(index)
    }

    /// Returns the first element whose key equals `name`.
    ///
    /// The key is the non-empty `name` attribute, or else the `id` attribute.
    #[must_use]
    pub fn named_item(&self, name: &str) -> Option<NodeId> {
        let doc = self.doc;
        self.iter().find(|&id| {
            let Some(element) = doc.data(id).and_then(NodeData::as_element) else {
                return false;
            };
            let key = element
                .attribute("name")
                .filter(|v| !v.is_empty())
                .or_else(|| element.attribute("id"));
            key == Some(name)
        })
    }
}
