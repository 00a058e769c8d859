//! Node.

use crate::document::{Children, Descendants, Document, NodeData};
use crate::tree::hierarchy::Links;
use crate::tree::NodeId;

/// Immutable reference to a node.
///
/// This type guarantees that the node ID must be present in the internal
/// storage of the document and must not be removed yet.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    /// Document.
    doc: &'a Document,
    /// Node ID.
    id: NodeId,
}

impl<'a> Node<'a> {
    /// Creates a new `Node` object.
    #[must_use]
    pub(super) fn new(doc: &'a Document, id: NodeId) -> Option<Self> {
        if !doc.is_alive(id) {
            return None;
        }
        Some(Self { doc, id })
    }

    /// Returns the links of the node.
    fn links(&self) -> &'a Links {
        self.doc
            .hierarchy
            .links(self.id)
            .expect("[validity] the node has been checked to be alive")
    }

    /// Returns the node ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns a reference to the data associated to the node.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &'a NodeData {
        self.doc
            .data(self.id)
            .expect("[validity] the node has been checked to be alive")
    }

    /// Returns the node ID of the parent.
    #[inline]
    #[must_use]
    pub fn parent_id(&self) -> Option<NodeId> {
        self.links().parent()
    }

    /// Returns the node ID of the next sibling.
    #[inline]
    #[must_use]
    pub fn next_sibling_id(&self) -> Option<NodeId> {
        self.links().next_sibling()
    }

    /// Returns the node ID of the previous sibling.
    #[inline]
    #[must_use]
    pub fn prev_sibling_id(&self) -> Option<NodeId> {
        self.links().prev_sibling(&self.doc.hierarchy)
    }

    /// Returns the node ID of the first child.
    #[inline]
    #[must_use]
    pub fn first_child_id(&self) -> Option<NodeId> {
        self.links().first_child()
    }

    /// Returns the node ID of the last child.
    #[inline]
    #[must_use]
    pub fn last_child_id(&self) -> Option<NodeId> {
        self.links().last_child(&self.doc.hierarchy)
    }

    /// Returns the parent node.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.parent_id()
            .map(|id| Self::new(self.doc, id).expect("[consistency] the parent must be alive"))
    }

    /// Returns the next sibling node.
    #[must_use]
    pub fn next_sibling(&self) -> Option<Self> {
        self.next_sibling_id().map(|id| {
            Self::new(self.doc, id).expect("[consistency] the next sibling must be alive")
        })
    }

    /// Returns the previous sibling node.
    #[must_use]
    pub fn prev_sibling(&self) -> Option<Self> {
        self.prev_sibling_id().map(|id| {
            Self::new(self.doc, id).expect("[consistency] the previous sibling must be alive")
        })
    }

    /// Returns the first child node.
    #[must_use]
    pub fn first_child(&self) -> Option<Self> {
        self.first_child_id().map(|id| {
            Self::new(self.doc, id).expect("[consistency] the first child must be alive")
        })
    }

    /// Returns the last child node.
    #[must_use]
    pub fn last_child(&self) -> Option<Self> {
        self.last_child_id().map(|id| {
            Self::new(self.doc, id).expect("[consistency] the last child must be alive")
        })
    }

    /// Returns an iterator of the children.
    #[inline]
    #[must_use]
    pub fn children(&self) -> Children<'a> {
        self.doc.children(self.id)
    }

    /// Returns a depth-first traversal of the node and its descendants.
    #[inline]
    #[must_use]
    pub fn descendants(&self) -> Descendants<'a> {
        self.doc.descendants(self.id)
    }

    /// Returns true if the node is in the tree rooted at the document node.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.doc.is_connected(self.id)
    }
}
