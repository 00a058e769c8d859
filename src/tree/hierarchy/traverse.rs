//! Tree traversal over bare links.
//!
//! Traversers hold no borrow; the hierarchy is passed to every step, so
//! wrappers can pair them with whatever owns the hierarchy.

use crate::tree::hierarchy::{Hierarchy, Links};
use crate::tree::NodeId;

/// Depth-first traversal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DftEvent {
    /// Node open.
    Open(NodeId),
    /// Node close.
    Close(NodeId),
}

/// Forward depth-first tree traverser.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DepthFirstTraverser {
    /// Toplevel node of the traversal.
    toplevel: NodeId,
    /// Next event to emit.
    next: Option<DftEvent>,
}

impl DepthFirstTraverser {
    /// Creates a traverser from a toplevel node.
    ///
    /// The toplevel does not need to be the root of a tree.
    #[must_use]
    pub(crate) fn with_toplevel(id: NodeId) -> Self {
        Self {
            toplevel: id,
            next: Some(DftEvent::Open(id)),
        }
    }

    /// Traverses the tree forward and returns the next node event.
    pub(crate) fn next(&mut self, hier: &Hierarchy) -> Option<DftEvent> {
        let next = self.next?;
        self.next = self.successor(next, hier);
        Some(next)
    }

    /// Skips the descendants of the node most recently opened.
    ///
    /// The next event will be the close event of that node.
    pub(crate) fn skip_children(&mut self, opened: NodeId) {
        self.next = Some(DftEvent::Close(opened));
    }

    /// Returns the event following `ev`.
    fn successor(&self, ev: DftEvent, hier: &Hierarchy) -> Option<DftEvent> {
        match ev {
            DftEvent::Open(id) => {
                // Dive into the first child if available, or leave the node.
                let links = hier
                    .links(id)
                    .expect("[consistency] the node being traversed must be alive");
                Some(match links.first_child() {
                    Some(first_child) => DftEvent::Open(first_child),
                    None => DftEvent::Close(id),
                })
            }
            DftEvent::Close(id) if id == self.toplevel => None,
            DftEvent::Close(id) => {
                // Dive into the next sibling if available, or leave the parent.
                let links = hier
                    .links(id)
                    .expect("[consistency] the node being traversed must be alive");
                Some(match links.next_sibling() {
                    Some(next_sibling) => DftEvent::Open(next_sibling),
                    None => DftEvent::Close(links.parent().expect(
                        "[consistency] parent node must exist since the node is not the toplevel",
                    )),
                })
            }
        }
    }
}

/// Ancestors traverser.
///
/// Note that this returns the starting node first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AncestorsTraverser {
    /// Next node to emit.
    next: Option<NodeId>,
}

impl AncestorsTraverser {
    /// Creates a traverser from the node.
    #[inline]
    #[must_use]
    pub(crate) fn with_start(id: NodeId) -> Self {
        Self { next: Some(id) }
    }

    /// Returns the next ancestor.
    pub(crate) fn next(&mut self, hier: &Hierarchy) -> Option<NodeId> {
        let next = self.next?;
        self.next = hier
            .links(next)
            .expect("[consistency] the node being traversed must be alive")
            .parent();

        Some(next)
    }
}

/// Double-ended traverser over the children of a node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SiblingsTraverser {
    /// Next nodes to emit forward and backward.
    next: Option<(NodeId, NodeId)>,
}

impl SiblingsTraverser {
    /// Creates a traverser over the children of `parent`.
    #[inline]
    #[must_use]
    pub(crate) fn with_parent(parent: NodeId, hier: &Hierarchy) -> Self {
        Self {
            next: hier
                .links(parent)
                .and_then(|links| links.first_last_child(hier)),
        }
    }

    /// Traverses the siblings forward.
    pub(crate) fn next(&mut self, hier: &Hierarchy) -> Option<NodeId> {
        let (next, next_back) = self.next?;
        self.next = if next == next_back {
            None
        } else {
            hier.links(next)
                .and_then(Links::next_sibling)
                .map(|following| (following, next_back))
        };
        Some(next)
    }

    /// Traverses the siblings backward.
    pub(crate) fn next_back(&mut self, hier: &Hierarchy) -> Option<NodeId> {
        let (next, next_back) = self.next?;
        self.next = if next == next_back {
            None
        } else {
            hier.links(next_back)
                .and_then(|links| links.prev_sibling(hier))
                .map(|preceding| (next, preceding))
        };
        Some(next_back)
    }
}
