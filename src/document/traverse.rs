//! Tree traversal.

use core::iter;

use crate::document::Document;
use crate::tree::hierarchy::traverse::{
    DepthFirstTraverser, DftEvent as DftEventSrc, SiblingsTraverser,
};
use crate::tree::NodeId;

/// Depth-first traversal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DftEvent<T> {
    /// Node open.
    Open(T),
    /// Node close.
    Close(T),
}

impl<T> DftEvent<T> {
    /// Converts the internal value.
    pub fn map<F, U>(self, f: F) -> DftEvent<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Open(v) => DftEvent::Open(f(v)),
            Self::Close(v) => DftEvent::Close(f(v)),
        }
    }

    /// Returns the internal value.
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            Self::Open(v) | Self::Close(v) => v,
        }
    }
}

impl From<DftEventSrc> for DftEvent<NodeId> {
    #[inline]
    fn from(ev: DftEventSrc) -> Self {
        match ev {
            DftEventSrc::Open(id) => Self::Open(id),
            DftEventSrc::Close(id) => Self::Close(id),
        }
    }
}

/// Iterator for depth-first traversal.
///
/// The toplevel node is opened first and closed last.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    /// Document.
    doc: &'a Document,
    /// Traverser. `None` if the toplevel is not alive.
    traverser: Option<DepthFirstTraverser>,
}

impl<'a> Descendants<'a> {
    /// Creates a new iterator.
    #[must_use]
    pub(super) fn new(doc: &'a Document, toplevel: NodeId) -> Self {
        Self {
            doc,
            traverser: doc
                .is_alive(toplevel)
                .then(|| DepthFirstTraverser::with_toplevel(toplevel)),
        }
    }

    /// Skips the descendants of the node just opened.
    ///
    /// The next event will be the close event of `opened`.
    pub fn skip_children(&mut self, opened: NodeId) {
        if let Some(traverser) = &mut self.traverser {
            traverser.skip_children(opened);
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = DftEvent<NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        let ev = self.traverser.as_mut()?.next(&self.doc.hierarchy);
        ev.map(Into::into)
    }
}

impl iter::FusedIterator for Descendants<'_> {}

/// Double-ended iterator of the children of a node.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    /// Document.
    doc: &'a Document,
    /// Traverser.
    traverser: SiblingsTraverser,
}

impl<'a> Children<'a> {
    /// Creates a new iterator.
    #[must_use]
    pub(super) fn new(doc: &'a Document, parent: NodeId) -> Self {
        Self {
            doc,
            traverser: SiblingsTraverser::with_parent(parent, &doc.hierarchy),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.traverser.next(&self.doc.hierarchy)
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.traverser.next_back(&self.doc.hierarchy)
    }
}

impl iter::FusedIterator for Children<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn depth_first_order() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        let text = doc.create_text("t");
        doc.append(inner, [text]).expect("fresh nodes");
        doc.append(outer, [inner]).expect("fresh nodes");

        let events = doc.descendants(outer).collect::<Vec<_>>();
        assert_eq!(
            events,
            [
                DftEvent::Open(outer),
                DftEvent::Open(inner),
                DftEvent::Open(text),
                DftEvent::Close(text),
                DftEvent::Close(inner),
                DftEvent::Close(outer),
            ]
        );
    }

    #[test]
    fn skipped_children_are_not_visited() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append(inner, ["hidden"]).expect("fresh nodes");
        doc.append(outer, [inner]).expect("fresh nodes");

        let mut events = doc.descendants(outer);
        let mut opened = Vec::new();
        while let Some(ev) = events.next() {
            if let DftEvent::Open(node) = ev {
                opened.push(node);
                if node == inner {
                    events.skip_children(node);
                }
            }
        }
        assert_eq!(opened, [outer, inner]);
    }

    #[test]
    fn children_from_both_ends() {
        let mut doc = Document::new();
        let parent = doc.create_element("p");
        doc.append(parent, ["a", "b", "c"]).expect("fresh nodes");

        let mut children = doc.children(parent);
        let a = children.next();
        let c = children.next_back();
        let b = children.next();
        assert_eq!(children.next(), None);
        assert_eq!(children.next_back(), None);

        let texts = [a, b, c]
            .iter()
            .map(|id| id.and_then(|id| doc.data(id)).and_then(|d| d.as_text()))
            .collect::<Vec<_>>();
        assert_eq!(texts, [Some("a"), Some("b"), Some("c")]);
    }
}
