//! Parent, child, and sibling links of the arena.

pub(crate) mod traverse;

use crate::error::StructureError;
use crate::tree::{InsertAs, NodeId};

use self::traverse::AncestorsTraverser;

/// Links of every node in an arena, without payloads.
#[derive(Debug, Clone, Default)]
pub(crate) struct Hierarchy {
    /// Links storage, indexed by node ID.
    links: Vec<Links>,
}

impl Hierarchy {
    /// Creates a new root node.
    ///
    /// # Panics
    ///
    /// Panics if the node ID overflows.
    pub(crate) fn create_root(&mut self) -> NodeId {
        let new_id = NodeId::from_usize(self.links.len())
            .expect("[precondition] node ID overflowed presumably due to too many node creations");
        self.links.push(Links::new_root(new_id));

        new_id
    }

    /// Returns the links of the node if the node is alive.
    #[must_use]
    pub(crate) fn links(&self, id: NodeId) -> Option<&Links> {
        self.links.get(id.get()).filter(|v| v.is_alive())
    }

    /// Returns the mutable links of the node if the node is alive.
    #[must_use]
    fn links_mut(&mut self, id: NodeId) -> Option<&mut Links> {
        self.links.get_mut(id.get()).filter(|v| v.is_alive())
    }

    /// Returns true if the node is alive.
    #[must_use]
    pub(crate) fn is_alive(&self, id: NodeId) -> bool {
        self.links(id).is_some()
    }

    /// Returns the parent of a live node.
    #[must_use]
    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.links(id).and_then(Links::parent)
    }

    /// Links `prev` and `next` as adjacent children of `parent`.
    ///
    /// ```text
    ///    parent
    ///     /  \
    ///    /    \
    /// prev -> next
    /// ```
    ///
    /// Either side may be `None`: a missing `prev` makes `next` the first
    /// child, and a missing `next` makes `prev` the last child. The cyclic
    /// previous-sibling link of the first child is kept pointing at the last
    /// child, so the last child must be connected after the others.
    ///
    /// # Panics
    ///
    /// * Panics if `parent` is `None` while both `prev` and `next` are `Some`.
    /// * Panics if `prev` and `next` are the same node.
    fn connect(&mut self, parent: Option<NodeId>, prev: Option<NodeId>, next: Option<NodeId>) {
        if parent.is_none() && prev.is_some() && next.is_some() {
            panic!("[precondition] nodes cannot have siblings without having a parent");
        }
        if prev.is_some() && prev == next {
            panic!("[precondition] a node cannot be adjacent sibling of itself");
        }

        if let Some(prev) = prev {
            let prev_links = self
                .links_mut(prev)
                .expect("[precondition] the given `prev` node must be alive");
            prev_links.parent = parent;
            prev_links.next_sibling = next;
        }

        if let Some(next) = next {
            let next_prev_cyclic = match (prev, parent) {
                (Some(prev), _) => prev,
                // `next` becomes the first child, so it points at the last child.
                (None, Some(parent)) => self
                    .links(parent)
                    .expect("[precondition] the given `parent` node must be alive")
                    .last_child(self)
                    .unwrap_or(next),
                // `next` is a root.
                (None, None) => next,
            };

            let next_links = self
                .links_mut(next)
                .expect("[precondition] the given `next` node must be alive");
            next_links.parent = parent;
            next_links.prev_sibling_cyclic = Some(next_prev_cyclic);
        }

        // The parent is updated last: the branch above needs its old last child.
        if let Some(parent) = parent {
            if prev.is_none() {
                self.links_mut(parent)
                    .expect("[precondition] the given `parent` node must be alive")
                    .first_child = next;
            } else if next.is_none() {
                let first_child = self
                    .links(parent)
                    .expect("[precondition] the given `parent` node must be alive")
                    .first_child()
                    .expect("[consistency] `parent` must have a child including `prev`");
                self.links_mut(first_child)
                    .expect("[consistency] the first child of `parent` must be alive")
                    .prev_sibling_cyclic = prev;
            }
        }
    }

    /// Unlinks the siblings range from its parent and siblings.
    ///
    /// The links of the range nodes themselves are left stale; the caller
    /// must relink or reset them.
    fn unlink_range(&mut self, range: SiblingsRange) {
        let first_links = self
            .links(range.first)
            .expect("[consistency] nodes in the range must be alive");
        let range_parent = first_links.parent();
        let prev = first_links.prev_sibling(self);
        let next = self
            .links(range.last)
            .expect("[consistency] nodes in the range must be alive")
            .next_sibling();

        self.connect(range_parent, prev, next);
    }

    /// Detaches the subtree rooted at `node`, making `node` a root.
    ///
    /// # Panics
    ///
    /// Panics if the node is not alive.
    pub(crate) fn detach(&mut self, node: NodeId) {
        let has_parent = self
            .links(node)
            .expect("[precondition] the node must be alive")
            .parent()
            .is_some();
        if !has_parent {
            return;
        }
        self.unlink_range(SiblingsRange::single(node));

        let links = self
            .links_mut(node)
            .expect("[precondition] the node must be alive");
        links.parent = None;
        links.next_sibling = None;
        links.prev_sibling_cyclic = Some(node);
    }

    /// Detaches and removes a childless node.
    ///
    /// # Panics
    ///
    /// Panics if the node is not alive or still has children.
    pub(crate) fn remove(&mut self, node: NodeId) {
        self.detach(node);
        let links = self
            .links_mut(node)
            .expect("[precondition] the node must be alive");
        if links.first_child.is_some() {
            panic!("[precondition] the node to remove must not have children");
        }
        *links = Links::removed();
    }

    /// Detaches `node` and inserts it to the target position.
    ///
    /// # Errors
    ///
    /// See [`insert_range`][`Self::insert_range`].
    pub(crate) fn insert(&mut self, node: NodeId, dest: InsertAs) -> Result<(), StructureError> {
        if !self.is_alive(node) {
            return Err(StructureError::DeadNode(node));
        }
        self.insert_range(SiblingsRange::single(node), dest)
    }

    /// Detaches the children of `parent` and inserts them, in order, to the
    /// target position.
    ///
    /// Returns the first and last moved nodes, or `None` if `parent` had no
    /// children.
    ///
    /// # Errors
    ///
    /// See [`insert_range`][`Self::insert_range`].
    pub(crate) fn insert_children(
        &mut self,
        parent: NodeId,
        dest: InsertAs,
    ) -> Result<Option<(NodeId, NodeId)>, StructureError> {
        let (first, last) = match self
            .links(parent)
            .ok_or(StructureError::DeadNode(parent))?
            .first_last_child(self)
        {
            Some(v) => v,
            None => return Ok(None),
        };
        self.insert_range(SiblingsRange { first, last }, dest)?;

        Ok(Some((first, last)))
    }

    /// Detaches the siblings range and inserts it to the target position.
    ///
    /// Nothing is modified when an error is returned.
    ///
    /// # Errors
    ///
    /// * [`StructureError::DeadNode`]
    ///     + In case the anchor of `dest` is not alive.
    /// * [`StructureError::AncestorDescendantLoop`]
    ///     + In case the new parent is a node in the range or a descendant of one.
    /// * [`StructureError::UnorderableSiblings`]
    ///     + In case `dest` is `PreviousSiblingOf(v)` or `NextSiblingOf(v)`
    ///       and `v` is in the range.
    /// * [`StructureError::SiblingsWithoutParent`]
    ///     + In case `dest` is `PreviousSiblingOf(v)` or `NextSiblingOf(v)`,
    ///       and `v` does not have a parent.
    fn insert_range(&mut self, range: SiblingsRange, dest: InsertAs) -> Result<(), StructureError> {
        let anchor = dest.anchor();
        let anchor_links = self.links(anchor).ok_or(StructureError::DeadNode(anchor))?;
        let nodes = range.nodes(self);

        let new_parent = match dest {
            InsertAs::FirstChildOf(parent) | InsertAs::LastChildOf(parent) => parent,
            InsertAs::PreviousSiblingOf(sibling) | InsertAs::NextSiblingOf(sibling) => {
                if nodes.contains(&sibling) {
                    return Err(StructureError::UnorderableSiblings);
                }
                anchor_links
                    .parent()
                    .ok_or(StructureError::SiblingsWithoutParent)?
            }
        };
        let mut ancestors = AncestorsTraverser::with_start(new_parent);
        while let Some(ancestor) = ancestors.next(self) {
            if nodes.contains(&ancestor) {
                return Err(StructureError::AncestorDescendantLoop);
            }
        }

        self.unlink_range(range);

        // Neighbors are resolved after unlinking, since the range may have
        // been adjacent to the anchor.
        let (prev, next) = {
            let links = self
                .links(anchor)
                .expect("[consistency] the anchor has been checked to be alive");
            match dest {
                InsertAs::FirstChildOf(_) => (None, links.first_child()),
                InsertAs::LastChildOf(_) => (links.last_child(self), None),
                InsertAs::PreviousSiblingOf(_) => (links.prev_sibling(self), Some(anchor)),
                InsertAs::NextSiblingOf(_) => (Some(anchor), links.next_sibling()),
            }
        };

        for node in &nodes {
            self.links_mut(*node)
                .expect("[consistency] nodes in the range must be alive")
                .parent = Some(new_parent);
        }
        self.connect(Some(new_parent), prev, Some(range.first));
        self.connect(Some(new_parent), Some(range.last), next);

        Ok(())
    }
}

/// Links of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Links {
    /// Parent.
    parent: Option<NodeId>,
    /// Cyclic previous sibling.
    ///
    /// `None` if the node has been removed.
    /// For the first sibling, this is the last sibling (or the node itself
    /// when it has no siblings); otherwise the previous sibling. This makes
    /// a separate "last child" link unnecessary.
    prev_sibling_cyclic: Option<NodeId>,
    /// Next sibling.
    next_sibling: Option<NodeId>,
    /// First child.
    first_child: Option<NodeId>,
}

impl Links {
    /// Creates links for a node that is not connected to anyone.
    #[inline]
    #[must_use]
    fn new_root(id: NodeId) -> Self {
        Self {
            parent: None,
            prev_sibling_cyclic: Some(id),
            next_sibling: None,
            first_child: None,
        }
    }

    /// Creates links for a removed node.
    #[inline]
    #[must_use]
    fn removed() -> Self {
        Self {
            parent: None,
            prev_sibling_cyclic: None,
            next_sibling: None,
            first_child: None,
        }
    }

    /// Returns true if the node is alive.
    #[inline]
    #[must_use]
    fn is_alive(&self) -> bool {
        self.prev_sibling_cyclic.is_some()
    }

    /// Returns the node ID of the parent.
    #[inline]
    #[must_use]
    pub(crate) fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the node ID of the next sibling.
    #[inline]
    #[must_use]
    pub(crate) fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }

    /// Returns the node ID of the previous sibling.
    #[must_use]
    pub(crate) fn prev_sibling(&self, hier: &Hierarchy) -> Option<NodeId> {
        let prev_cyclic = self
            .prev_sibling_cyclic
            .expect("[consistency] links are only handed out for live nodes");
        // A cyclic link from the first sibling points at the last sibling,
        // which is recognizable by having no next sibling.
        hier.links(prev_cyclic)
            .expect("[consistency] the `prev_sibling_cyclic` node must be alive")
            .next_sibling
            .and(Some(prev_cyclic))
    }

    /// Returns the node ID of the first child.
    #[inline]
    #[must_use]
    pub(crate) fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    /// Returns the node ID of the last child.
    #[must_use]
    pub(crate) fn last_child(&self, hier: &Hierarchy) -> Option<NodeId> {
        self.first_last_child(hier).map(|(_first, last)| last)
    }

    /// Returns the node IDs of the first child and the last child.
    #[must_use]
    pub(crate) fn first_last_child(&self, hier: &Hierarchy) -> Option<(NodeId, NodeId)> {
        let first_child = self.first_child?;
        let last_child = hier
            .links(first_child)
            .expect("[consistency] children of a live node must also be alive")
            .prev_sibling_cyclic
            .expect("[consistency] the last child must be alive");

        Some((first_child, last_child))
    }
}

/// Contiguous siblings, from `first` to `last` inclusive.
#[derive(Debug, Clone, Copy)]
struct SiblingsRange {
    /// First node in the range.
    first: NodeId,
    /// Last node in the range.
    last: NodeId,
}

impl SiblingsRange {
    /// Creates a range of a single node.
    #[inline]
    #[must_use]
    fn single(node: NodeId) -> Self {
        Self {
            first: node,
            last: node,
        }
    }

    /// Returns the toplevel nodes in the range.
    #[must_use]
    fn nodes(self, hier: &Hierarchy) -> Vec<NodeId> {
        let mut nodes = vec![self.first];
        let mut current = self.first;
        while current != self.last {
            current = hier
                .links(current)
                .and_then(Links::next_sibling)
                .expect("[consistency] `last` must follow `first` as a sibling");
            nodes.push(current);
        }
        nodes
    }
}
