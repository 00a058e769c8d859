//! Document tree with lifecycle reactions.
//!
//! The document plays the part of a host DOM: nodes live in an arena,
//! insertions follow DOM rules (fragments contribute their children, a
//! node moved elsewhere leaves its old place), and registered custom
//! elements get `connected` / `disconnected` reactions when they enter or
//! leave the tree rooted at the document node.

mod data;
mod debug_print;
mod markup;
mod node;
mod traverse;

use core::fmt;
use std::collections::VecDeque;

use crate::error::StructureError;
use crate::group::GroupArena;
use crate::registry::{self, ElementDefinition, LifecycleCallback};
use crate::tree::hierarchy::traverse::AncestorsTraverser;
use crate::tree::hierarchy::Hierarchy;
use crate::tree::{InsertAs, NodeId};

pub use self::data::{Content, Element, NodeData};
pub use self::debug_print::DebugPrint;
pub use self::node::Node;
pub use self::traverse::{Children, Descendants, DftEvent};

/// Pending lifecycle callback.
#[derive(Clone, Copy)]
struct Reaction {
    /// Element the reaction is for.
    node: NodeId,
    /// Callback to invoke.
    callback: LifecycleCallback,
}

impl fmt::Debug for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reaction").field("node", &self.node).finish_non_exhaustive()
    }
}

/// Document: an arena of nodes with one live root.
///
/// # Examples
///
/// ```
/// use nodegroup::Document;
///
/// let mut doc = Document::new();
/// let list = doc.create_element("ul");
/// doc.append(doc.root(), [list]).expect("a fresh element can be appended");
/// doc.append(list, ["one", "two"]).expect("text can be appended");
///
/// assert!(doc.is_connected(list));
/// assert_eq!(doc.text_content(list), "onetwo");
/// assert_eq!(doc.inner_html(doc.root()), "<ul>onetwo</ul>");
/// ```
#[derive(Debug)]
pub struct Document {
    /// Hierarchy.
    hierarchy: Hierarchy,
    /// Data.
    ///
    /// `None` is used for removed nodes.
    data: Vec<Option<NodeData>>,
    /// The document node.
    root: NodeId,
    /// Groups created in this document.
    pub(crate) groups: GroupArena,
    /// Reactions waiting to be dispatched.
    reactions: VecDeque<Reaction>,
    /// Whether reactions are being dispatched.
    dispatching: bool,
}

impl Document {
    /// Creates a document with only the document node.
    #[must_use]
    pub fn new() -> Self {
        let mut hierarchy = Hierarchy::default();
        let root = hierarchy.create_root();
        Self {
            hierarchy,
            data: vec![Some(NodeData::Document)],
            root,
            groups: GroupArena::default(),
            reactions: VecDeque::new(),
            dispatching: false,
        }
    }

    /// Returns the document node, the root of the live tree.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates a detached node.
    fn create_node(&mut self, data: NodeData) -> NodeId {
        let new_id = self.hierarchy.create_root();
        assert_eq!(
            self.data.len(),
            new_id.get(),
            "[consistency] node ID must be able to be used as an index for the vec"
        );
        self.data.push(Some(data));

        new_id
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node(NodeData::Element(Element::new(name)))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.create_node(NodeData::Text(text.into()))
    }

    /// Creates an empty fragment.
    pub fn create_fragment(&mut self) -> NodeId {
        self.create_node(NodeData::Fragment)
    }

    /// Removes a node from the arena, leaving its children as roots.
    /// Its ID becomes dead.
    pub(crate) fn release_node(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        let children = self.children(id).collect::<Vec<_>>();
        for child in children {
            self.hierarchy.detach(child);
        }
        self.hierarchy.remove(id);
        self.data[id.get()] = None;
    }

    /// Returns true if the node exists and is not yet removed.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.hierarchy.is_alive(id)
    }

    /// Returns a [proxy object][`Node`] to the node.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<Node<'_>> {
        Node::new(self, id)
    }

    /// Returns a reference to the data associated to the node.
    #[inline]
    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.data.get(id.get()).and_then(|entry| entry.as_ref())
    }

    /// Returns the attribute value of an element.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.data(id)?.as_element()?.attribute(name)
    }

    /// Sets an attribute of an element.
    ///
    /// # Errors
    ///
    /// * [`StructureError::DeadNode`] if the node is not alive.
    /// * [`StructureError::NotAnElement`] if the node is not an element.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), StructureError> {
        match self.data.get_mut(id.get()).and_then(Option::as_mut) {
            Some(NodeData::Element(element)) => {
                element.set_attribute(name, value);
                Ok(())
            }
            Some(_) => Err(StructureError::NotAnElement(id)),
            None => Err(StructureError::DeadNode(id)),
        }
    }

    /// Returns the parent of the node.
    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.hierarchy.parent(id)
    }

    /// Returns an iterator of the children of the node.
    ///
    /// The iterator is empty for dead nodes.
    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children::new(self, id)
    }

    /// Returns the number of children.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Returns a depth-first traversal of the node and its descendants.
    #[inline]
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants::new(self, id)
    }

    /// Returns true if the root of the node's tree is the document node.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let mut ancestors = AncestorsTraverser::with_start(id);
        let mut top = id;
        while let Some(ancestor) = ancestors.next(&self.hierarchy) {
            top = ancestor;
        }
        top == self.root
    }

    /// Returns the concatenated text of the node and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|ev| match ev {
                DftEvent::Open(node) => self.data(node).and_then(NodeData::as_text),
                DftEvent::Close(_) => None,
            })
            .collect()
    }

    /// Returns the markup of the children of the node.
    ///
    /// Elements defined as not rendered are omitted with their contents.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        markup::inner_html(self, id)
    }

    /// Returns a tree printer for the node and its descendants.
    #[must_use]
    pub fn debug_print(&self, id: NodeId) -> Option<DebugPrint<'_>> {
        self.is_alive(id).then(|| DebugPrint::new(self, id))
    }

    /// Detaches and inserts the given node to the target position.
    ///
    /// A fragment contributes its children instead of itself.
    ///
    /// # Errors
    ///
    /// * [`StructureError::DeadNode`]
    ///     + In case the node or the anchor of the destination is not alive.
    /// * [`StructureError::InvalidChild`]
    ///     + In case the node is the document node.
    /// * [`StructureError::NotAParent`]
    ///     + In case `dest` is `FirstChildOf(v)` or `LastChildOf(v)` and `v`
    ///       is a text node.
    /// * [`StructureError::AncestorDescendantLoop`]
    ///     + In case the destination is inside the node.
    /// * [`StructureError::UnorderableSiblings`]
    ///     + In case `dest` is `PreviousSiblingOf(node)` or `NextSiblingOf(node)`.
    /// * [`StructureError::SiblingsWithoutParent`]
    ///     + In case `dest` is `PreviousSiblingOf(v)` or `NextSiblingOf(v)`, and
    ///       `v` does not have a parent.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, node: NodeId, dest: InsertAs) -> Result<(), StructureError> {
        let result = self.insert_node(node, dest).map(|_| ());
        self.flush_reactions();
        result
    }

    /// Appends contents as the last children of `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`insert`][`Self::insert`]. Contents before the failing one
    /// stay inserted.
    #[tracing::instrument(level = "trace", skip(self, contents))]
    pub fn append<I>(&mut self, parent: NodeId, contents: I) -> Result<(), StructureError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let nodes = self.materialize(contents)?;
        let result = self.insert_sequence(InsertAs::LastChildOf(parent), &nodes);
        self.flush_reactions();
        result
    }

    /// Prepends contents as the first children of `parent`, keeping their order.
    ///
    /// # Errors
    ///
    /// Same as [`append`][`Self::append`].
    #[tracing::instrument(level = "trace", skip(self, contents))]
    pub fn prepend<I>(&mut self, parent: NodeId, contents: I) -> Result<(), StructureError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let nodes = self.materialize(contents)?;
        let result = self.insert_sequence(InsertAs::FirstChildOf(parent), &nodes);
        self.flush_reactions();
        result
    }

    /// Inserts contents right after `node`.
    ///
    /// Does nothing if `node` has no parent.
    ///
    /// # Errors
    ///
    /// Same as [`append`][`Self::append`].
    #[tracing::instrument(level = "trace", skip(self, contents))]
    pub fn after<I>(&mut self, node: NodeId, contents: I) -> Result<(), StructureError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        self.insert_beside(InsertAs::NextSiblingOf(node), contents)
    }

    /// Inserts contents right before `node`.
    ///
    /// Does nothing if `node` has no parent.
    ///
    /// # Errors
    ///
    /// Same as [`append`][`Self::append`].
    #[tracing::instrument(level = "trace", skip(self, contents))]
    pub fn before<I>(&mut self, node: NodeId, contents: I) -> Result<(), StructureError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        self.insert_beside(InsertAs::PreviousSiblingOf(node), contents)
    }

    /// Shared part of [`after`][`Self::after`] and [`before`][`Self::before`].
    fn insert_beside<I>(&mut self, dest: InsertAs, contents: I) -> Result<(), StructureError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let anchor = dest.anchor();
        if !self.is_alive(anchor) {
            return Err(StructureError::DeadNode(anchor));
        }
        if self.parent(anchor).is_none() {
            return Ok(());
        }
        let nodes = self.materialize(contents)?;
        let result = self.insert_sequence(dest, &nodes);
        self.flush_reactions();
        result
    }

    /// Detaches the node from its parent. The node stays alive as a root.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::DeadNode`] if the node is not alive.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn remove(&mut self, node: NodeId) -> Result<(), StructureError> {
        let result = self.detach_node(node);
        self.flush_reactions();
        result
    }

    /// Replaces all children of `parent` with the contents.
    ///
    /// # Errors
    ///
    /// Same as [`append`][`Self::append`]. Old children are removed before
    /// contents are inserted.
    #[tracing::instrument(level = "trace", skip(self, contents))]
    pub fn replace_children<I>(&mut self, parent: NodeId, contents: I) -> Result<(), StructureError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        self.check_parent(parent)?;
        let nodes = self.materialize(contents)?;
        let result = self.replace_children_with(parent, &nodes);
        self.flush_reactions();
        result
    }

    /// Detaches the children of `parent` and appends `nodes`.
    fn replace_children_with(&mut self, parent: NodeId, nodes: &[NodeId]) -> Result<(), StructureError> {
        let old = self.children(parent).collect::<Vec<_>>();
        for child in old {
            self.detach_node(child)?;
        }
        self.insert_sequence(InsertAs::LastChildOf(parent), nodes)
    }

    /// Sets the text of a text node, or replaces the children of an element
    /// or a fragment with a single text node.
    ///
    /// Setting the text content of the document node does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::DeadNode`] if the node is not alive.
    pub fn set_text_content(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), StructureError> {
        let text = text.into();
        match self.data.get_mut(id.get()).and_then(Option::as_mut) {
            None => return Err(StructureError::DeadNode(id)),
            Some(NodeData::Document) => return Ok(()),
            Some(NodeData::Text(old)) => {
                *old = text;
                return Ok(());
            }
            Some(NodeData::Element(_) | NodeData::Fragment) => {}
        }
        let nodes = if text.is_empty() {
            Vec::new()
        } else {
            vec![self.create_text(text)]
        };
        let result = self.replace_children_with(id, &nodes);
        self.flush_reactions();
        result
    }

    /// Returns an error if `parent` cannot have children.
    fn check_parent(&self, parent: NodeId) -> Result<(), StructureError> {
        match self.data(parent) {
            None => Err(StructureError::DeadNode(parent)),
            Some(NodeData::Text(_)) => Err(StructureError::NotAParent(parent)),
            Some(_) => Ok(()),
        }
    }

    /// Turns contents into nodes, creating text nodes as needed.
    ///
    /// A group resolves to its holding container. If the relay is parked
    /// outside the container (the group was inserted under a parent that is
    /// not connected), the group resolves to the relay followed by the
    /// members instead, so the whole group moves on.
    pub(crate) fn materialize<I>(&mut self, contents: I) -> Result<Vec<NodeId>, StructureError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let mut nodes = Vec::new();
        for content in contents {
            match content.into() {
                Content::Node(id) => nodes.push(id),
                Content::Text(text) => nodes.push(self.create_text(text)),
                Content::Group(group) => {
                    let state = self
                        .groups
                        .get(group)
                        .ok_or(StructureError::UnknownGroup(group))?;
                    if self.parent(state.relay()) == Some(state.container()) {
                        nodes.push(state.container());
                    } else {
                        nodes.push(state.relay());
                        nodes.extend(state.members().iter());
                    }
                }
            }
        }
        Ok(nodes)
    }

    /// Returns true if `ancestor` is `node` or one of its ancestors.
    pub(crate) fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.is_alive(node) {
            return false;
        }
        let mut ancestors = AncestorsTraverser::with_start(node);
        while let Some(current) = ancestors.next(&self.hierarchy) {
            if current == ancestor {
                return true;
            }
        }
        false
    }

    /// Inserts the nodes one after another, starting at `dest`.
    ///
    /// Reactions are queued but not dispatched.
    pub(crate) fn insert_sequence(&mut self, dest: InsertAs, nodes: &[NodeId]) -> Result<(), StructureError> {
        let mut dest = dest;
        for &node in nodes {
            if let Some(last) = self.insert_node(node, dest)? {
                dest = InsertAs::NextSiblingOf(last);
            }
        }
        Ok(())
    }

    /// Inserts the node (or the children of a fragment) and queues reactions.
    ///
    /// Returns the last node placed, or `None` for an empty fragment.
    /// Reactions are queued but not dispatched.
    pub(crate) fn insert_node(
        &mut self,
        node: NodeId,
        dest: InsertAs,
    ) -> Result<Option<NodeId>, StructureError> {
        let is_fragment = match self.data(node) {
            None => return Err(StructureError::DeadNode(node)),
            Some(NodeData::Document) => return Err(StructureError::InvalidChild(node)),
            Some(data) => matches!(data, NodeData::Fragment),
        };
        if let InsertAs::FirstChildOf(parent) | InsertAs::LastChildOf(parent) = dest {
            self.check_parent(parent)?;
        }

        let was_connected = self.is_connected(node);
        let placed = if is_fragment {
            self.hierarchy.insert_children(node, dest)?
        } else {
            self.hierarchy.insert(node, dest)?;
            Some((node, node))
        };

        Ok(placed.map(|(first, last)| {
            self.queue_reactions(first, last, was_connected);
            last
        }))
    }

    /// Detaches the node and queues reactions.
    ///
    /// Reactions are queued but not dispatched.
    pub(crate) fn detach_node(&mut self, node: NodeId) -> Result<(), StructureError> {
        if !self.is_alive(node) {
            return Err(StructureError::DeadNode(node));
        }
        let was_connected = self.is_connected(node);
        self.hierarchy.detach(node);
        self.queue_reactions(node, node, was_connected);
        Ok(())
    }

    /// Queues reactions for registered elements in the moved siblings
    /// `first..=last` and their descendants.
    ///
    /// `disconnected` reactions come before `connected` ones.
    fn queue_reactions(&mut self, first: NodeId, last: NodeId, was_connected: bool) {
        let is_connected = self.is_connected(first);
        if !was_connected && !is_connected {
            return;
        }

        let defined = self.defined_elements(first, last);
        if was_connected {
            self.reactions.extend(defined.iter().filter_map(|(node, definition)| {
                definition.disconnected.map(|callback| Reaction {
                    node: *node,
                    callback,
                })
            }));
        }
        if is_connected {
            self.reactions.extend(defined.iter().filter_map(|(node, definition)| {
                definition.connected.map(|callback| Reaction {
                    node: *node,
                    callback,
                })
            }));
        }
    }

    /// Returns the custom elements among `first..=last` and their
    /// descendants, in tree order.
    fn defined_elements(&self, first: NodeId, last: NodeId) -> Vec<(NodeId, ElementDefinition)> {
        let mut found = Vec::new();
        let mut toplevel = Some(first);
        while let Some(current) = toplevel {
            for ev in self.descendants(current) {
                let DftEvent::Open(node) = ev else { continue };
                let definition = self
                    .data(node)
                    .and_then(NodeData::as_element)
                    .filter(|element| element.name().contains('-'))
                    .and_then(|element| registry::get(element.name()));
                if let Some(definition) = definition {
                    found.push((node, definition));
                }
            }
            toplevel = if current == last {
                None
            } else {
                self.node(current).and_then(|node| node.next_sibling_id())
            };
        }
        found
    }

    /// Dispatches queued reactions.
    ///
    /// Reactions queued by callbacks are dispatched in the same loop, so
    /// this never recurses.
    pub(crate) fn flush_reactions(&mut self) {
        if self.dispatching {
            return;
        }
        self.dispatching = true;
        while let Some(reaction) = self.reactions.pop_front() {
            if self.is_alive(reaction.node) {
                (reaction.callback)(self, reaction.node);
            }
        }
        self.dispatching = false;
    }
}

impl Default for Document {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    static CONNECTED: AtomicUsize = AtomicUsize::new(0);
    static DISCONNECTED: AtomicUsize = AtomicUsize::new(0);

    fn count_connected(_: &mut Document, _: NodeId) {
        CONNECTED.fetch_add(1, Ordering::SeqCst);
    }

    fn count_disconnected(_: &mut Document, _: NodeId) {
        DISCONNECTED.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn fragments_contribute_their_children() {
        let mut doc = Document::new();
        let fragment = doc.create_fragment();
        doc.append(fragment, ["a", "b"]).expect("fragments accept children");
        let host = doc.create_element("div");
        doc.append(host, [fragment]).expect("fragments can be inserted");

        assert_eq!(doc.child_count(fragment), 0);
        assert_eq!(doc.text_content(host), "ab");
    }

    #[test]
    fn document_node_cannot_be_inserted() {
        let mut doc = Document::new();
        let host = doc.create_element("div");
        let root = doc.root();
        assert_eq!(
            doc.append(host, [root]),
            Err(StructureError::InvalidChild(root))
        );
    }

    #[test]
    fn text_nodes_have_no_children() {
        let mut doc = Document::new();
        let text = doc.create_text("x");
        assert_eq!(doc.append(text, ["y"]), Err(StructureError::NotAParent(text)));
    }

    #[test]
    fn siblings_of_a_detached_node_are_ignored() {
        let mut doc = Document::new();
        let lonely = doc.create_element("p");
        doc.after(lonely, ["x"]).expect("no-op without parent");
        doc.before(lonely, ["y"]).expect("no-op without parent");
        assert_eq!(doc.parent(lonely), None);
    }

    #[test]
    fn reactions_follow_connection_changes() {
        registry::define(
            "document-test-probe",
            ElementDefinition {
                connected: Some(count_connected),
                disconnected: Some(count_disconnected),
                rendered: true,
            },
        )
        .expect("valid name");

        let mut doc = Document::new();
        let outer = doc.create_element("section");
        let probe = doc.create_element("document-test-probe");
        doc.append(outer, [probe]).expect("fresh nodes");
        assert_eq!(CONNECTED.load(Ordering::SeqCst), 0, "outer is not connected yet");

        let root = doc.root();
        doc.append(root, [outer]).expect("fresh nodes");
        assert_eq!(CONNECTED.load(Ordering::SeqCst), 1);

        doc.remove(outer).expect("alive");
        assert_eq!(DISCONNECTED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn set_text_content_replaces_children() {
        let mut doc = Document::new();
        let host = doc.create_element("p");
        doc.append(host, ["a", "b"]).expect("fresh nodes");
        doc.set_text_content(host, "c").expect("alive");
        assert_eq!(doc.child_count(host), 1);
        assert_eq!(doc.text_content(host), "c");

        doc.set_text_content(host, "").expect("alive");
        assert_eq!(doc.child_count(host), 0);
    }
}
