//! Groups: movable, order-preserving sets of sibling nodes.
//!
//! A group tracks its members in an [`OrderedIndex`] and keeps them next to
//! each other in the tree. Inserting the group (as [`Content::Group`])
//! somewhere moves every member there, in index order, and takes them away
//! from wherever they were before.
//!
//! Internally a group owns a fragment, the holding container, whose first
//! child is a hidden relay element. Inserting the group moves the relay;
//! the relay's `connected` reaction places the members right after it and
//! then returns the relay to the container.
//!
//! Mutations come in two forms. The plain form is permissive: items that
//! cannot be applied are skipped and logged at `debug`. The `try_*` form
//! validates everything first and returns the first [`GroupError`] without
//! modifying anything.

mod collection;
mod id;
mod options;
mod relay;

use std::collections::{HashMap, HashSet};

use crate::document::{Content, Document};
use crate::error::{GroupError, StructureError};
use crate::ordered::{OrderedIndex, Rejection};
use crate::tree::{InsertAs, NodeId};

pub use self::collection::{ElementCollection, NodeList};
pub use self::id::GroupId;
pub use self::options::{GroupOptions, Mirroring};
pub(crate) use self::relay::RELAY_NAME;

/// Groups of a document.
///
/// Membership changes go through the arena so that the member owners stay
/// in sync with the member indices.
#[derive(Debug, Default)]
pub(crate) struct GroupArena {
    /// Group states. `None` is used for released groups.
    slots: Vec<Option<GroupState>>,
    /// Relay element to the group owning it.
    relay_owners: HashMap<NodeId, GroupId>,
    /// Member to the group tracking it.
    member_owners: HashMap<NodeId, GroupId>,
}

impl GroupArena {
    /// Stores a new group.
    fn insert(&mut self, state: GroupState) -> GroupId {
        let id = GroupId::from_usize(self.slots.len())
            .expect("[consistency] every group owns nodes, so groups cannot outnumber node IDs");
        self.relay_owners.insert(state.relay, id);
        self.slots.push(Some(state));
        id
    }

    /// Returns the group state.
    #[inline]
    pub(crate) fn get(&self, id: GroupId) -> Option<&GroupState> {
        self.slots.get(id.get()).and_then(Option::as_ref)
    }

    /// Returns the group state.
    #[inline]
    fn get_mut(&mut self, id: GroupId) -> Option<&mut GroupState> {
        self.slots.get_mut(id.get()).and_then(Option::as_mut)
    }

    /// Returns the group state of a group known to exist.
    fn state_mut(&mut self, id: GroupId) -> &mut GroupState {
        self.get_mut(id)
            .expect("[validity] the group has been checked to exist")
    }

    /// Takes the group state out.
    fn remove(&mut self, id: GroupId) -> Option<GroupState> {
        let state = self.slots.get_mut(id.get())?.take()?;
        self.relay_owners.remove(&state.relay);
        for member in state.members.iter() {
            self.member_owners.remove(&member);
        }
        Some(state)
    }

    /// Returns the group owning the relay.
    #[inline]
    fn owner_of_relay(&self, relay: NodeId) -> Option<GroupId> {
        self.relay_owners.get(&relay).copied()
    }

    /// Returns the group the node is a member of.
    #[inline]
    fn owner_of_member(&self, node: NodeId) -> Option<GroupId> {
        self.member_owners.get(&node).copied()
    }

    /// Records the nodes as members of the group, in index order.
    fn append_members(&mut self, id: GroupId, nodes: Vec<NodeId>) -> usize {
        self.adopt(id, &nodes);
        self.state_mut(id).members.append(nodes)
    }

    /// Records the nodes as the first members of the group.
    fn prepend_members(&mut self, id: GroupId, nodes: Vec<NodeId>) -> usize {
        self.adopt(id, &nodes);
        self.state_mut(id).members.prepend(nodes)
    }

    /// Records `new` as a member right before `reference`.
    fn insert_member_before(
        &mut self,
        id: GroupId,
        reference: NodeId,
        new: NodeId,
    ) -> Result<(), Rejection<NodeId>> {
        self.state_mut(id).members.insert_before_item(reference, new)?;
        self.adopt(id, &[new]);
        Ok(())
    }

    /// Puts `new` at the position of the member `old`.
    fn replace_member(&mut self, id: GroupId, old: NodeId, new: NodeId) -> Result<(), Rejection<NodeId>> {
        self.state_mut(id).members.replace_item(old, new)?;
        self.member_owners.remove(&old);
        self.adopt(id, &[new]);
        Ok(())
    }

    /// Forgets a member.
    fn delete_member(&mut self, id: GroupId, node: NodeId) -> bool {
        let deleted = self.state_mut(id).members.delete(node);
        if deleted {
            self.member_owners.remove(&node);
        }
        deleted
    }

    /// Forgets every member.
    fn clear_members(&mut self, id: GroupId) {
        let state = self.state_mut(id);
        let members = state.members.iter().collect::<Vec<_>>();
        state.members.clear();
        for member in members {
            self.member_owners.remove(&member);
        }
    }

    /// Marks the nodes as owned by the group.
    fn adopt(&mut self, id: GroupId, nodes: &[NodeId]) {
        for &node in nodes {
            let previous = self.member_owners.insert(node, id);
            debug_assert!(
                previous.map_or(true, |owner| owner == id),
                "[consistency] a node is a member of at most one group"
            );
        }
    }
}

/// Group state.
#[derive(Debug)]
pub(crate) struct GroupState {
    /// Members in display order.
    members: OrderedIndex<NodeId>,
    /// Relay element.
    relay: NodeId,
    /// Holding container, a fragment.
    container: NodeId,
    /// Parent the members were last placed under by an attach.
    host: Option<NodeId>,
    /// Node right after the members in the host, if any.
    follower: Option<NodeId>,
    /// Options.
    options: GroupOptions,
}

impl GroupState {
    /// Returns the relay element.
    #[inline]
    pub(crate) fn relay(&self) -> NodeId {
        self.relay
    }

    /// Returns the holding container.
    #[inline]
    pub(crate) fn container(&self) -> NodeId {
        self.container
    }

    /// Returns the members.
    #[inline]
    pub(crate) fn members(&self) -> &OrderedIndex<NodeId> {
        &self.members
    }
}

impl Document {
    /// Creates an empty group with the default options.
    pub fn create_group(&mut self) -> GroupId {
        self.create_group_with(GroupOptions::default())
    }

    /// Creates an empty group.
    pub fn create_group_with(&mut self, options: GroupOptions) -> GroupId {
        relay::ensure_defined();
        let container = self.create_fragment();
        let relay = self.create_element(relay::RELAY_NAME);
        self.insert_node(relay, InsertAs::LastChildOf(container))
            .expect("[validity] a fresh element can be appended to a fresh fragment");

        let id = self.groups.insert(GroupState {
            members: OrderedIndex::new(),
            relay,
            container,
            host: None,
            follower: None,
            options,
        });
        tracing::debug!(group = ?id, ?options, "group created");

        id
    }

    /// Returns a read proxy to the group.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<Group<'_>> {
        let state = self.groups.get(id)?;
        Some(Group {
            doc: self,
            id,
            state,
        })
    }

    /// Returns a mutation proxy to the group.
    #[must_use]
    pub fn group_mut(&mut self, id: GroupId) -> Option<GroupMut<'_>> {
        self.groups.get(id)?;
        Some(GroupMut { doc: self, id })
    }

    /// Releases the group, reclaiming its relay and holding container.
    ///
    /// Members placed in the tree stay where they are. Members still in the
    /// holding area become detached roots.
    ///
    /// Returns false if the group does not exist.
    pub fn release_group(&mut self, id: GroupId) -> bool {
        let Some(state) = self.groups.remove(id) else {
            return false;
        };
        self.release_node(state.relay);
        self.release_node(state.container);
        self.flush_reactions();
        tracing::debug!(group = ?id, "group released");

        true
    }
}

/// Moves the members next to the relay, then returns the relay to the
/// holding container.
fn attach(doc: &mut Document, id: GroupId) {
    let Some(state) = doc.groups.get(id) else {
        return;
    };
    let (relay, container) = (state.relay, state.container);
    if !doc.is_connected(relay) {
        tracing::trace!(group = ?id, "relay moved out of the tree before its reaction ran");
        return;
    }
    let members = state.members.iter().collect::<Vec<_>>();
    let host = doc.parent(relay);

    let mut dest = InsertAs::NextSiblingOf(relay);
    let mut placed = 0_usize;
    for member in members {
        match doc.insert_node(member, dest) {
            Ok(_) => {
                dest = InsertAs::NextSiblingOf(member);
                placed += 1;
            }
            Err(error) => {
                tracing::warn!(group = ?id, ?member, %error, "member cannot be relocated");
            }
        }
    }
    let follower = doc.node(dest.anchor()).and_then(|node| node.next_sibling_id());
    if let Err(error) = doc.insert_node(relay, InsertAs::LastChildOf(container)) {
        tracing::warn!(group = ?id, %error, "relay cannot return to its container");
    }

    if let Some(state) = doc.groups.get_mut(id) {
        state.host = host;
        state.follower = follower;
    }
    tracing::debug!(group = ?id, ?host, members = placed, "group attached");
}

/// Forgets the host if the relay left the tree without returning home.
fn note_detached(doc: &mut Document, id: GroupId) {
    let Some(state) = doc.groups.get(id) else {
        return;
    };
    if doc.parent(state.relay) == Some(state.container) {
        return;
    }
    if let Some(state) = doc.groups.get_mut(id) {
        state.host = None;
    }
    tracing::debug!(group = ?id, "group detached");
}

/// Read proxy to a group.
#[derive(Debug, Clone, Copy)]
pub struct Group<'a> {
    /// Document.
    doc: &'a Document,
    /// Group ID.
    id: GroupId,
    /// State.
    state: &'a GroupState,
}

impl<'a> Group<'a> {
    /// Returns the group ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the holding container.
    ///
    /// Inserting the container with [`Document::insert`] attaches the group
    /// like inserting [`Content::Group`] does, as long as the relay is in it.
    #[inline]
    #[must_use]
    pub fn node(&self) -> NodeId {
        self.state.container
    }

    /// Returns the options.
    #[inline]
    #[must_use]
    pub fn options(&self) -> GroupOptions {
        self.state.options
    }

    /// Returns the parent the members were last placed under by an attach.
    #[inline]
    #[must_use]
    pub fn host(&self) -> Option<NodeId> {
        self.state.host
    }

    /// Returns true if the host is connected.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.state
            .host
            .map_or(false, |host| self.doc.is_connected(host))
    }

    /// Returns the element members.
    #[inline]
    #[must_use]
    pub fn children(&self) -> ElementCollection<'a> {
        ElementCollection::new(self.doc, &self.state.members)
    }

    /// Returns all members.
    #[inline]
    #[must_use]
    pub fn child_nodes(&self) -> NodeList<'a> {
        NodeList::new(&self.state.members)
    }

    /// Returns true if the node is a member.
    #[inline]
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.state.members.has(node)
    }

    /// Returns the concatenated text content of the members.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.state
            .members
            .iter()
            .map(|member| self.doc.text_content(member))
            .collect()
    }

    /// Returns the first member.
    #[inline]
    #[must_use]
    pub fn first_child(&self) -> Option<NodeId> {
        self.state.members.first()
    }

    /// Returns the last member.
    #[inline]
    #[must_use]
    pub fn last_child(&self) -> Option<NodeId> {
        self.state.members.last()
    }

    /// Returns true if the group has members.
    #[inline]
    #[must_use]
    pub fn has_child_nodes(&self) -> bool {
        !self.state.members.is_empty()
    }

    /// Returns the number of members.
    #[inline]
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.state.members.len()
    }
}

/// Error handling policy of a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    /// Skip and log.
    Permissive,
    /// Fail.
    Strict,
}

impl Policy {
    /// Handles an item that cannot be applied.
    fn reject(self, group: GroupId, op: &'static str, error: GroupError) -> Result<(), GroupError> {
        match self {
            Self::Strict => Err(error),
            Self::Permissive => {
                tracing::debug!(?group, op, %error, "item skipped");
                Ok(())
            }
        }
    }
}

/// Side of the members that sibling contents go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    /// Before the first member.
    Before,
    /// After the last member.
    After,
}

/// Mutation proxy to a group.
#[derive(Debug)]
pub struct GroupMut<'a> {
    /// Document.
    doc: &'a mut Document,
    /// Group ID.
    id: GroupId,
}

impl<'a> GroupMut<'a> {
    /// Returns the group ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Returns a read proxy to the group.
    #[must_use]
    pub fn as_group(&self) -> Group<'_> {
        Group {
            doc: &*self.doc,
            id: self.id,
            state: self.state(),
        }
    }

    /// Returns the state.
    fn state(&self) -> &GroupState {
        self.doc
            .groups
            .get(self.id)
            .expect("[validity] the group has been checked to exist")
    }

    /// Returns the state.
    fn state_mut(&mut self) -> &mut GroupState {
        self.doc
            .groups
            .get_mut(self.id)
            .expect("[validity] the group has been checked to exist")
    }

    /// Returns true if every mutation is mirrored into the tree.
    fn mirrors_tree(&self) -> bool {
        self.state().options.mirrors_tree()
    }

    /// Dispatches reactions and logs the error of a permissive mutation.
    fn finish(&mut self, op: &'static str, result: Result<(), GroupError>) {
        self.doc.flush_reactions();
        if let Err(error) = result {
            tracing::debug!(group = ?self.id, op, %error, "group operation ignored");
        }
    }

    /// Dispatches reactions and passes the result through.
    fn finish_strict(&mut self, result: Result<(), GroupError>) -> Result<(), GroupError> {
        self.doc.flush_reactions();
        result
    }

    /// Returns an error if the node cannot become a member, or cannot be
    /// placed at `dest`.
    fn check_member(&self, node: NodeId, dest: Option<InsertAs>) -> Result<(), GroupError> {
        match self.doc.data(node) {
            Some(data) if data.is_child_node() => {}
            _ => return Err(GroupError::InvalidMember(node)),
        }
        if self.doc.groups.owner_of_relay(node).is_some() {
            return Err(GroupError::InvalidMember(node));
        }
        if self.doc.groups.owner_of_member(node).is_some() {
            return Err(GroupError::AlreadyMember(node));
        }
        if let Some(dest) = dest {
            self.check_placement(node, dest)?;
        }
        Ok(())
    }

    /// Returns an error if the node cannot be inserted at `dest`.
    fn check_placement(&self, node: NodeId, dest: InsertAs) -> Result<(), StructureError> {
        let parent = match dest {
            InsertAs::FirstChildOf(parent) | InsertAs::LastChildOf(parent) => Some(parent),
            InsertAs::PreviousSiblingOf(anchor) | InsertAs::NextSiblingOf(anchor) => {
                if node == anchor {
                    return Err(StructureError::UnorderableSiblings);
                }
                self.doc.parent(anchor)
            }
        };
        match parent {
            Some(parent) if self.doc.is_inclusive_ancestor(node, parent) => {
                Err(StructureError::AncestorDescendantLoop)
            }
            _ => Ok(()),
        }
    }

    /// Validates new members, then materializes them.
    fn admit_members(
        &mut self,
        op: &'static str,
        contents: Vec<Content>,
        dest: InsertAs,
        policy: Policy,
    ) -> Result<Vec<NodeId>, GroupError> {
        let mut accepted = Vec::with_capacity(contents.len());
        let mut seen = HashSet::new();
        for content in contents {
            let verdict = match &content {
                Content::Node(node) => self.check_member(*node, Some(dest)).and_then(|()| {
                    if seen.insert(*node) {
                        Ok(())
                    } else {
                        Err(GroupError::AlreadyMember(*node))
                    }
                }),
                Content::Text(_) => Ok(()),
                Content::Group(group) => Err(GroupError::NestedGroup(*group)),
            };
            match verdict {
                Ok(()) => accepted.push(content),
                Err(error) => policy.reject(self.id, op, error)?,
            }
        }
        Ok(self.doc.materialize(accepted)?)
    }

    /// Validates contents to be inserted beside the members, then
    /// materializes them.
    fn admit_siblings(
        &mut self,
        op: &'static str,
        contents: Vec<Content>,
        dest: InsertAs,
        policy: Policy,
    ) -> Result<Vec<NodeId>, GroupError> {
        let state = self.state();
        let (relay, container) = (state.relay, state.container);
        let mut accepted = Vec::with_capacity(contents.len());
        for content in contents {
            let verdict = match &content {
                Content::Node(node) if self.state().members.has(*node) => {
                    Err(GroupError::AlreadyMember(*node))
                }
                Content::Node(node) if *node == relay || *node == container => {
                    Err(GroupError::InvalidMember(*node))
                }
                Content::Node(node) if !self.doc.is_alive(*node) => {
                    Err(StructureError::DeadNode(*node).into())
                }
                Content::Node(node) => self.check_placement(*node, dest).map_err(Into::into),
                Content::Text(_) => Ok(()),
                Content::Group(group) if *group == self.id => Err(GroupError::NestedGroup(*group)),
                Content::Group(group) if self.doc.groups.get(*group).is_none() => {
                    Err(StructureError::UnknownGroup(*group).into())
                }
                Content::Group(_) => Ok(()),
            };
            match verdict {
                Ok(()) => accepted.push(content),
                Err(error) => policy.reject(self.id, op, error)?,
            }
        }
        Ok(self.doc.materialize(accepted)?)
    }

    /// Inserts the nodes one after another, starting at `dest`.
    ///
    /// Returns the nodes placed. Nodes the tree refuses are logged and
    /// skipped.
    fn place(&mut self, dest: InsertAs, nodes: Vec<NodeId>) -> Vec<NodeId> {
        let mut dest = dest;
        let mut placed = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.doc.insert_node(node, dest) {
                Ok(Some(last)) => {
                    dest = InsertAs::NextSiblingOf(last);
                    placed.push(node);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(group = ?self.id, ?node, %error, "node cannot be placed");
                }
            }
        }
        placed
    }

    /// Returns the last member that is in a tree.
    fn last_placed_member(&self) -> Option<NodeId> {
        self.state()
            .members
            .iter()
            .rev()
            .find(|&member| self.doc.parent(member).is_some())
    }

    /// Returns the first member that is in a tree.
    fn first_placed_member(&self) -> Option<NodeId> {
        self.state()
            .members
            .iter()
            .find(|&member| self.doc.parent(member).is_some())
    }

    /// Returns where new members go while no member is in a tree.
    ///
    /// An attached group puts them where its members were, or at the end of
    /// the host if that spot is gone. A detached group keeps them in the
    /// holding area.
    fn vacant_dest(&self) -> InsertAs {
        let state = self.state();
        let Some(host) = state.host else {
            return InsertAs::NextSiblingOf(state.relay);
        };
        match state
            .follower
            .filter(|&follower| self.doc.parent(follower) == Some(host))
        {
            Some(follower) => InsertAs::PreviousSiblingOf(follower),
            None => InsertAs::LastChildOf(host),
        }
    }

    /// Detaches a member from the tree.
    ///
    /// A member leaving the host hands its spot to the follower record.
    fn detach_member(&mut self, member: NodeId) {
        let host = self.state().host;
        if host.is_some() && self.doc.parent(member) == host {
            let follower = self.doc.node(member).and_then(|node| node.next_sibling_id());
            self.state_mut().follower = follower;
        }
        if let Err(error) = self.doc.detach_node(member) {
            tracing::warn!(group = ?self.id, ?member, %error, "member cannot be detached");
        }
    }

    /// Appends contents as members, right after the last member.
    ///
    /// If no member is in a tree, an attached group places them where its
    /// members were, and a detached group keeps them in the holding area.
    ///
    /// Strings become new text nodes. Nodes that are already members,
    /// fragments, the document node and groups are skipped.
    pub fn append<I>(&mut self, contents: I)
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.append_with("append", contents, Policy::Permissive);
        self.finish("append", result);
    }

    /// Appends contents as members.
    ///
    /// # Errors
    ///
    /// * [`GroupError::AlreadyMember`] if a node is a member of any group,
    ///   or appears twice.
    /// * [`GroupError::InvalidMember`] for dead nodes, fragments, the
    ///   document node and relays.
    /// * [`GroupError::NestedGroup`] for group contents.
    /// * [`GroupError::Structure`] if a node would become its own ancestor.
    ///
    /// Nothing is modified when an error is returned.
    pub fn try_append<I>(&mut self, contents: I) -> Result<(), GroupError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.append_with("append", contents, Policy::Strict);
        self.finish_strict(result)
    }

    /// Shared part of `append` and `try_append`.
    fn append_with(
        &mut self,
        op: &'static str,
        contents: Vec<Content>,
        policy: Policy,
    ) -> Result<(), GroupError> {
        let dest = match self.last_placed_member() {
            Some(last) => InsertAs::NextSiblingOf(last),
            None => self.vacant_dest(),
        };
        let nodes = self.admit_members(op, contents, dest, policy)?;
        let placed = self.place(dest, nodes);
        let added = self.doc.groups.append_members(self.id, placed);
        tracing::trace!(group = ?self.id, op, added, "members appended");
        Ok(())
    }

    /// Prepends contents as members, keeping their order, right before the
    /// first member.
    ///
    /// If no member is in a tree, contents go where
    /// [`append`][`Self::append`] would put them.
    ///
    /// Items are skipped like [`append`][`Self::append`] does.
    pub fn prepend<I>(&mut self, contents: I)
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.prepend_with(contents, Policy::Permissive);
        self.finish("prepend", result);
    }

    /// Prepends contents as members.
    ///
    /// # Errors
    ///
    /// Same as [`try_append`][`Self::try_append`].
    pub fn try_prepend<I>(&mut self, contents: I) -> Result<(), GroupError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.prepend_with(contents, Policy::Strict);
        self.finish_strict(result)
    }

    /// Shared part of `prepend` and `try_prepend`.
    fn prepend_with(&mut self, contents: Vec<Content>, policy: Policy) -> Result<(), GroupError> {
        let dest = match self.first_placed_member() {
            Some(first) => InsertAs::PreviousSiblingOf(first),
            None => self.vacant_dest(),
        };
        let nodes = self.admit_members("prepend", contents, dest, policy)?;
        let placed = self.place(dest, nodes);
        let added = self.doc.groups.prepend_members(self.id, placed);
        tracing::trace!(group = ?self.id, added, "members prepended");
        Ok(())
    }

    /// Inserts `new` as a member right before the member `reference`.
    ///
    /// With [`Mirroring::Partial`] only the index is updated.
    pub fn insert_before(&mut self, new: NodeId, reference: NodeId) {
        let result = self.insert_before_with(new, reference);
        self.finish("insert_before", result);
    }

    /// Inserts `new` as a member right before the member `reference`.
    ///
    /// # Errors
    ///
    /// * [`GroupError::NotFound`] if `reference` is not a member.
    /// * Errors of [`try_append`][`Self::try_append`] for `new`.
    pub fn try_insert_before(&mut self, new: NodeId, reference: NodeId) -> Result<(), GroupError> {
        let result = self.insert_before_with(new, reference);
        self.finish_strict(result)
    }

    /// Shared part of `insert_before` and `try_insert_before`.
    fn insert_before_with(&mut self, new: NodeId, reference: NodeId) -> Result<(), GroupError> {
        let mirrors = self.mirrors_tree();
        let dest = InsertAs::PreviousSiblingOf(reference);
        self.check_member(new, mirrors.then_some(dest))?;
        if !self.state().members.has(reference) {
            return Err(GroupError::NotFound(reference));
        }
        if mirrors && self.doc.parent(reference).is_some() {
            self.doc.insert_node(new, dest)?;
        }
        self.doc.groups.insert_member_before(self.id, reference, new)?;
        Ok(())
    }

    /// Replaces the member `old` with `new`, keeping its position.
    ///
    /// `old` is detached from the tree. With [`Mirroring::Partial`] only the
    /// index is updated.
    pub fn replace_child(&mut self, new: NodeId, old: NodeId) {
        let result = self.replace_child_with(new, old);
        self.finish("replace_child", result);
    }

    /// Replaces the member `old` with `new`.
    ///
    /// # Errors
    ///
    /// * [`GroupError::NotFound`] if `old` is not a member.
    /// * Errors of [`try_append`][`Self::try_append`] for `new`.
    pub fn try_replace_child(&mut self, new: NodeId, old: NodeId) -> Result<(), GroupError> {
        let result = self.replace_child_with(new, old);
        self.finish_strict(result)
    }

    /// Shared part of `replace_child` and `try_replace_child`.
    fn replace_child_with(&mut self, new: NodeId, old: NodeId) -> Result<(), GroupError> {
        let mirrors = self.mirrors_tree();
        let dest = InsertAs::PreviousSiblingOf(old);
        self.check_member(new, mirrors.then_some(dest))?;
        if !self.state().members.has(old) {
            return Err(GroupError::NotFound(old));
        }
        if mirrors && self.doc.parent(old).is_some() {
            self.doc.insert_node(new, dest)?;
            self.doc.detach_node(old)?;
        }
        self.doc.groups.replace_member(self.id, old, new)?;
        Ok(())
    }

    /// Replaces the members with the contents.
    ///
    /// Does nothing if the contents are exactly the current members, in any
    /// order. Otherwise new contents are appended and old members not in
    /// the contents are removed from the tree and the index.
    pub fn replace_children<I>(&mut self, contents: I)
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.replace_children_with(contents, Policy::Permissive);
        self.finish("replace_children", result);
    }

    /// Replaces the members with the contents.
    ///
    /// # Errors
    ///
    /// Same as [`try_append`][`Self::try_append`] for the new contents.
    pub fn try_replace_children<I>(&mut self, contents: I) -> Result<(), GroupError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.replace_children_with(contents, Policy::Strict);
        self.finish_strict(result)
    }

    /// Shared part of `replace_children` and `try_replace_children`.
    fn replace_children_with(&mut self, contents: Vec<Content>, policy: Policy) -> Result<(), GroupError> {
        let members = &self.state().members;
        let requested = contents
            .iter()
            .filter_map(|content| match content {
                Content::Node(node) => Some(*node),
                _ => None,
            })
            .collect::<HashSet<_>>();
        let only_nodes = contents.iter().all(|content| matches!(content, Content::Node(_)));
        if only_nodes
            && requested.len() == members.len()
            && requested.iter().all(|&node| members.has(node))
        {
            tracing::trace!(group = ?self.id, "membership unchanged");
            return Ok(());
        }

        let old = members.iter().collect::<Vec<_>>();
        let fresh = contents
            .into_iter()
            .filter(|content| !matches!(content, Content::Node(node) if members.has(*node)))
            .collect();
        self.append_with("replace_children", fresh, policy)?;

        for member in old.into_iter().filter(|member| !requested.contains(member)) {
            self.detach_member(member);
            self.doc.groups.delete_member(self.id, member);
        }
        Ok(())
    }

    /// Removes a member.
    ///
    /// With [`Mirroring::Partial`] only the index is updated.
    pub fn remove_child(&mut self, node: NodeId) {
        let result = self.remove_child_with(node);
        self.finish("remove_child", result);
    }

    /// Removes a member.
    ///
    /// # Errors
    ///
    /// Returns [`GroupError::NotFound`] if the node is not a member.
    pub fn try_remove_child(&mut self, node: NodeId) -> Result<(), GroupError> {
        let result = self.remove_child_with(node);
        self.finish_strict(result)
    }

    /// Shared part of `remove_child` and `try_remove_child`.
    fn remove_child_with(&mut self, node: NodeId) -> Result<(), GroupError> {
        if !self.state().members.has(node) {
            return Err(GroupError::NotFound(node));
        }
        if self.mirrors_tree() {
            self.detach_member(node);
        }
        self.doc.groups.delete_member(self.id, node);
        Ok(())
    }

    /// Detaches every member from the tree.
    ///
    /// With [`Mirroring::Full`] the index is emptied as well; with
    /// [`Mirroring::Partial`] it is kept as a record of the old members.
    pub fn remove(&mut self) {
        self.detach_all_members();
        self.doc.flush_reactions();
        tracing::debug!(group = ?self.id, "group removed");
    }

    /// Detaches every member, and forgets them unless mirroring is partial.
    fn detach_all_members(&mut self) {
        let members = self.state().members.iter().collect::<Vec<_>>();
        for member in members {
            self.detach_member(member);
        }
        if self.mirrors_tree() {
            self.doc.groups.clear_members(self.id);
        }
        self.state_mut().host = None;
    }

    /// Inserts contents right after the last member.
    ///
    /// Does nothing if the group is empty or the last member has no parent.
    pub fn after<I>(&mut self, contents: I)
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.beside_with("after", Side::After, contents, Policy::Permissive);
        self.finish("after", result);
    }

    /// Inserts contents right after the last member.
    ///
    /// # Errors
    ///
    /// * [`GroupError::NoAnchor`] if the group is empty.
    /// * [`GroupError::AlreadyMember`] if a node is a member of this group.
    /// * [`GroupError::NestedGroup`] if the contents contain this group.
    /// * [`GroupError::Structure`] for nodes the tree would refuse.
    pub fn try_after<I>(&mut self, contents: I) -> Result<(), GroupError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.beside_with("after", Side::After, contents, Policy::Strict);
        self.finish_strict(result)
    }

    /// Inserts contents right before the first member.
    ///
    /// Does nothing if the group is empty or the first member has no parent.
    pub fn before<I>(&mut self, contents: I)
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.beside_with("before", Side::Before, contents, Policy::Permissive);
        self.finish("before", result);
    }

    /// Inserts contents right before the first member.
    ///
    /// # Errors
    ///
    /// Same as [`try_after`][`Self::try_after`].
    pub fn try_before<I>(&mut self, contents: I) -> Result<(), GroupError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.beside_with("before", Side::Before, contents, Policy::Strict);
        self.finish_strict(result)
    }

    /// Shared part of `after` and `before`.
    fn beside_with(
        &mut self,
        op: &'static str,
        side: Side,
        contents: Vec<Content>,
        policy: Policy,
    ) -> Result<(), GroupError> {
        let members = &self.state().members;
        let dest = match side {
            Side::Before => members.first().map(InsertAs::PreviousSiblingOf),
            Side::After => members.last().map(InsertAs::NextSiblingOf),
        }
        .ok_or(GroupError::NoAnchor)?;
        if self.doc.parent(dest.anchor()).is_none() {
            return Ok(());
        }
        let nodes = self.admit_siblings(op, contents, dest, policy)?;
        self.place(dest, nodes);
        Ok(())
    }

    /// Inserts contents right after the last member, then detaches every
    /// member.
    ///
    /// The index is handled like [`remove`][`Self::remove`] does. Does
    /// nothing if the group is empty.
    pub fn replace_with<I>(&mut self, contents: I)
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.replace_with_contents(contents, Policy::Permissive);
        self.finish("replace_with", result);
    }

    /// Inserts contents right after the last member, then detaches every
    /// member.
    ///
    /// # Errors
    ///
    /// Same as [`try_after`][`Self::try_after`].
    pub fn try_replace_with<I>(&mut self, contents: I) -> Result<(), GroupError>
    where
        I: IntoIterator,
        I::Item: Into<Content>,
    {
        let contents = contents.into_iter().map(Into::into).collect();
        let result = self.replace_with_contents(contents, Policy::Strict);
        self.finish_strict(result)
    }

    /// Shared part of `replace_with` and `try_replace_with`.
    fn replace_with_contents(&mut self, contents: Vec<Content>, policy: Policy) -> Result<(), GroupError> {
        self.beside_with("replace_with", Side::After, contents, policy)?;
        self.detach_all_members();
        tracing::debug!(group = ?self.id, "group replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn attached_group(doc: &mut Document, texts: &[&str]) -> (GroupId, NodeId) {
        let host = doc.create_element("div");
        let root = doc.root();
        doc.append(root, [host]).expect("fresh nodes");
        let group = doc.create_group();
        doc.group_mut(group)
            .expect("just created")
            .append(texts.iter().copied());
        doc.append(host, [group]).expect("group can be inserted");
        (group, host)
    }

    #[test]
    fn relay_stays_first_in_container() {
        let mut doc = Document::new();
        let group = doc.create_group();
        doc.group_mut(group).expect("just created").append(["a", "b"]);

        let container = doc.group(group).expect("alive").node();
        let children = doc.children(container).collect::<Vec<_>>();
        assert_eq!(children.len(), 3);
        assert_eq!(
            doc.data(children[0])
                .and_then(|data| data.as_element())
                .map(|element| element.name()),
            Some(relay::RELAY_NAME)
        );
    }

    #[test]
    fn attach_records_host() {
        let mut doc = Document::new();
        let (group, host) = attached_group(&mut doc, &["x"]);
        let view = doc.group(group).expect("alive");
        assert_eq!(view.host(), Some(host));
        assert!(view.is_attached());
        assert_eq!(doc.child_count(host), 1, "the relay goes home after attaching");
    }

    #[test]
    fn members_of_other_groups_are_refused() {
        let mut doc = Document::new();
        let node = doc.create_text("shared");
        let first = doc.create_group();
        let second = doc.create_group();
        doc.group_mut(first).expect("alive").append([node]);
        assert_eq!(
            doc.group_mut(second).expect("alive").try_append([node]),
            Err(GroupError::AlreadyMember(node))
        );
    }

    #[test]
    fn strict_append_creates_nothing_on_error() {
        let mut doc = Document::new();
        let group = doc.create_group();
        let fragment = doc.create_fragment();
        let result = doc
            .group_mut(group)
            .expect("alive")
            .try_append([Content::from("text"), Content::from(fragment)]);
        assert_eq!(result, Err(GroupError::InvalidMember(fragment)));
        assert_eq!(doc.group(group).expect("alive").child_count(), 0);
        let container = doc.group(group).expect("alive").node();
        assert_eq!(doc.child_count(container), 1);
    }

    #[test]
    fn nested_groups_are_refused() {
        let mut doc = Document::new();
        let outer = doc.create_group();
        let inner = doc.create_group();
        assert_eq!(
            doc.group_mut(outer).expect("alive").try_append([inner]),
            Err(GroupError::NestedGroup(inner))
        );
    }

    #[test]
    fn ancestors_cannot_become_members_beside_themselves() {
        let mut doc = Document::new();
        let (group, host) = attached_group(&mut doc, &["x"]);
        let result = doc.group_mut(group).expect("alive").try_append([host]);
        assert_eq!(
            result,
            Err(GroupError::Structure(StructureError::AncestorDescendantLoop))
        );
    }

    #[test]
    fn release_reclaims_internal_nodes() {
        let mut doc = Document::new();
        let (group, host) = attached_group(&mut doc, &["x"]);
        let container = doc.group(group).expect("alive").node();
        assert!(doc.release_group(group));
        assert!(!doc.release_group(group));
        assert!(doc.group(group).is_none());
        assert!(!doc.is_alive(container));
        assert_eq!(doc.text_content(host), "x");
    }

    #[test]
    fn former_members_can_join_other_groups() {
        let mut doc = Document::new();
        let [a, b, c] = ["a", "b", "c"].map(|text| doc.create_text(text));
        let first = doc.create_group();
        let second = doc.create_group();
        doc.group_mut(first).expect("alive").append([a, b]);

        let mut proxy = doc.group_mut(first).expect("alive");
        proxy.try_remove_child(a).expect("a is a member");
        proxy.try_replace_child(c, b).expect("b is a member");
        assert_eq!(doc.groups.owner_of_member(c), Some(first));

        doc.group_mut(second)
            .expect("alive")
            .try_append([a, b])
            .expect("a and b have left the first group");
        assert!(doc.release_group(first));
        assert_eq!(doc.groups.owner_of_member(c), None);
        doc.group_mut(second)
            .expect("alive")
            .try_append([c])
            .expect("released groups own nothing");
        assert_eq!(doc.groups.owner_of_member(a), Some(second));
    }

    #[test]
    fn empty_attached_group_places_members_under_host() {
        let mut doc = Document::new();
        let (group, host) = attached_group(&mut doc, &[]);
        assert_eq!(doc.child_count(host), 0);

        doc.group_mut(group)
            .expect("alive")
            .try_append(["x"])
            .expect("fresh text");
        assert_eq!(doc.text_content(host), "x");
        assert!(doc.group(group).expect("alive").is_attached());
        assert_eq!(
            doc.group_mut(group).expect("alive").try_prepend([host]),
            Err(GroupError::Structure(StructureError::AncestorDescendantLoop))
        );
    }
}
