//! Error types.

use thiserror::Error;

use crate::group::GroupId;
use crate::ordered::Rejection;
use crate::tree::NodeId;

/// Structure inconsistency error raised by the tree substrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StructureError {
    /// Attempt to make a node the ancestor of itself.
    #[error("attempt to make a node the ancestor of itself")]
    AncestorDescendantLoop,
    /// Attempt to make a node the sibling of itself.
    #[error("attempt to make a node the sibling of itself")]
    UnorderableSiblings,
    /// Attempt to add sibling nodes without a parent.
    #[error("attempt to add sibling nodes without a parent")]
    SiblingsWithoutParent,
    /// The node does not exist or has already been removed.
    #[error("node {0:?} is not alive")]
    DeadNode(NodeId),
    /// Attribute access on a node that is not an element.
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    /// The node can never be a child of another node.
    #[error("node {0:?} cannot be inserted as a child")]
    InvalidChild(NodeId),
    /// The node cannot have children.
    #[error("node {0:?} cannot have children")]
    NotAParent(NodeId),
    /// The group does not exist or has already been released.
    #[error("group {0:?} does not exist")]
    UnknownGroup(GroupId),
}

/// Rejected group operation.
///
/// Permissive group methods log and absorb these; the `try_*` variants return them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GroupError {
    /// The node is already tracked by the group.
    #[error("node {0:?} is already a member of the group")]
    AlreadyMember(NodeId),
    /// The referenced node is not tracked by the group.
    #[error("node {0:?} is not a member of the group")]
    NotFound(NodeId),
    /// Relative insertion on an empty group.
    #[error("the group has no member to insert relative to")]
    NoAnchor,
    /// The node cannot be tracked as a member (document, fragment, or dead node).
    #[error("node {0:?} cannot be a group member")]
    InvalidMember(NodeId),
    /// A group was given as the content of a group.
    #[error("group {0:?} cannot be nested in a group")]
    NestedGroup(GroupId),
    /// The tree rejected the mirrored mutation.
    #[error(transparent)]
    Structure(#[from] StructureError),
}

impl From<Rejection<NodeId>> for GroupError {
    #[inline]
    fn from(rejection: Rejection<NodeId>) -> Self {
        match rejection {
            Rejection::AlreadyPresent(node) => Self::AlreadyMember(node),
            Rejection::Absent(node) => Self::NotFound(node),
        }
    }
}

/// Element definition registration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Custom element names must be lowercase ASCII and contain a hyphen.
    #[error("invalid custom element name: {0:?}")]
    InvalidName(String),
    /// The name is used by the crate itself.
    #[error("custom element name {0:?} is reserved")]
    Reserved(String),
}
