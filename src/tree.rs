//! Arena-backed tree structure shared by every document.

pub(crate) mod hierarchy;
mod id;

pub use self::id::NodeId;

/// Target destination to insert, append, or prepend a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
// All variants have the common suffix "Of", but this is intended.
// Variants would be used as, for example, `InsertAs::NextSiblingOf(some_node)`.
#[allow(clippy::enum_variant_names)]
pub enum InsertAs {
    /// As the first child.
    FirstChildOf(NodeId),
    /// As the last child.
    LastChildOf(NodeId),
    /// As the previous sibling.
    PreviousSiblingOf(NodeId),
    /// As the next sibling.
    NextSiblingOf(NodeId),
}

impl InsertAs {
    /// Returns the node the destination is relative to.
    #[inline]
    #[must_use]
    pub fn anchor(self) -> NodeId {
        match self {
            Self::FirstChildOf(id)
            | Self::LastChildOf(id)
            | Self::PreviousSiblingOf(id)
            | Self::NextSiblingOf(id) => id,
        }
    }
}
