//! Node ID.

use core::fmt;

use crate::nonmax::NonMaxUsize;

/// Node ID.
///
/// IDs are only meaningful for the [`Document`][`crate::Document`] that
/// created them. The ordering is provided so that IDs can be used as keys of
/// ordered containers; it says nothing about tree order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(NonMaxUsize);

impl NodeId {
    /// Returns the arena slot.
    #[inline]
    #[must_use]
    pub(crate) const fn get(self) -> usize {
        self.0.get()
    }

    /// Creates a node ID from the arena slot.
    ///
    /// Returns `None` if the given value is too large.
    #[inline]
    #[must_use]
    pub(crate) fn from_usize(v: usize) -> Option<Self> {
        NonMaxUsize::new(v).map(Self)
    }
}

// Prevent `{:#?}` from printing the value in redundant 3 lines.
impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({:?})", self.0)
    }
}
