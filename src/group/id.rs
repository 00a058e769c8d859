//! Group ID.

use core::fmt;

use crate::nonmax::NonMaxUsize;

/// Group ID.
///
/// IDs are only meaningful for the [`Document`][`crate::Document`] that
/// created the group, and become stale once the group is released.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(NonMaxUsize);

impl GroupId {
    /// Returns the slot in the group arena.
    #[inline]
    #[must_use]
    pub(crate) const fn get(self) -> usize {
        self.0.get()
    }

    /// Creates a group ID from the slot.
    #[inline]
    #[must_use]
    pub(crate) fn from_usize(v: usize) -> Option<Self> {
        NonMaxUsize::new(v).map(Self)
    }
}

impl fmt::Debug for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupId({:?})", self.0)
    }
}
