//! `NonMaxUsize` for arena indices.

use core::cmp::Ordering;
use core::fmt;
use core::num::NonZeroUsize;

/// `usize` that is known not to equal `usize::MAX`.
///
/// Both node IDs and group IDs are backed by this, so that `Option<NodeId>`
/// and `Option<GroupId>` take no extra space.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub(crate) struct NonMaxUsize(NonZeroUsize);

impl NonMaxUsize {
    /// Creates a non-max usize value.
    ///
    /// Returns `None` for `usize::MAX`.
    #[inline]
    #[must_use]
    pub(crate) const fn new(n: usize) -> Option<Self> {
        // The bit-inverted value is stored, so `usize::MAX` maps to zero.
        match NonZeroUsize::new(!n) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Returns the value as a `usize` type.
    #[inline]
    #[must_use]
    pub(crate) const fn get(self) -> usize {
        !self.0.get()
    }
}

impl Ord for NonMaxUsize {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.get().cmp(&other.get())
    }
}

impl PartialOrd for NonMaxUsize {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for NonMaxUsize {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

impl fmt::Display for NonMaxUsize {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.get(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::NonMaxUsize;

    use core::mem::size_of;

    #[test]
    fn niche_keeps_option_small() {
        assert_eq!(size_of::<NonMaxUsize>(), size_of::<usize>());
        assert_eq!(
            size_of::<Option<NonMaxUsize>>(),
            size_of::<NonMaxUsize>(),
            "`Option<NonMaxUsize>` should use the niche"
        );
    }

    #[test]
    fn max_is_rejected() {
        assert!(NonMaxUsize::new(usize::MAX).is_none());
        assert_eq!(NonMaxUsize::new(usize::MAX - 1).map(NonMaxUsize::get), Some(usize::MAX - 1));
    }

    #[test]
    fn ordering_follows_value() {
        let small = NonMaxUsize::new(1).expect("1 is not max");
        let large = NonMaxUsize::new(7).expect("7 is not max");
        assert!(small < large);
    }
}
