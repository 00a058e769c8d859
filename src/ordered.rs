//! Ordered set of distinct items.
//!
//! [`OrderedIndex`] keeps items in insertion order with constant-time
//! membership tests. Insertions that would duplicate an item are skipped
//! (bulk operations) or rejected (single-item operations); the index never
//! contains the same item twice.

use core::hash::Hash;
use core::ops;

use indexmap::IndexSet;

/// Reason a single-item operation left the index untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection<T> {
    /// The item to add is already in the index.
    AlreadyPresent(T),
    /// The item to act on is not in the index.
    Absent(T),
}

/// Ordered set of distinct items.
///
/// Two indices are equal if they hold the same items in the same order.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound(
    serialize = "T: serde::Serialize + Hash + Eq",
    deserialize = "T: serde::Deserialize<'de> + Hash + Eq"
)))]
pub struct OrderedIndex<T> {
    /// Items in order.
    items: IndexSet<T>,
}

impl<T> OrderedIndex<T> {
    /// Creates an empty index.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: IndexSet::new(),
        }
    }

    /// Returns the number of items.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the index has no items.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes all items.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Copy + Eq + Hash> OrderedIndex<T> {
    /// Adds items to the end, skipping those already present.
    ///
    /// Returns the number of items added.
    pub fn append<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut added = 0;
        for item in items {
            if self.items.insert(item) {
                added += 1;
            }
        }
        added
    }

    /// Adds items to the front, keeping their relative order and skipping
    /// those already present.
    ///
    /// Returns the number of items added.
    pub fn prepend<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let mut at = 0;
        for item in items {
            if !self.items.contains(&item) {
                self.items.shift_insert(at, item);
                at += 1;
            }
        }
        at
    }

    /// Puts `new` at the position of `old`, removing `old`.
    ///
    /// # Errors
    ///
    /// * [`Rejection::AlreadyPresent`] if `new` is already in the index.
    /// * [`Rejection::Absent`] if `old` is not in the index.
    pub fn replace_item(&mut self, old: T, new: T) -> Result<(), Rejection<T>> {
        if self.items.contains(&new) {
            return Err(Rejection::AlreadyPresent(new));
        }
        let at = self.items.get_index_of(&old).ok_or(Rejection::Absent(old))?;
        self.items.shift_remove_index(at);
        self.items.shift_insert(at, new);
        Ok(())
    }

    /// Inserts `new` right before `reference`.
    ///
    /// # Errors
    ///
    /// * [`Rejection::AlreadyPresent`] if `new` is already in the index.
    /// * [`Rejection::Absent`] if `reference` is not in the index.
    pub fn insert_before_item(&mut self, reference: T, new: T) -> Result<(), Rejection<T>> {
        if self.items.contains(&new) {
            return Err(Rejection::AlreadyPresent(new));
        }
        let at = self
            .items
            .get_index_of(&reference)
            .ok_or(Rejection::Absent(reference))?;
        self.items.shift_insert(at, new);
        Ok(())
    }

    /// Removes the item. Returns false if it was not present.
    #[inline]
    pub fn delete(&mut self, item: T) -> bool {
        self.items.shift_remove(&item)
    }

    /// Removes the item at the position.
    #[inline]
    pub fn delete_at(&mut self, index: usize) -> Option<T> {
        self.items.shift_remove_index(index)
    }

    /// Returns true if the item is present.
    #[inline]
    #[must_use]
    pub fn has(&self, item: T) -> bool {
        self.items.contains(&item)
    }

    /// Returns the item at the position.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.get_index(index).copied()
    }

    /// Returns the position of the item.
    #[inline]
    #[must_use]
    pub fn position(&self, item: T) -> Option<usize> {
        self.items.get_index_of(&item)
    }

    /// Returns the first item.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<T> {
        self.items.first().copied()
    }

    /// Returns the last item.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.items.last().copied()
    }

    /// Returns an iterator of the items in order.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = T> + ExactSizeIterator + '_ {
        self.items.iter().copied()
    }
}

impl<T> Default for OrderedIndex<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialEq> PartialEq for OrderedIndex<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.items.iter().eq(other.items.iter())
    }
}

impl<T: Eq> Eq for OrderedIndex<T> {}

impl<T> ops::Index<usize> for OrderedIndex<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T: Copy + Eq + Hash> FromIterator<T> for OrderedIndex<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut index = Self::new();
        index.append(iter);
        index
    }
}

impl<T: Copy + Eq + Hash> Extend<T> for OrderedIndex<T> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.append(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn items(index: &OrderedIndex<char>) -> String {
        index.iter().collect()
    }

    #[rstest]
    #[case("", "abc", "abc", 3)]
    #[case("ab", "bcd", "abcd", 2)]
    #[case("abc", "cba", "abc", 0)]
    #[case("", "aab", "ab", 2)]
    fn append_skips_duplicates(
        #[case] initial: &str,
        #[case] added: &str,
        #[case] expected: &str,
        #[case] count: usize,
    ) {
        let mut index = initial.chars().collect::<OrderedIndex<_>>();
        assert_eq!(index.append(added.chars()), count);
        assert_eq!(items(&index), expected);
    }

    #[rstest]
    #[case("", "abc", "abc", 3)]
    #[case("xy", "ab", "abxy", 2)]
    #[case("xy", "axb", "abxy", 2)]
    #[case("xy", "yx", "xy", 0)]
    fn prepend_keeps_argument_order(
        #[case] initial: &str,
        #[case] added: &str,
        #[case] expected: &str,
        #[case] count: usize,
    ) {
        let mut index = initial.chars().collect::<OrderedIndex<_>>();
        assert_eq!(index.prepend(added.chars()), count);
        assert_eq!(items(&index), expected);
    }

    #[test]
    fn replace_keeps_position() {
        let mut index = "abc".chars().collect::<OrderedIndex<_>>();
        assert_eq!(index.replace_item('b', 'x'), Ok(()));
        assert_eq!(items(&index), "axc");
        assert_eq!(index.replace_item('a', 'c'), Err(Rejection::AlreadyPresent('c')));
        assert_eq!(index.replace_item('q', 'z'), Err(Rejection::Absent('q')));
        assert_eq!(items(&index), "axc");
    }

    #[test]
    fn insert_before_reference() {
        let mut index = "ac".chars().collect::<OrderedIndex<_>>();
        assert_eq!(index.insert_before_item('c', 'b'), Ok(()));
        assert_eq!(index.insert_before_item('a', '0'), Ok(()));
        assert_eq!(items(&index), "0abc");
        assert_eq!(index.insert_before_item('a', 'c'), Err(Rejection::AlreadyPresent('c')));
        assert_eq!(index.insert_before_item('q', 'z'), Err(Rejection::Absent('q')));
        assert_eq!(items(&index), "0abc");
    }

    #[test]
    fn deletion_shifts_later_items() {
        let mut index = "abcd".chars().collect::<OrderedIndex<_>>();
        assert!(index.delete('b'));
        assert!(!index.delete('b'));
        assert_eq!(index.delete_at(1), Some('c'));
        assert_eq!(index.delete_at(5), None);
        assert_eq!(items(&index), "ad");
        assert_eq!(index.position('d'), Some(1));
        assert_eq!(index[0], 'a');
        assert_eq!((index.first(), index.last()), (Some('a'), Some('d')));
    }

    #[test]
    fn equality_respects_order() {
        let forward = "abc".chars().collect::<OrderedIndex<_>>();
        let backward = "cba".chars().collect::<OrderedIndex<_>>();
        assert_ne!(forward, backward);
        assert_eq!(forward, "abc".chars().collect::<OrderedIndex<_>>());
        assert_eq!(OrderedIndex::<char>::new(), OrderedIndex::default());
    }
}
