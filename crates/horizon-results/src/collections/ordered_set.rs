//! Insertion-ordered set with hash-indexed lookups.
//!
//! `OrderedSet<T>` keeps unique values in an explicit sequence. Membership and
//! index lookups are O(1) on average; positional inserts, removals and moves
//! shift the values behind them and are O(n).

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::ops::Index;

use horizon_results_core::{Result, ResultsError};
use indexmap::IndexSet;

/// A collection of unique values in a defined order.
///
/// Unlike `HashSet`, two ordered sets are only equal if they contain the same
/// values *in the same order*; the diff engine relies on this.
///
/// # Example
///
/// ```
/// use horizon_results::collections::OrderedSet;
///
/// let mut set = OrderedSet::new();
/// set.add("b");
/// set.add("c");
/// set.insert("a", 0).unwrap();
///
/// assert_eq!(set.to_vec(), vec!["a", "b", "c"]);
/// assert_eq!(set.index_of(&"c"), Some(2));
/// assert_eq!(set.add("b"), 1); // already present: no-op
/// ```
#[derive(Clone)]
pub struct OrderedSet<T> {
    inner: IndexSet<T>,
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            inner: IndexSet::default(),
        }
    }
}

impl<T: Hash + Eq> OrderedSet<T> {
    /// Creates an empty ordered set.
    pub fn new() -> Self {
        Self {
            inner: IndexSet::new(),
        }
    }

    /// Creates an empty ordered set with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: IndexSet::with_capacity(capacity),
        }
    }

    /// Returns the number of values in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Appends `value` if it is absent.
    ///
    /// Returns the index of the value: the new last index, or its existing
    /// index if it was already present (in which case nothing changes).
    pub fn add(&mut self, value: T) -> usize {
        self.inner.insert_full(value).0
    }

    /// Appends every value of `values` that is not already present.
    pub fn add_all<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.inner.extend(values);
    }

    /// Inserts `value` at `index`, shifting later values back.
    ///
    /// If the value is already present it is repositioned to `index` (clamped
    /// to the last slot). Returns the final index of the value.
    ///
    /// # Errors
    ///
    /// Returns [`ResultsError::IndexOutOfRange`] if `index > len()`.
    pub fn insert(&mut self, value: T, index: usize) -> Result<usize> {
        if index > self.inner.len() {
            return Err(ResultsError::out_of_range(index, self.inner.len()));
        }
        let (current, _) = self.inner.insert_full(value);
        let target = index.min(self.inner.len() - 1);
        self.inner.move_index(current, target);
        Ok(target)
    }

    /// Removes `value`, returning the index it occupied.
    ///
    /// Returns `None` (and changes nothing) if the value is absent.
    pub fn remove(&mut self, value: &T) -> Option<usize> {
        self.inner.shift_remove_full(value).map(|(index, _)| index)
    }

    /// Removes and returns the value at `index`, if any.
    pub fn remove_at(&mut self, index: usize) -> Option<T> {
        self.inner.shift_remove_index(index)
    }

    /// Moves `value` to `index` without changing its identity.
    ///
    /// Returns the previous index, or `Ok(None)` if the value is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ResultsError::IndexOutOfRange`] if `index >= len()`.
    pub fn move_to(&mut self, value: &T, index: usize) -> Result<Option<usize>> {
        if index >= self.inner.len() {
            return Err(ResultsError::out_of_range(index, self.inner.len()));
        }
        let Some(current) = self.inner.get_index_of(value) else {
            return Ok(None);
        };
        self.inner.move_index(current, index);
        Ok(Some(current))
    }

    /// Returns the index of `value`, if present.
    #[inline]
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.inner.get_index_of(value)
    }

    /// Returns `true` if `value` is in the set.
    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.inner.contains(value)
    }

    /// Returns the value at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.inner.get_index(index)
    }

    /// Returns the first value.
    pub fn first(&self) -> Option<&T> {
        self.inner.first()
    }

    /// Returns the last value.
    pub fn last(&self) -> Option<&T> {
        self.inner.last()
    }

    /// Iterates the values in order.
    pub fn iter(&self) -> indexmap::set::Iter<'_, T> {
        self.inner.iter()
    }

    /// Removes all values.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Keeps only the values for which `keep` returns `true`, preserving order.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.inner.retain(keep);
    }

    /// Stable sort using `compare`.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.inner.sort_by(compare);
    }

    /// Copies the values into a `Vec`, in order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.iter().cloned().collect()
    }
}

impl<T: Hash + Eq + Ord> OrderedSet<T> {
    /// Stable sort by the natural ordering of the values.
    pub fn sort(&mut self) {
        self.inner.sort();
    }
}

impl<T: Hash + Eq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Hash + Eq> Eq for OrderedSet<T> {}

impl<T: fmt::Debug> fmt::Debug for OrderedSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.iter()).finish()
    }
}

impl<T: Hash + Eq> Index<usize> for OrderedSet<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn index(&self, index: usize) -> &T {
        &self.inner[index]
    }
}

impl<T: Hash + Eq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            inner: IndexSet::from_iter(iter),
        }
    }
}

impl<T: Hash + Eq> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.inner.extend(iter);
    }
}

impl<T> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = indexmap::set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = indexmap::set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
