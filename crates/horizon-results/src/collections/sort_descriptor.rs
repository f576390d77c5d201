//! Composable comparators for ordering elements.
//!
//! A [`SortDescriptor`] compares two values and answers with a
//! [`SortDescriptorResult`]. Descriptors are chained as a slice: the chain
//! evaluates each descriptor in turn and stops at the first one that can tell
//! the values apart.
//!
//! # Example
//!
//! ```
//! use horizon_results::collections::{SortDescriptor, SortUsing};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Child { group: &'static str, order: u32 }
//!
//! let chain = [
//!     SortDescriptor::by_key(|c: &Child| c.group, true),
//!     SortDescriptor::by_key(|c: &Child| c.order, false),
//! ];
//!
//! let mut children = vec![
//!     Child { group: "b", order: 1 },
//!     Child { group: "a", order: 1 },
//!     Child { group: "a", order: 2 },
//! ];
//! children.sort_using(&chain);
//!
//! assert_eq!(children[0], Child { group: "a", order: 2 });
//! assert_eq!(children[2], Child { group: "b", order: 1 });
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// The result of comparing two values with a sort descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDescriptorResult {
    /// Neither value sorts before the other.
    Same,
    /// The first value sorts before the second.
    Ascending,
    /// The first value sorts after the second.
    Descending,
}

impl SortDescriptorResult {
    /// Swap `Ascending` and `Descending`.
    pub fn reverse(self) -> Self {
        match self {
            Self::Same => Self::Same,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl From<bool> for SortDescriptorResult {
    /// `true` reads as "sorts before".
    fn from(before: bool) -> Self {
        if before {
            Self::Ascending
        } else {
            Self::Descending
        }
    }
}

impl From<Ordering> for SortDescriptorResult {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Self::Ascending,
            Ordering::Equal => Self::Same,
            Ordering::Greater => Self::Descending,
        }
    }
}

impl From<SortDescriptorResult> for Ordering {
    fn from(result: SortDescriptorResult) -> Self {
        match result {
            SortDescriptorResult::Ascending => Ordering::Less,
            SortDescriptorResult::Same => Ordering::Equal,
            SortDescriptorResult::Descending => Ordering::Greater,
        }
    }
}

type Comparator<T> = Arc<dyn Fn(&T, &T) -> SortDescriptorResult + Send + Sync>;

/// A reusable comparator for values of type `T`.
///
/// Cloning a descriptor is cheap; the comparator itself is shared.
pub struct SortDescriptor<T> {
    comparator: Comparator<T>,
    ascending: bool,
}

impl<T> Clone for SortDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            comparator: Arc::clone(&self.comparator),
            ascending: self.ascending,
        }
    }
}

impl<T> fmt::Debug for SortDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortDescriptor")
            .field("ascending", &self.ascending)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> SortDescriptor<T> {
    /// Create a descriptor from an arbitrary comparator.
    pub fn new<F>(comparator: F) -> Self
    where
        F: Fn(&T, &T) -> SortDescriptorResult + Send + Sync + 'static,
    {
        Self {
            comparator: Arc::new(comparator),
            ascending: true,
        }
    }

    /// Create a descriptor that orders by an extracted key.
    ///
    /// With `ascending == false` larger keys sort first.
    pub fn by_key<K, F>(key: F, ascending: bool) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        Self {
            comparator: Arc::new(move |a, b| key(a).cmp(&key(b)).into()),
            ascending,
        }
    }

    /// Compare two values.
    #[inline]
    pub fn compare(&self, a: &T, b: &T) -> SortDescriptorResult {
        let result = (self.comparator)(a, b);
        if self.ascending { result } else { result.reverse() }
    }

    /// Whether this descriptor keeps the comparator's natural direction.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// A descriptor with the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            comparator: Arc::clone(&self.comparator),
            ascending: !self.ascending,
        }
    }
}

impl<T: Ord + 'static> SortDescriptor<T> {
    /// Natural ordering, smallest first.
    pub fn ascending() -> Self {
        Self::new(|a: &T, b: &T| a.cmp(b).into())
    }

    /// Natural ordering, largest first.
    pub fn descending() -> Self {
        Self::ascending().reversed()
    }
}

/// Evaluation of a chain of sort descriptors.
pub trait SortDescriptors<T> {
    /// Compare two values with each descriptor in turn, returning the first
    /// result that is not [`SortDescriptorResult::Same`].
    fn compare(&self, a: &T, b: &T) -> SortDescriptorResult;

    /// `true` if `a` sorts strictly before `b`.
    fn is_before(&self, a: &T, b: &T) -> bool {
        self.compare(a, b) == SortDescriptorResult::Ascending
    }
}

impl<T: 'static> SortDescriptors<T> for [SortDescriptor<T>] {
    fn compare(&self, a: &T, b: &T) -> SortDescriptorResult {
        if let [only] = self {
            return only.compare(a, b);
        }
        self.iter()
            .map(|descriptor| descriptor.compare(a, b))
            .find(|result| *result != SortDescriptorResult::Same)
            .unwrap_or(SortDescriptorResult::Same)
    }
}

/// In-place sorting of a `Vec` with sort descriptors.
pub trait SortUsing<T> {
    /// Stable sort by a descriptor chain.
    fn sort_using(&mut self, descriptors: &[SortDescriptor<T>]);

    /// Stable sort by a single descriptor.
    fn sort_using_descriptor(&mut self, descriptor: &SortDescriptor<T>);

    /// Insert `value` before the first element it sorts strictly before,
    /// or append it. Returns the index it was inserted at.
    ///
    /// Applied to a chain-sorted vector this keeps it sorted, with the new
    /// value placed after any equal elements.
    fn insert_using(&mut self, value: T, descriptors: &[SortDescriptor<T>]) -> usize;
}

impl<T: 'static> SortUsing<T> for Vec<T> {
    fn sort_using(&mut self, descriptors: &[SortDescriptor<T>]) {
        if let [only] = descriptors {
            return self.sort_using_descriptor(only);
        }
        self.sort_by(|a, b| descriptors.compare(a, b).into());
    }

    fn sort_using_descriptor(&mut self, descriptor: &SortDescriptor<T>) {
        self.sort_by(|a, b| descriptor.compare(a, b).into());
    }

    fn insert_using(&mut self, value: T, descriptors: &[SortDescriptor<T>]) -> usize {
        let index = if descriptors.is_empty() {
            self.len()
        } else {
            self.iter()
                .position(|existing| descriptors.is_before(&value, existing))
                .unwrap_or(self.len())
        };
        self.insert(index, value);
        index
    }
}

/// Sorted copies of any iterator.
pub trait SortedUsing<T>: Iterator<Item = T> + Sized {
    /// Collect and stable-sort by a descriptor chain.
    fn sorted_using(self, descriptors: &[SortDescriptor<T>]) -> Vec<T>;

    /// Collect and stable-sort by a single descriptor.
    fn sorted_using_descriptor(self, descriptor: &SortDescriptor<T>) -> Vec<T>;
}

impl<T: 'static, I: Iterator<Item = T>> SortedUsing<T> for I {
    fn sorted_using(self, descriptors: &[SortDescriptor<T>]) -> Vec<T> {
        let mut values: Vec<T> = self.collect();
        values.sort_using(descriptors);
        values
    }

    fn sorted_using_descriptor(self, descriptor: &SortDescriptor<T>) -> Vec<T> {
        let mut values: Vec<T> = self.collect();
        values.sort_using_descriptor(descriptor);
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        group: u8,
        order: u8,
        name: &'static str,
    }

    fn row(group: u8, order: u8, name: &'static str) -> Row {
        Row { group, order, name }
    }

    fn rows() -> Vec<Row> {
        vec![
            row(2, 1, "e"),
            row(1, 2, "b"),
            row(2, 0, "d"),
            row(1, 2, "c"),
            row(1, 1, "a"),
        ]
    }

    fn chain() -> Vec<SortDescriptor<Row>> {
        vec![
            SortDescriptor::by_key(|r: &Row| r.group, true),
            SortDescriptor::by_key(|r: &Row| r.order, true),
        ]
    }

    fn names(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.name).collect()
    }

    #[test]
    fn test_result_conversions() {
        assert_eq!(SortDescriptorResult::from(true), SortDescriptorResult::Ascending);
        assert_eq!(SortDescriptorResult::from(false), SortDescriptorResult::Descending);
        assert_eq!(SortDescriptorResult::from(Ordering::Equal), SortDescriptorResult::Same);
        assert_eq!(Ordering::from(SortDescriptorResult::Descending), Ordering::Greater);
        assert_eq!(
            SortDescriptorResult::Ascending.reverse(),
            SortDescriptorResult::Descending
        );
    }

    #[test]
    fn test_ascending_and_descending() {
        let asc = SortDescriptor::<i32>::ascending();
        let desc = SortDescriptor::<i32>::descending();
        assert!(asc.is_ascending());
        assert!(!desc.is_ascending());
        assert_eq!(asc.compare(&1, &2), SortDescriptorResult::Ascending);
        assert_eq!(desc.compare(&1, &2), SortDescriptorResult::Descending);
        assert_eq!(desc.compare(&2, &2), SortDescriptorResult::Same);

        let mut values = vec![3, 1, 2];
        values.sort_using_descriptor(&desc);
        assert_eq!(values, vec![3, 2, 1]);
    }

    #[test]
    fn test_reversed_by_key() {
        let by_order = SortDescriptor::by_key(|r: &Row| r.order, true);
        let reversed = by_order.reversed();
        let (a, b) = (row(0, 1, "x"), row(0, 2, "y"));
        assert_eq!(by_order.compare(&a, &b), SortDescriptorResult::Ascending);
        assert_eq!(reversed.compare(&a, &b), SortDescriptorResult::Descending);
        assert!(reversed.reversed().is_ascending());
    }

    #[test]
    fn test_chain_short_circuits() {
        let chain = chain();
        assert_eq!(
            chain.compare(&row(1, 9, "x"), &row(2, 0, "y")),
            SortDescriptorResult::Ascending
        );
        assert_eq!(
            chain.compare(&row(1, 2, "x"), &row(1, 1, "y")),
            SortDescriptorResult::Descending
        );
        assert_eq!(
            chain.compare(&row(1, 2, "x"), &row(1, 2, "y")),
            SortDescriptorResult::Same
        );
        assert!(chain.is_before(&row(0, 0, "x"), &row(0, 1, "y")));

        let empty: [SortDescriptor<Row>; 0] = [];
        assert_eq!(empty.compare(&row(0, 0, "x"), &row(9, 9, "y")), SortDescriptorResult::Same);
    }

    #[test]
    fn test_single_descriptor_chain_matches_descriptor() {
        let descriptor = SortDescriptor::by_key(|r: &Row| r.order, false);
        let chain = [descriptor.clone()];
        let rows = rows();
        for a in &rows {
            for b in &rows {
                assert_eq!(chain.compare(a, b), descriptor.compare(a, b));
            }
        }

        let via_chain = rows.clone().into_iter().sorted_using(&chain);
        let via_descriptor = rows.into_iter().sorted_using_descriptor(&descriptor);
        assert_eq!(via_chain, via_descriptor);
    }

    #[test]
    fn test_sort_using_is_stable() {
        let mut rows = rows();
        rows.sort_using(&chain());
        assert_eq!(names(&rows), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_insert_using_keeps_order() {
        let chain = chain();
        let mut rows = rows().into_iter().sorted_using(&chain);

        assert_eq!(rows.insert_using(row(1, 2, "c2"), &chain), 3);
        assert_eq!(rows.insert_using(row(0, 0, "first"), &chain), 0);
        assert_eq!(rows.insert_using(row(9, 0, "last"), &chain), 7);
        assert_eq!(
            names(&rows),
            vec!["first", "a", "b", "c", "c2", "d", "e", "last"]
        );
    }

    #[test]
    fn test_insert_using_empty_chain_appends() {
        let mut values = vec![3, 1];
        assert_eq!(values.insert_using(0, &[]), 2);
        assert_eq!(values, vec![3, 1, 0]);
    }

    #[test]
    fn test_custom_comparator() {
        let by_len = SortDescriptor::new(|a: &&str, b: &&str| a.len().cmp(&b.len()).into());
        let sorted = ["ccc", "a", "bb"].into_iter().sorted_using_descriptor(&by_len);
        assert_eq!(sorted, vec!["a", "bb", "ccc"]);
    }
}
