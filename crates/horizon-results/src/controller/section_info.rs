//! A single section of a results controller.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use horizon_results_core::Result;
use horizon_results_core::logging::targets;

use crate::collections::{OrderedSet, SortDescriptor, SortDescriptors};
use crate::diff::ChangeSet;

/// A section value plus the ordered objects that belong to it.
///
/// A `None` value is the single implicit section of an unsectioned
/// controller. Equality, hashing and ordering only look at the value, with
/// `None` ordered before every `Some`.
///
/// # Editing
///
/// [`begin_editing`](Self::begin_editing) snapshots the members; after any
/// number of [`add`](Self::add) and [`remove`](Self::remove) calls,
/// [`end_editing`](Self::end_editing) diffs the snapshot against the live
/// members. Adding to a non-empty section marks it as needing a sort, and
/// the section must be sorted before editing can end.
///
/// ```
/// use horizon_results::collections::SortDescriptor;
/// use horizon_results::controller::SectionInfo;
/// use std::collections::HashSet;
///
/// let mut section = SectionInfo::with_objects(Some("fruit"), ["pear", "apple"]);
/// section.begin_editing();
/// section.add("fig");
/// section.sort_using(&[SortDescriptor::ascending()]);
/// let changes = section.end_editing(&HashSet::new());
///
/// assert_eq!(section.objects().to_vec(), vec!["apple", "fig", "pear"]);
/// assert!(!changes.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SectionInfo<S, T> {
    value: Option<S>,
    objects: OrderedSet<T>,
    snapshot: Option<OrderedSet<T>>,
    needs_sort: bool,
}

impl<S, T: Clone + Eq + Hash + 'static> SectionInfo<S, T> {
    /// An empty section.
    pub fn new(value: Option<S>) -> Self {
        Self {
            value,
            objects: OrderedSet::new(),
            snapshot: None,
            needs_sort: false,
        }
    }

    /// A section holding `objects` in the given order.
    pub fn with_objects<I>(value: Option<S>, objects: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self {
            value,
            objects: objects.into_iter().collect(),
            snapshot: None,
            needs_sort: false,
        }
    }

    /// The section value, `None` for the implicit section.
    pub fn value(&self) -> Option<&S> {
        self.value.as_ref()
    }

    /// The section key as stored by the controller.
    pub fn key(&self) -> &Option<S> {
        &self.value
    }

    /// Number of objects in the section.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the section has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// The objects, in display order.
    pub fn objects(&self) -> &OrderedSet<T> {
        &self.objects
    }

    /// The object at `item`.
    pub fn object_at(&self, item: usize) -> Option<&T> {
        self.objects.get(item)
    }

    /// The item index of `object`.
    pub fn index_of(&self, object: &T) -> Option<usize> {
        self.objects.index_of(object)
    }

    /// The item index `object` had when editing began, or its current index
    /// if the section is not editing.
    pub fn original_index_of(&self, object: &T) -> Option<usize> {
        self.snapshot.as_ref().unwrap_or(&self.objects).index_of(object)
    }

    /// Returns `true` if `object` belongs to this section.
    pub fn contains(&self, object: &T) -> bool {
        self.objects.contains(object)
    }

    /// Returns `true` between `begin_editing` and `end_editing`.
    pub fn is_editing(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Returns `true` if the section must be sorted before editing ends.
    pub fn needs_sort(&self) -> bool {
        self.needs_sort
    }

    /// Start an editing transaction.
    ///
    /// # Panics
    ///
    /// Panics if the section is already editing.
    pub fn begin_editing(&mut self) {
        assert!(
            !self.is_editing(),
            "begin_editing() called on a section that is already editing"
        );
        tracing::trace!(target: targets::SECTION, len = self.objects.len(), "begin editing");
        self.snapshot = Some(self.objects.clone());
    }

    /// Start an editing transaction unless one is already open.
    pub fn ensure_editing(&mut self) {
        if !self.is_editing() {
            self.begin_editing();
        }
    }

    /// Append `object` if absent and return its index.
    ///
    /// Adding to a section that already has objects marks it as needing a
    /// sort.
    pub fn add(&mut self, object: T) -> usize {
        if !self.objects.is_empty() {
            self.needs_sort = true;
        }
        self.objects.add(object)
    }

    /// Insert `object` at an explicit position without marking a sort.
    ///
    /// # Errors
    ///
    /// Fails if `item` is past the end of the section.
    pub fn insert(&mut self, object: T, item: usize) -> Result<usize> {
        self.objects.insert(object, item)
    }

    /// Reposition `object` to `item` without marking a sort.
    ///
    /// Returns the previous index, or `Ok(None)` if the object is not in the
    /// section.
    ///
    /// # Errors
    ///
    /// Fails if `item` is not an existing position.
    pub fn move_to(&mut self, object: &T, item: usize) -> Result<Option<usize>> {
        self.objects.move_to(object, item)
    }

    /// Remove `object`, returning the index it had.
    pub fn remove(&mut self, object: &T) -> Option<usize> {
        self.objects.remove(object)
    }

    /// Flag the section as needing a sort.
    pub fn mark_needs_sort(&mut self) {
        self.needs_sort = true;
    }

    /// Sort the objects with a comparator and clear the sort flag.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.objects.sort_by(compare);
        self.needs_sort = false;
    }

    /// Sort the objects with a descriptor chain and clear the sort flag.
    ///
    /// An empty chain keeps the current order.
    pub fn sort_using(&mut self, descriptors: &[SortDescriptor<T>]) {
        if !descriptors.is_empty() {
            self.objects
                .sort_by(|a, b| descriptors.compare(a, b).into());
        }
        self.needs_sort = false;
    }

    /// Close the editing transaction and diff the snapshot against the
    /// current objects.
    ///
    /// Objects in `force_updates` that keep their place are reported as
    /// substitutions. The returned set is not reduced yet.
    ///
    /// # Panics
    ///
    /// Panics if the section is not editing or still needs a sort.
    pub fn end_editing(&mut self, force_updates: &HashSet<T>) -> ChangeSet<T> {
        assert!(
            !self.needs_sort,
            "end_editing() called but the section still needs to be sorted"
        );
        let Some(snapshot) = self.snapshot.take() else {
            panic!("end_editing() called without a matching begin_editing()");
        };
        let changes = ChangeSet::compute(&snapshot, &self.objects, force_updates);
        tracing::trace!(target: targets::SECTION, edits = changes.len(), "end editing");
        changes
    }
}

impl<S: PartialEq, T> PartialEq for SectionInfo<S, T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<S: Eq, T> Eq for SectionInfo<S, T> {}

impl<S: Hash, T> Hash for SectionInfo<S, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<S: Ord, T> PartialOrd for SectionInfo<S, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: Ord, T> Ord for SectionInfo<S, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}
