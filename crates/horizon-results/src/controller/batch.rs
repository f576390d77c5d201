//! Element-level change batches fed to a results controller.

use super::IndexPath;

/// A set of element changes applied to a controller in one step.
///
/// Changes are processed in a fixed order regardless of the order they were
/// added in: deletions, then insertions, then manual moves, then updates.
///
/// # Example
///
/// ```
/// use horizon_results::controller::{ChangeBatch, IndexPath};
///
/// let batch = ChangeBatch::new()
///     .delete("old")
///     .insert_all(["new", "newer"])
///     .update("renamed")
///     .move_object("pinned", IndexPath::new(0, 0));
///
/// assert_eq!(batch.len(), 5);
/// assert_eq!(batch.inserted(), &["new", "newer"]);
/// ```
#[derive(Debug, Clone)]
pub struct ChangeBatch<T> {
    deleted: Vec<T>,
    inserted: Vec<T>,
    updated: Vec<T>,
    moved: Vec<(T, IndexPath)>,
}

impl<T> Default for ChangeBatch<T> {
    fn default() -> Self {
        Self {
            deleted: Vec::new(),
            inserted: Vec::new(),
            updated: Vec::new(),
            moved: Vec::new(),
        }
    }
}

impl<T> ChangeBatch<T> {
    /// An empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove `object` from the content.
    pub fn delete(mut self, object: T) -> Self {
        self.deleted.push(object);
        self
    }

    /// Remove every object of `objects`.
    pub fn delete_all<I: IntoIterator<Item = T>>(mut self, objects: I) -> Self {
        self.deleted.extend(objects);
        self
    }

    /// Add `object` to the content.
    pub fn insert(mut self, object: T) -> Self {
        self.inserted.push(object);
        self
    }

    /// Add every object of `objects`.
    pub fn insert_all<I: IntoIterator<Item = T>>(mut self, objects: I) -> Self {
        self.inserted.extend(objects);
        self
    }

    /// Report that `object` changed; its section and position are
    /// re-evaluated.
    pub fn update(mut self, object: T) -> Self {
        self.updated.push(object);
        self
    }

    /// Report changes to every object of `objects`.
    pub fn update_all<I: IntoIterator<Item = T>>(mut self, objects: I) -> Self {
        self.updated.extend(objects);
        self
    }

    /// Move `object` to an explicit position.
    pub fn move_object(mut self, object: T, to: IndexPath) -> Self {
        self.moved.push((object, to));
        self
    }

    /// Objects to delete.
    pub fn deleted(&self) -> &[T] {
        &self.deleted
    }

    /// Objects to insert.
    pub fn inserted(&self) -> &[T] {
        &self.inserted
    }

    /// Objects reported as updated.
    pub fn updated(&self) -> &[T] {
        &self.updated
    }

    /// Manual moves.
    pub fn moved(&self) -> &[(T, IndexPath)] {
        &self.moved
    }

    /// Total number of changes in the batch.
    pub fn len(&self) -> usize {
        self.deleted.len() + self.inserted.len() + self.updated.len() + self.moved.len()
    }

    /// Returns `true` if the batch holds no changes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_parts(self) -> (Vec<T>, Vec<T>, Vec<(T, IndexPath)>, Vec<T>) {
        (self.deleted, self.inserted, self.moved, self.updated)
    }
}
