//! A single step of an edit script.

/// The kind of an [`Edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOperation {
    /// The value is added at `index` in the target.
    Insertion,
    /// The value at `index` in the source is removed.
    Deletion,
    /// The value at `index` in the source stays but must be reported as
    /// changed.
    Substitution,
    /// The value at `origin` in the source ends up at `index` in the target.
    Move {
        /// Index of the value in the source.
        origin: usize,
    },
}

/// An operation on one value, with the index it applies to.
///
/// Deletions and substitutions index into the source sequence; insertions
/// and move destinations index into the target sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edit<T> {
    /// What happens to the value.
    pub operation: EditOperation,
    /// The value being edited.
    pub value: T,
    /// Source index for deletions and substitutions, target index otherwise.
    pub index: usize,
}

impl<T> Edit<T> {
    /// An insertion at target index `index`.
    pub fn insertion(value: T, index: usize) -> Self {
        Self {
            operation: EditOperation::Insertion,
            value,
            index,
        }
    }

    /// A deletion at source index `index`.
    pub fn deletion(value: T, index: usize) -> Self {
        Self {
            operation: EditOperation::Deletion,
            value,
            index,
        }
    }

    /// A substitution at source index `index`.
    pub fn substitution(value: T, index: usize) -> Self {
        Self {
            operation: EditOperation::Substitution,
            value,
            index,
        }
    }

    /// A move from source index `origin` to target index `index`.
    pub fn moved(value: T, origin: usize, index: usize) -> Self {
        Self {
            operation: EditOperation::Move { origin },
            value,
            index,
        }
    }

    /// The source index this edit consumes, if any.
    pub fn source_index(&self) -> Option<usize> {
        match self.operation {
            EditOperation::Deletion | EditOperation::Substitution => Some(self.index),
            EditOperation::Move { origin } => Some(origin),
            EditOperation::Insertion => None,
        }
    }

    /// The target index this edit produces, if any.
    pub fn target_index(&self) -> Option<usize> {
        match self.operation {
            EditOperation::Insertion | EditOperation::Move { .. } => Some(self.index),
            EditOperation::Deletion | EditOperation::Substitution => None,
        }
    }

    /// Returns `true` for [`EditOperation::Move`].
    pub fn is_move(&self) -> bool {
        matches!(self.operation, EditOperation::Move { .. })
    }
}
