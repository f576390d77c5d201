//! Change events and the signals that deliver them.

use horizon_results_core::Signal;
use horizon_results_core::logging::targets;

use super::IndexPath;

/// What happened to a section, object or placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Inserted at `to`; the change has no old position.
    Insert {
        /// Position after the batch.
        to: IndexPath,
    },
    /// Removed from its old position.
    Delete,
    /// Changed in place.
    Update,
    /// Moved from its old position to `to`.
    Move {
        /// Position after the batch.
        to: IndexPath,
    },
}

impl ChangeKind {
    /// The position after the batch, for insertions and moves.
    pub fn destination(&self) -> Option<IndexPath> {
        match *self {
            ChangeKind::Insert { to } | ChangeKind::Move { to } => Some(to),
            ChangeKind::Delete | ChangeKind::Update => None,
        }
    }
}

/// A change to a whole section.
///
/// Section positions use [`IndexPath::for_section`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionChange<S> {
    /// The section value (`None` for the implicit section).
    pub section: Option<S>,
    /// Position before the batch; `None` for insertions.
    pub at: Option<IndexPath>,
    /// What happened.
    pub kind: ChangeKind,
}

/// A change to a single object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectChange<T> {
    /// The object.
    pub object: T,
    /// Position before the batch; `None` for insertions.
    pub at: Option<IndexPath>,
    /// What happened.
    pub kind: ChangeKind,
}

/// A change to the synthetic placeholder item shown while there is no
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderChange {
    /// Position before the batch; `None` for insertions.
    pub at: Option<IndexPath>,
    /// What happened.
    pub kind: ChangeKind,
}

/// Everything one change batch did to the content, in delivery order.
///
/// Old positions (`at`) refer to the content before the batch; new
/// positions (`to`) refer to the content after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentChanges<S, T> {
    /// Section deletions, updates, moves and insertions, in that order.
    pub section_changes: Vec<SectionChange<S>>,
    /// Object deletions, updates, moves and insertions, in that order.
    pub object_changes: Vec<ObjectChange<T>>,
    /// Placeholder changes; only produced with the empty placeholder enabled.
    pub placeholder_changes: Vec<PlaceholderChange>,
}

impl<S, T> Default for ContentChanges<S, T> {
    fn default() -> Self {
        Self {
            section_changes: Vec::new(),
            object_changes: Vec::new(),
            placeholder_changes: Vec::new(),
        }
    }
}

impl<S, T> ContentChanges<S, T> {
    /// Number of section and object changes.
    pub fn pending_change_count(&self) -> usize {
        self.section_changes.len() + self.object_changes.len()
    }

    /// Returns `true` if the batch changed nothing.
    pub fn is_empty(&self) -> bool {
        self.pending_change_count() == 0 && self.placeholder_changes.is_empty()
    }
}

/// Signals emitted by a results controller.
///
/// For every batch that changes something, the controller emits
/// `will_change_content`, then each section change, each object change and
/// each placeholder change, then `did_change_content`. Slots may query the
/// controller but must not mutate it.
pub struct ControllerSignals<S, T> {
    /// Emitted before the first change of a batch.
    pub will_change_content: Signal<()>,

    /// Emitted for each section inserted, deleted, updated or moved.
    pub section_changed: Signal<SectionChange<S>>,

    /// Emitted for each object inserted, deleted, updated or moved.
    pub object_changed: Signal<ObjectChange<T>>,

    /// Emitted when the empty placeholder appears or disappears.
    pub placeholder_changed: Signal<PlaceholderChange>,

    /// Emitted after the last change of a batch.
    pub did_change_content: Signal<()>,
}

impl<S: 'static, T: 'static> Default for ControllerSignals<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static, T: 'static> ControllerSignals<S, T> {
    /// Creates a new set of controller signals.
    pub fn new() -> Self {
        Self {
            will_change_content: Signal::new(),
            section_changed: Signal::new(),
            object_changed: Signal::new(),
            placeholder_changed: Signal::new(),
            did_change_content: Signal::new(),
        }
    }

    /// Disconnect every slot from every signal.
    pub fn disconnect_all(&self) {
        self.will_change_content.disconnect_all();
        self.section_changed.disconnect_all();
        self.object_changed.disconnect_all();
        self.placeholder_changed.disconnect_all();
        self.did_change_content.disconnect_all();
    }

    /// Emit a batch's changes in delivery order.
    ///
    /// Does nothing if `changes` is empty.
    pub fn emit_content_changes(&self, changes: &ContentChanges<S, T>)
    where
        S: Clone,
        T: Clone,
    {
        if changes.is_empty() {
            return;
        }
        tracing::debug!(
            target: targets::CONTROLLER,
            sections = changes.section_changes.len(),
            objects = changes.object_changes.len(),
            placeholders = changes.placeholder_changes.len(),
            "delivering content changes"
        );

        self.will_change_content.emit(());
        for change in &changes.section_changes {
            self.section_changed.emit(change.clone());
        }
        for change in &changes.object_changes {
            self.object_changed.emit(change.clone());
        }
        for change in &changes.placeholder_changes {
            self.placeholder_changed.emit(*change);
        }
        self.did_change_content.emit(());
    }
}
