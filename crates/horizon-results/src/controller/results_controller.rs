//! The sectioned results controller.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use horizon_results_core::logging::{span_names, targets};
use horizon_results_core::{
    ContentTreeDebug, DispatchState, PerfSpan, Result, ResultsError, ThreadAffinity,
    TreeFormatOptions,
};
use indexmap::IndexMap;
use parking_lot::RwLock;

use super::{
    ChangeBatch, ChangeKind, ContentChanges, ControllerSignals, Element, IndexPath, ObjectChange,
    PlaceholderChange, SectionChange, SectionInfo, SectionValue,
};
use crate::collections::{OrderedSet, SortDescriptor};
use crate::diff::{ChangeSet, Edit, EditOperation};

/// Extracts the section an element belongs to.
pub type SectionKeyFn<S, T> = Arc<dyn Fn(&T) -> Option<S> + Send + Sync>;

/// Orders two elements within a section.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Plain configuration flags of a controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Report a synthetic placeholder item while there are no sections.
    pub has_empty_placeholder: bool,
}

struct State<S, T> {
    sections: OrderedSet<Option<S>>,
    infos: HashMap<Option<S>, SectionInfo<S, T>>,
    object_sections: HashMap<T, Option<S>>,
    /// Section keys before the first structural change of the current batch.
    sections_snapshot: Option<OrderedSet<Option<S>>>,
    section_key: Option<SectionKeyFn<S, T>>,
    sort_by: Option<CompareFn<T>>,
    sort_descriptors: Vec<SortDescriptor<T>>,
    config: ControllerConfig,
}

/// Keeps sectioned, ordered content and reports how each change batch
/// affects it.
///
/// Content is loaded with [`set_content`](Self::set_content) and then
/// changed with [`apply`](Self::apply). Every batch is reconciled into the
/// section and object changes a collection view needs to animate from the
/// old content to the new one: deletions and updates at their old index
/// paths, moves from old to new index paths, insertions at their new index
/// paths. The same changes are returned as [`ContentChanges`] and emitted
/// through [`signals`](Self::signals).
///
/// Elements are grouped with the section key function (without one, every
/// element lives in a single `None` section). Sections are ordered by their
/// value. Within a section elements are ordered by the custom comparator if
/// one is set, otherwise by the sort descriptors, otherwise they keep the
/// order they were added in.
///
/// # Threading
///
/// The controller may be shared behind an `Arc`, but changes must come from
/// the thread that created it. Signal slots may query the controller; they
/// must not mutate it.
///
/// # Example
///
/// ```
/// use horizon_results::controller::{ChangeBatch, ChangeKind, IndexPath, ResultsController};
///
/// let controller = ResultsController::<char, &str>::builder()
///     .section_key(|name: &&str| name.chars().next())
///     .sort_by(|a: &&str, b: &&str| a.cmp(b))
///     .build();
/// controller.set_content([(Some('a'), vec!["apple", "avocado"]), (Some('b'), vec!["banana"])]);
///
/// let changes = controller
///     .apply(ChangeBatch::new().insert("apricot").delete("banana"))
///     .unwrap();
///
/// // Section 'b' became empty and is removed; "apricot" lands at (0, 1).
/// assert_eq!(changes.section_changes[0].kind, ChangeKind::Delete);
/// assert_eq!(
///     changes.object_changes[0].kind,
///     ChangeKind::Insert { to: IndexPath::new(0, 1) }
/// );
/// assert_eq!(controller.number_of_sections(), 1);
/// ```
pub struct ResultsController<S, T> {
    state: RwLock<State<S, T>>,
    signals: ControllerSignals<S, T>,
    affinity: ThreadAffinity,
    dispatch: DispatchState,
}

impl<S: SectionValue, T: Element> Default for ResultsController<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SectionValue, T: Element> ResultsController<S, T> {
    /// A controller with a single implicit section and insertion order.
    pub fn new() -> Self {
        Self::with_state(State::new(None, None, Vec::new(), ControllerConfig::default()))
    }

    /// Start configuring a controller.
    pub fn builder() -> ResultsControllerBuilder<S, T> {
        ResultsControllerBuilder::new()
    }

    fn with_state(state: State<S, T>) -> Self {
        Self {
            state: RwLock::new(state),
            signals: ControllerSignals::new(),
            affinity: ThreadAffinity::current(),
            dispatch: DispatchState::new(),
        }
    }

    /// The signals change batches are reported through.
    pub fn signals(&self) -> &ControllerSignals<S, T> {
        &self.signals
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    /// Fetching is not available; content is supplied by the caller.
    ///
    /// # Errors
    ///
    /// Always returns [`ResultsError::OperationNotAvailable`].
    pub fn perform_fetch(&self) -> Result<()> {
        Err(ResultsError::not_available(
            "perform_fetch",
            "content is supplied through set_content and apply",
        ))
    }

    /// Replace all content without reporting changes.
    ///
    /// Objects keep the order they are given in. Sections are ordered by
    /// their value; repeated section values are merged and sections without
    /// objects are dropped. An object that appears more than once is only
    /// kept at its first occurrence.
    pub fn set_content<I>(&self, content: I)
    where
        I: IntoIterator<Item = (Option<S>, Vec<T>)>,
    {
        self.begin_mutation("set_content");
        let mut state = self.state.write();
        state.clear();

        let mut grouped: IndexMap<Option<S>, Vec<T>> = IndexMap::new();
        for (key, objects) in content {
            for object in objects {
                if state.object_sections.contains_key(&object) {
                    tracing::warn!(
                        target: targets::CONTROLLER,
                        "object appears more than once in content; keeping the first"
                    );
                    continue;
                }
                state.object_sections.insert(object.clone(), key.clone());
                grouped.entry(key.clone()).or_default().push(object);
            }
        }

        for (key, objects) in grouped {
            state.sections.add(key.clone());
            state
                .infos
                .insert(key.clone(), SectionInfo::with_objects(key, objects));
        }
        state.sections.sort();

        tracing::debug!(
            target: targets::CONTROLLER,
            sections = state.sections.len(),
            objects = state.object_sections.len(),
            "content replaced"
        );
    }

    /// Remove all content without reporting changes.
    pub fn reset(&self) {
        self.begin_mutation("reset");
        self.state.write().clear();
        tracing::debug!(target: targets::CONTROLLER, "controller reset");
    }

    /// Apply a change batch and report its effect.
    ///
    /// Signals are emitted after the content has been updated and the
    /// internal lock released. An empty batch, or one that changes nothing,
    /// emits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ResultsError::InvalidIndexPath`] if a manual move targets a
    /// section that does not exist or an item slot past its end. The batch
    /// is validated before anything changes.
    ///
    /// # Panics
    ///
    /// Panics if called from a signal slot of this controller.
    pub fn apply(&self, batch: ChangeBatch<T>) -> Result<ContentChanges<S, T>> {
        self.begin_mutation("apply");
        if batch.is_empty() {
            return Ok(ContentChanges::default());
        }

        let changes = {
            let _span = tracing::debug_span!(
                target: targets::CONTROLLER,
                span_names::RECONCILE,
                batch = batch.len()
            )
            .entered();
            let _perf = PerfSpan::new("reconcile");
            self.state.write().apply_batch(batch)?
        };

        self.deliver(&changes);
        Ok(changes)
    }

    /// Apply a batch that only deletes `objects`.
    pub fn delete_objects<I>(&self, objects: I) -> Result<ContentChanges<S, T>>
    where
        I: IntoIterator<Item = T>,
    {
        self.apply(ChangeBatch::new().delete_all(objects))
    }

    /// Apply a batch that only inserts `objects`.
    pub fn insert_objects<I>(&self, objects: I) -> Result<ContentChanges<S, T>>
    where
        I: IntoIterator<Item = T>,
    {
        self.apply(ChangeBatch::new().insert_all(objects))
    }

    /// Apply a batch that only reports `objects` as updated.
    pub fn update_objects<I>(&self, objects: I) -> Result<ContentChanges<S, T>>
    where
        I: IntoIterator<Item = T>,
    {
        self.apply(ChangeBatch::new().update_all(objects))
    }

    /// Apply a batch that moves `object` to `to`.
    ///
    /// Intended for controllers without a sort order; a configured order is
    /// applied again the next time the section is sorted.
    pub fn move_object(&self, object: T, to: IndexPath) -> Result<ContentChanges<S, T>> {
        self.apply(ChangeBatch::new().move_object(object, to))
    }

    fn begin_mutation(&self, operation: &str) {
        self.dispatch.assert_idle(operation);
        self.affinity
            .debug_assert_same_thread_with_msg("results controller mutated from another thread");
    }

    fn deliver(&self, changes: &ContentChanges<S, T>) {
        if changes.is_empty() {
            return;
        }
        let _span = tracing::trace_span!(target: targets::CONTROLLER, span_names::DISPATCH).entered();
        let _guard = self.dispatch.enter();
        self.signals.emit_content_changes(changes);
    }

    // -------------------------------------------------------------------------
    // Configuration
    // -------------------------------------------------------------------------

    /// Order elements with a custom comparator.
    ///
    /// Takes precedence over the sort descriptors. Applies from the next
    /// time a section is sorted.
    pub fn set_sort_by<F>(&self, compare: F)
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.begin_mutation("set_sort_by");
        self.state.write().sort_by = Some(Arc::new(compare));
    }

    /// Remove the custom comparator and the sort descriptors.
    pub fn clear_sort(&self) {
        self.begin_mutation("clear_sort");
        let mut state = self.state.write();
        state.sort_by = None;
        state.sort_descriptors.clear();
    }

    /// Order elements with a descriptor chain.
    pub fn set_sort_descriptors(&self, descriptors: Vec<SortDescriptor<T>>) {
        self.begin_mutation("set_sort_descriptors");
        self.state.write().sort_descriptors = descriptors;
    }

    /// Group elements with `key`. Existing content is not regrouped.
    pub fn set_section_key<F>(&self, key: F)
    where
        F: Fn(&T) -> Option<S> + Send + Sync + 'static,
    {
        self.begin_mutation("set_section_key");
        self.state.write().section_key = Some(Arc::new(key));
    }

    /// Put every new element in the implicit `None` section.
    pub fn clear_section_key(&self) {
        self.begin_mutation("clear_section_key");
        self.state.write().section_key = None;
    }

    /// Enable or disable placeholder changes.
    pub fn set_empty_placeholder(&self, enabled: bool) {
        self.begin_mutation("set_empty_placeholder");
        self.state.write().config.has_empty_placeholder = enabled;
    }

    /// The current configuration flags.
    pub fn config(&self) -> ControllerConfig {
        self.state.read().config
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Number of sections.
    pub fn number_of_sections(&self) -> usize {
        self.state.read().sections.len()
    }

    /// Number of objects in `section`; 0 if there is no such section.
    pub fn number_of_objects(&self, section: usize) -> usize {
        let state = self.state.read();
        state.info_at(section).map_or(0, SectionInfo::len)
    }

    /// The object at `index_path`.
    pub fn object_at(&self, index_path: IndexPath) -> Option<T> {
        let state = self.state.read();
        state
            .info_at(index_path.section)
            .and_then(|info| info.object_at(index_path.item))
            .cloned()
    }

    /// A copy of the section at `section`.
    pub fn section_info(&self, section: usize) -> Option<SectionInfo<S, T>> {
        self.state.read().info_at(section).cloned()
    }

    /// The value of the section at `section`.
    ///
    /// The outer `None` means there is no such section; `Some(None)` is the
    /// implicit section.
    pub fn section_value(&self, section: usize) -> Option<Option<S>> {
        self.state.read().sections.get(section).cloned()
    }

    /// Where `object` is.
    pub fn index_path_of(&self, object: &T) -> Option<IndexPath> {
        let state = self.state.read();
        let key = state.object_sections.get(object)?;
        let section = state.sections.index_of(key)?;
        let item = state.infos.get(key)?.index_of(object)?;
        Some(IndexPath::new(section, item))
    }

    /// The position of the section with `value`.
    pub fn index_path_of_section(&self, value: &Option<S>) -> Option<IndexPath> {
        self.state
            .read()
            .sections
            .index_of(value)
            .map(IndexPath::for_section)
    }

    /// Section values in order.
    pub fn sections(&self) -> Vec<Option<S>> {
        self.state.read().sections.to_vec()
    }

    /// Every object, section by section.
    pub fn all_objects(&self) -> Vec<T> {
        let state = self.state.read();
        state
            .sections
            .iter()
            .filter_map(|key| state.infos.get(key))
            .flat_map(|info| info.objects().iter().cloned())
            .collect()
    }

    /// Returns `true` if `object` is part of the content.
    pub fn contains(&self, object: &T) -> bool {
        self.state.read().object_sections.contains_key(object)
    }

    /// Returns `true` if there is no content.
    pub fn is_empty(&self) -> bool {
        self.state.read().object_sections.is_empty()
    }

    /// Render the content as a tree for debugging.
    pub fn debug_tree(&self) -> String
    where
        S: Debug,
        T: Debug,
    {
        self.debug_tree_with(TreeFormatOptions::default())
    }

    /// Render the content as a tree with custom options.
    pub fn debug_tree_with(&self, options: TreeFormatOptions) -> String
    where
        S: Debug,
        T: Debug,
    {
        let state = self.state.read();
        let content: Vec<(String, Vec<String>)> = state
            .sections
            .iter()
            .filter_map(|key| state.infos.get(key))
            .map(|info| {
                let label = match info.value() {
                    Some(value) => format!("{value:?}"),
                    None => "(unsectioned)".to_string(),
                };
                let objects = info.objects().iter().map(|o| format!("{o:?}")).collect();
                (label, objects)
            })
            .collect();
        ContentTreeDebug::with_options(options).format(&content)
    }
}

/// Builder for [`ResultsController`].
pub struct ResultsControllerBuilder<S, T> {
    section_key: Option<SectionKeyFn<S, T>>,
    sort_by: Option<CompareFn<T>>,
    sort_descriptors: Vec<SortDescriptor<T>>,
    config: ControllerConfig,
}

impl<S: SectionValue, T: Element> Default for ResultsControllerBuilder<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SectionValue, T: Element> ResultsControllerBuilder<S, T> {
    /// A builder for an unsectioned, unsorted controller.
    pub fn new() -> Self {
        Self {
            section_key: None,
            sort_by: None,
            sort_descriptors: Vec::new(),
            config: ControllerConfig::default(),
        }
    }

    /// Group elements by the value `key` returns.
    pub fn section_key<F>(mut self, key: F) -> Self
    where
        F: Fn(&T) -> Option<S> + Send + Sync + 'static,
    {
        self.section_key = Some(Arc::new(key));
        self
    }

    /// Order elements within a section with a descriptor chain.
    pub fn sort_descriptors(mut self, descriptors: Vec<SortDescriptor<T>>) -> Self {
        self.sort_descriptors = descriptors;
        self
    }

    /// Order elements within a section with a comparator. Overrides the
    /// sort descriptors.
    pub fn sort_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.sort_by = Some(Arc::new(compare));
        self
    }

    /// Report placeholder changes when the content becomes empty or stops
    /// being empty.
    pub fn empty_placeholder(mut self, enabled: bool) -> Self {
        self.config.has_empty_placeholder = enabled;
        self
    }

    /// Builds the controller.
    pub fn build(self) -> ResultsController<S, T> {
        ResultsController::with_state(State::new(
            self.section_key,
            self.sort_by,
            self.sort_descriptors,
            self.config,
        ))
    }
}

impl<S: SectionValue, T: Element> State<S, T> {
    fn new(
        section_key: Option<SectionKeyFn<S, T>>,
        sort_by: Option<CompareFn<T>>,
        sort_descriptors: Vec<SortDescriptor<T>>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            sections: OrderedSet::new(),
            infos: HashMap::new(),
            object_sections: HashMap::new(),
            sections_snapshot: None,
            section_key,
            sort_by,
            sort_descriptors,
            config,
        }
    }

    fn clear(&mut self) {
        self.sections.clear();
        self.infos.clear();
        self.object_sections.clear();
        self.sections_snapshot = None;
    }

    fn info_at(&self, section: usize) -> Option<&SectionInfo<S, T>> {
        self.sections
            .get(section)
            .and_then(|key| self.infos.get(key))
    }

    fn section_for(&self, object: &T) -> Option<S> {
        self.section_key.as_ref().and_then(|key| key(object))
    }

    /// Section keys as they were before the current batch.
    fn old_sections(&self) -> &OrderedSet<Option<S>> {
        self.sections_snapshot.as_ref().unwrap_or(&self.sections)
    }

    fn is_new_section(&self, key: &Option<S>) -> bool {
        self.sections_snapshot
            .as_ref()
            .is_some_and(|old| !old.contains(key))
    }

    fn record_sections_snapshot(&mut self) {
        if self.sections_snapshot.is_none() {
            self.sections_snapshot = Some(self.sections.clone());
        }
    }

    fn remove_section(&mut self, key: &Option<S>) {
        self.record_sections_snapshot();
        self.sections.remove(key);
        self.infos.remove(key);
    }

    /// The section `key`, created if missing. Sections that existed before
    /// the batch are put into editing.
    fn open_section(&mut self, key: Option<S>) -> &mut SectionInfo<S, T> {
        let existed = self.infos.contains_key(&key);
        if !existed {
            self.record_sections_snapshot();
            self.sections.add(key.clone());
        }
        let editable = existed && !self.is_new_section(&key);
        let info = self
            .infos
            .entry(key.clone())
            .or_insert_with(|| SectionInfo::new(key));
        if editable {
            info.ensure_editing();
        }
        info
    }

    /// Like [`open_section`](Self::open_section) but never creates.
    fn open_existing(&mut self, key: &Option<S>) -> Option<&mut SectionInfo<S, T>> {
        let editable = !self.is_new_section(key);
        let info = self.infos.get_mut(key)?;
        if editable {
            info.ensure_editing();
        }
        Some(info)
    }

    /// The position `object` had before the batch.
    fn original_index_path(&self, object: &T, key: &Option<S>) -> Option<IndexPath> {
        let section = self.old_sections().index_of(key)?;
        let item = self.infos.get(key)?.original_index_of(object)?;
        Some(IndexPath::new(section, item))
    }

    fn resolve_moves(&self, moved: Vec<(T, IndexPath)>) -> Result<Vec<(T, Option<S>, usize)>> {
        moved
            .into_iter()
            .map(|(object, to)| {
                let invalid = || ResultsError::invalid_index_path(to.section, to.item);
                let key = self.sections.get(to.section).ok_or_else(invalid)?;
                let info = self.infos.get(key).ok_or_else(invalid)?;
                let last_slot = if info.contains(&object) {
                    info.len() - 1
                } else {
                    info.len()
                };
                if to.item > last_slot {
                    return Err(invalid());
                }
                Ok((object, key.clone(), to.item))
            })
            .collect()
    }

    fn apply_batch(&mut self, batch: ChangeBatch<T>) -> Result<ContentChanges<S, T>> {
        let (deleted, inserted, moved, updated) = batch.into_parts();
        let moves = self.resolve_moves(moved)?;
        self.sections_snapshot = None;

        let mut force_updates: HashSet<T> = HashSet::new();
        let mut inserted_now: HashSet<T> = HashSet::new();
        let mut candidates: IndexMap<T, IndexPath> = IndexMap::new();

        for object in deleted {
            let Some(key) = self.object_sections.remove(&object) else {
                tracing::trace!(target: targets::CONTROLLER, "skipping deletion of unknown object");
                continue;
            };
            if let Some(info) = self.open_existing(&key) {
                info.remove(&object);
            }
        }

        for object in inserted {
            if self.object_sections.contains_key(&object) {
                tracing::trace!(target: targets::CONTROLLER, "skipping insertion of known object");
                continue;
            }
            let key = self.section_for(&object);
            self.open_section(key.clone()).add(object.clone());
            self.object_sections.insert(object.clone(), key);
            inserted_now.insert(object);
        }

        for (object, key, item) in moves {
            let Some(from) = self.object_sections.get(&object).cloned() else {
                tracing::trace!(target: targets::CONTROLLER, "skipping move of unknown object");
                continue;
            };
            if from == key {
                if let Some(info) = self.open_existing(&key) {
                    let last = info.len().saturating_sub(1);
                    info.move_to(&object, item.min(last))?;
                }
                continue;
            }

            let old_path = self.original_index_path(&object, &from);
            if let Some(info) = self.open_existing(&from) {
                info.remove(&object);
            }
            let info = self.open_section(key.clone());
            let slot = item.min(info.len());
            info.insert(object.clone(), slot)?;
            self.object_sections.insert(object.clone(), key);
            if let Some(path) = old_path.filter(|_| !inserted_now.contains(&object)) {
                candidates.entry(object).or_insert(path);
            }
        }

        for object in updated {
            let Some(from) = self.object_sections.get(&object).cloned() else {
                tracing::trace!(target: targets::CONTROLLER, "skipping update of unknown object");
                continue;
            };
            let key = self.section_for(&object);
            if key == from {
                if let Some(info) = self.open_existing(&key) {
                    info.mark_needs_sort();
                }
                force_updates.insert(object);
                continue;
            }

            let old_path = self.original_index_path(&object, &from);
            if let Some(info) = self.open_existing(&from) {
                info.remove(&object);
            }
            self.open_section(key.clone()).add(object.clone());
            self.object_sections.insert(object.clone(), key);
            if let Some(path) = old_path.filter(|_| !inserted_now.contains(&object)) {
                candidates.entry(object).or_insert(path);
            }
        }

        Ok(self.reconcile(&force_updates, candidates))
    }

    fn sort_section(&mut self, key: &Option<S>) {
        let Some(info) = self.infos.get_mut(key) else {
            return;
        };
        match &self.sort_by {
            Some(compare) => info.sort_by(|a, b| compare(a, b)),
            None => info.sort_using(&self.sort_descriptors),
        }
    }

    fn reconcile(
        &mut self,
        force_updates: &HashSet<T>,
        candidates: IndexMap<T, IndexPath>,
    ) -> ContentChanges<S, T> {
        // Pass 1: sort and close every touched section.
        let mut change_sets: HashMap<Option<S>, ChangeSet<T>> = HashMap::new();
        for key in self.sections.to_vec() {
            if self.infos.get(&key).is_some_and(SectionInfo::needs_sort) {
                self.sort_section(&key);
            }
            let Some(info) = self.infos.get_mut(&key) else {
                continue;
            };
            if info.is_empty() {
                self.remove_section(&key);
                continue;
            }
            if info.is_editing() {
                let mut changes = info.end_editing(force_updates);
                changes.reduce_edits();
                change_sets.insert(key, changes);
            }
        }

        // Sections.
        let old_sections = self.sections_snapshot.take();
        let mut section_changes = Vec::new();
        if let Some(old) = &old_sections {
            self.sections.sort();
            let changes = ChangeSet::between(old, &self.sections, &HashSet::new());
            section_changes = changes
                .edits()
                .into_iter()
                .map(section_change)
                .collect();
        }
        let old_index = |key: &Option<S>| {
            old_sections
                .as_ref()
                .unwrap_or(&self.sections)
                .index_of(key)
        };

        // Pass 2: merge cross-section moves.
        let mut moves: Vec<ObjectChange<T>> = Vec::new();
        for (object, old_path) in candidates {
            let Some(key) = self.object_sections.get(&object) else {
                continue;
            };
            if old_sections.as_ref().is_some_and(|old| !old.contains(key)) {
                // Covered by the section insertion.
                continue;
            }
            let origin = old_sections
                .as_ref()
                .unwrap_or(&self.sections)
                .get(old_path.section)
                .cloned();
            if origin.as_ref() == Some(key) {
                continue;
            }
            let (Some(section), Some(item)) = (
                self.sections.index_of(key),
                self.infos.get(key).and_then(|info| info.index_of(&object)),
            ) else {
                continue;
            };

            if let Some(changes) = change_sets.get_mut(key) {
                changes.remove(&Edit::insertion(object.clone(), item));
            }
            if let Some(changes) = origin.as_ref().and_then(|o| change_sets.get_mut(o)) {
                changes.remove(&Edit::deletion(object.clone(), old_path.item));
            }
            moves.push(ObjectChange {
                object,
                at: Some(old_path),
                kind: ChangeKind::Move {
                    to: IndexPath::new(section, item),
                },
            });
        }

        // Object changes of the surviving sections.
        let mut deletions = Vec::new();
        let mut updates = Vec::new();
        let mut insertions = Vec::new();
        for (key, changes) in &change_sets {
            let (Some(old_section), Some(new_section)) = (old_index(key), self.sections.index_of(key))
            else {
                continue;
            };
            for edit in changes.edits() {
                match edit.operation {
                    EditOperation::Deletion => deletions.push(ObjectChange {
                        object: edit.value,
                        at: Some(IndexPath::new(old_section, edit.index)),
                        kind: ChangeKind::Delete,
                    }),
                    EditOperation::Substitution => updates.push(ObjectChange {
                        object: edit.value,
                        at: Some(IndexPath::new(old_section, edit.index)),
                        kind: ChangeKind::Update,
                    }),
                    EditOperation::Move { origin } => moves.push(ObjectChange {
                        object: edit.value,
                        at: Some(IndexPath::new(old_section, origin)),
                        kind: ChangeKind::Move {
                            to: IndexPath::new(new_section, edit.index),
                        },
                    }),
                    EditOperation::Insertion => insertions.push(ObjectChange {
                        object: edit.value,
                        at: None,
                        kind: ChangeKind::Insert {
                            to: IndexPath::new(new_section, edit.index),
                        },
                    }),
                }
            }
        }
        deletions.sort_by_key(|change| change.at);
        updates.sort_by_key(|change| change.at);
        moves.sort_by_key(|change| change.kind.destination());
        insertions.sort_by_key(|change| change.kind.destination());

        let mut object_changes = deletions;
        object_changes.append(&mut updates);
        object_changes.append(&mut moves);
        object_changes.append(&mut insertions);

        let mut placeholder_changes = Vec::new();
        if self.config.has_empty_placeholder {
            if let Some(old) = &old_sections {
                if old.is_empty() && !self.sections.is_empty() {
                    placeholder_changes.push(PlaceholderChange {
                        at: Some(IndexPath::zero()),
                        kind: ChangeKind::Delete,
                    });
                } else if !old.is_empty() && self.sections.is_empty() {
                    placeholder_changes.push(PlaceholderChange {
                        at: None,
                        kind: ChangeKind::Insert {
                            to: IndexPath::zero(),
                        },
                    });
                }
            }
        }

        tracing::debug!(
            target: targets::CONTROLLER,
            sections = section_changes.len(),
            objects = object_changes.len(),
            placeholders = placeholder_changes.len(),
            "batch reconciled"
        );

        ContentChanges {
            section_changes,
            object_changes,
            placeholder_changes,
        }
    }
}

fn section_change<S>(edit: Edit<Option<S>>) -> SectionChange<S> {
    let (at, kind) = match edit.operation {
        EditOperation::Deletion => (Some(IndexPath::for_section(edit.index)), ChangeKind::Delete),
        EditOperation::Substitution => {
            (Some(IndexPath::for_section(edit.index)), ChangeKind::Update)
        }
        EditOperation::Move { origin } => (
            Some(IndexPath::for_section(origin)),
            ChangeKind::Move {
                to: IndexPath::for_section(edit.index),
            },
        ),
        EditOperation::Insertion => (
            None,
            ChangeKind::Insert {
                to: IndexPath::for_section(edit.index),
            },
        ),
    };
    SectionChange {
        section: edit.value,
        at,
        kind,
    }
}

static_assertions::assert_impl_all!(ResultsController<String, u64>: Send, Sync);
