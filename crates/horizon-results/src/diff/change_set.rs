//! Edit scripts between two ordered sequences.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use horizon_results_core::logging::{span_names, targets};
use lis::LisExt;
use horizon_results_core::{Result, ResultsError};

use super::edit::{Edit, EditOperation};
use crate::collections::OrderedSet;

/// Where an edit lives inside a [`ChangeSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Deletion(usize),
    Insertion(usize),
    Substitution(usize),
    Move(usize),
}

impl Slot {
    fn of<T>(edit: &Edit<T>) -> Self {
        match edit.operation {
            EditOperation::Deletion => Slot::Deletion(edit.index),
            EditOperation::Insertion => Slot::Insertion(edit.index),
            EditOperation::Substitution => Slot::Substitution(edit.index),
            EditOperation::Move { .. } => Slot::Move(edit.index),
        }
    }
}

/// The edits that turn a source sequence into a target sequence.
///
/// A change set is computed in two steps. [`compute`](Self::compute) records
/// every value that leaves its place as a tentative deletion plus a tentative
/// insertion; [`reduce_edits`](Self::reduce_edits) then folds each such pair
/// into a single move. [`between`](Self::between) does both.
///
/// Indices follow the canonical application order used by
/// [`apply`](Self::apply): deletions and move origins address the source,
/// insertions and move destinations address the target.
///
/// # Example
///
/// ```
/// use horizon_results::collections::OrderedSet;
/// use horizon_results::diff::{ChangeSet, Edit};
/// use std::collections::HashSet;
///
/// let source: OrderedSet<char> = "abcd".chars().collect();
/// let target: OrderedSet<char> = "acbe".chars().collect();
/// let changes = ChangeSet::between(&source, &target, &HashSet::new());
///
/// assert_eq!(
///     changes.edits(),
///     vec![
///         Edit::deletion('d', 3),
///         Edit::moved('b', 1, 2),
///         Edit::insertion('e', 3),
///     ]
/// );
/// assert_eq!(changes.apply(&source.to_vec()).unwrap(), target.to_vec());
/// ```
#[derive(Debug, Clone)]
pub struct ChangeSet<T> {
    deletions: BTreeMap<usize, T>,
    insertions: BTreeMap<usize, T>,
    substitutions: BTreeMap<usize, T>,
    /// Keyed by target index; holds (origin, value).
    moves: BTreeMap<usize, (usize, T)>,
    /// Move origin -> move target.
    move_origins: HashMap<usize, usize>,
    by_value: HashMap<T, Vec<Slot>>,
    force_updates: HashSet<T>,
    reduced: bool,
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            deletions: BTreeMap::new(),
            insertions: BTreeMap::new(),
            substitutions: BTreeMap::new(),
            moves: BTreeMap::new(),
            move_origins: HashMap::new(),
            by_value: HashMap::new(),
            force_updates: HashSet::new(),
            reduced: false,
        }
    }
}

impl<T: Clone + Eq + Hash> ChangeSet<T> {
    /// An empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the tentative edits from `source` to `target`.
    ///
    /// Values kept in place are a longest increasing subsequence of their
    /// target positions taken in source order. Every other common value is
    /// recorded as a deletion plus an insertion until
    /// [`reduce_edits`](Self::reduce_edits) runs. Values of
    /// `force_updates` that stay in place become substitutions.
    pub fn compute(
        source: &OrderedSet<T>,
        target: &OrderedSet<T>,
        force_updates: &HashSet<T>,
    ) -> Self {
        let _span = tracing::trace_span!(
            target: targets::DIFF,
            span_names::DIFF,
            source_len = source.len(),
            target_len = target.len()
        )
        .entered();
        let mut set = Self::new();
        let mut common: Vec<(usize, usize)> = Vec::new();

        for (index, value) in source.iter().enumerate() {
            match target.index_of(value) {
                Some(target_index) => common.push((index, target_index)),
                None => {
                    set.insert(Edit::deletion(value.clone(), index));
                }
            }
        }
        for (index, value) in target.iter().enumerate() {
            if !source.contains(value) {
                set.insert(Edit::insertion(value.clone(), index));
            }
        }

        let positions: Vec<usize> = common.iter().map(|&(_, t)| t).collect();
        let stationary = stationary_members(&positions);

        for (k, &(origin, destination)) in common.iter().enumerate() {
            let value = &source[origin];
            if force_updates.contains(value) {
                set.force_updates.insert(value.clone());
            }
            if stationary[k] {
                if force_updates.contains(value) {
                    set.insert(Edit::substitution(value.clone(), origin));
                }
            } else {
                set.insert(Edit::deletion(value.clone(), origin));
                set.insert(Edit::insertion(value.clone(), destination));
            }
        }

        tracing::trace!(
            target: targets::DIFF,
            deletions = set.deletions.len(),
            insertions = set.insertions.len(),
            substitutions = set.substitutions.len(),
            "computed tentative edits"
        );
        set
    }

    /// Compute and reduce the edits from `source` to `target`.
    pub fn between(
        source: &OrderedSet<T>,
        target: &OrderedSet<T>,
        force_updates: &HashSet<T>,
    ) -> Self {
        let mut set = Self::compute(source, target, force_updates);
        set.reduce_edits();
        set
    }

    /// Fold every value that is both deleted and inserted into one move.
    ///
    /// A move whose origin and destination coincide once the other removals
    /// before the origin and the other additions before the destination are
    /// discounted is dropped, or turned into a substitution if the value was
    /// force-updated.
    pub fn reduce_edits(&mut self) {
        let mut removals: Vec<usize> = self
            .deletions
            .keys()
            .chain(self.move_origins.keys())
            .copied()
            .collect();
        removals.sort_unstable();
        let mut additions: Vec<usize> = self
            .insertions
            .keys()
            .chain(self.moves.keys())
            .copied()
            .collect();
        additions.sort_unstable();

        let mut pairs: Vec<(T, usize, usize)> = self
            .by_value
            .iter()
            .filter_map(|(value, slots)| {
                let origin = slots.iter().find_map(|slot| match slot {
                    Slot::Deletion(index) => Some(*index),
                    _ => None,
                })?;
                let destination = slots.iter().find_map(|slot| match slot {
                    Slot::Insertion(index) => Some(*index),
                    _ => None,
                })?;
                Some((value.clone(), origin, destination))
            })
            .collect();
        pairs.sort_unstable_by_key(|&(_, _, destination)| destination);

        let mut collapsed = 0usize;
        let mut dropped = 0usize;
        for (value, origin, destination) in pairs {
            self.take(Slot::Deletion(origin));
            self.take(Slot::Insertion(destination));

            let removed_below = removals.partition_point(|&index| index < origin);
            let added_below = additions.partition_point(|&index| index < destination);
            if origin - removed_below == destination - added_below {
                dropped += 1;
                if self.force_updates.contains(&value) {
                    self.insert(Edit::substitution(value, origin));
                }
            } else {
                collapsed += 1;
                self.insert(Edit::moved(value, origin, destination));
            }
        }

        self.reduced = true;
        tracing::trace!(target: targets::DIFF, collapsed, dropped, "reduced edits");
    }

    /// Add an edit, replacing any edit at the same place.
    ///
    /// Returns the replaced edit.
    pub fn insert(&mut self, edit: Edit<T>) -> Option<Edit<T>> {
        let slot = Slot::of(&edit);
        let mut replaced = self.take(slot);
        match edit.operation {
            EditOperation::Deletion => {
                self.deletions.insert(edit.index, edit.value.clone());
            }
            EditOperation::Insertion => {
                self.insertions.insert(edit.index, edit.value.clone());
            }
            EditOperation::Substitution => {
                self.substitutions.insert(edit.index, edit.value.clone());
            }
            EditOperation::Move { origin } => {
                if let Some(&previous) = self.move_origins.get(&origin) {
                    replaced = replaced.or(self.take(Slot::Move(previous)));
                }
                self.moves.insert(edit.index, (origin, edit.value.clone()));
                self.move_origins.insert(origin, edit.index);
            }
        }
        self.by_value.entry(edit.value).or_default().push(slot);
        replaced
    }

    /// Remove `edit` if this set contains exactly that edit.
    pub fn remove(&mut self, edit: &Edit<T>) -> bool {
        let slot = Slot::of(edit);
        if self.edit_at(slot).as_ref() == Some(edit) {
            self.take(slot);
            true
        } else {
            false
        }
    }

    /// The edit recorded for `value`.
    ///
    /// Before reduction a relocated value has both a deletion and an
    /// insertion; the deletion is returned. See [`edits_for`](Self::edits_for).
    pub fn edit_for(&self, value: &T) -> Option<Edit<T>> {
        self.by_value
            .get(value)
            .and_then(|slots| slots.first())
            .and_then(|&slot| self.edit_at(slot))
    }

    /// Every edit recorded for `value`.
    pub fn edits_for(&self, value: &T) -> Vec<Edit<T>> {
        self.by_value
            .get(value)
            .map(|slots| slots.iter().filter_map(|&slot| self.edit_at(slot)).collect())
            .unwrap_or_default()
    }

    /// The edit that consumes source index `index`, if any.
    pub fn edit_with_source(&self, index: usize) -> Option<Edit<T>> {
        if let Some(value) = self.deletions.get(&index) {
            return Some(Edit::deletion(value.clone(), index));
        }
        if let Some(value) = self.substitutions.get(&index) {
            return Some(Edit::substitution(value.clone(), index));
        }
        self.move_origins
            .get(&index)
            .and_then(|&target| self.edit_at(Slot::Move(target)))
    }

    /// All edits in delivery order: deletions, substitutions, moves and
    /// insertions, each ascending by index.
    pub fn edits(&self) -> Vec<Edit<T>> {
        self.deletions()
            .chain(self.substitutions())
            .chain(self.moves())
            .chain(self.insertions())
            .collect()
    }

    /// Deletions, ascending by source index.
    pub fn deletions(&self) -> impl Iterator<Item = Edit<T>> + '_ {
        self.deletions
            .iter()
            .map(|(&index, value)| Edit::deletion(value.clone(), index))
    }

    /// Insertions, ascending by target index.
    pub fn insertions(&self) -> impl Iterator<Item = Edit<T>> + '_ {
        self.insertions
            .iter()
            .map(|(&index, value)| Edit::insertion(value.clone(), index))
    }

    /// Substitutions, ascending by source index.
    pub fn substitutions(&self) -> impl Iterator<Item = Edit<T>> + '_ {
        self.substitutions
            .iter()
            .map(|(&index, value)| Edit::substitution(value.clone(), index))
    }

    /// Moves, ascending by target index.
    pub fn moves(&self) -> impl Iterator<Item = Edit<T>> + '_ {
        self.moves
            .iter()
            .map(|(&index, (origin, value))| Edit::moved(value.clone(), *origin, index))
    }

    /// Total number of edits.
    pub fn len(&self) -> usize {
        self.deletions.len() + self.insertions.len() + self.substitutions.len() + self.moves.len()
    }

    /// Returns `true` if there are no edits.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once [`reduce_edits`](Self::reduce_edits) has run.
    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    /// Apply the edits to `source` in canonical order.
    ///
    /// Deletions and move origins are removed by descending source index,
    /// then insertions and move destinations are inserted by ascending
    /// target index.
    ///
    /// # Errors
    ///
    /// Returns [`ResultsError::IndexOutOfRange`] if an edit addresses a
    /// position that does not exist, which means the set was not computed
    /// against `source`.
    pub fn apply(&self, source: &[T]) -> Result<Vec<T>> {
        let mut values = source.to_vec();

        let mut removals: Vec<usize> = self
            .deletions
            .keys()
            .chain(self.move_origins.keys())
            .copied()
            .collect();
        removals.sort_unstable();
        for &index in removals.iter().rev() {
            if index >= values.len() {
                return Err(ResultsError::out_of_range(index, values.len()));
            }
            values.remove(index);
        }

        let mut additions: Vec<(usize, &T)> = self
            .insertions
            .iter()
            .map(|(&index, value)| (index, value))
            .chain(self.moves.iter().map(|(&index, (_, value))| (index, value)))
            .collect();
        additions.sort_unstable_by_key(|&(index, _)| index);
        for (index, value) in additions {
            if index > values.len() {
                return Err(ResultsError::out_of_range(index, values.len()));
            }
            values.insert(index, value.clone());
        }

        Ok(values)
    }

    fn edit_at(&self, slot: Slot) -> Option<Edit<T>> {
        match slot {
            Slot::Deletion(index) => self
                .deletions
                .get(&index)
                .map(|value| Edit::deletion(value.clone(), index)),
            Slot::Insertion(index) => self
                .insertions
                .get(&index)
                .map(|value| Edit::insertion(value.clone(), index)),
            Slot::Substitution(index) => self
                .substitutions
                .get(&index)
                .map(|value| Edit::substitution(value.clone(), index)),
            Slot::Move(index) => self
                .moves
                .get(&index)
                .map(|(origin, value)| Edit::moved(value.clone(), *origin, index)),
        }
    }

    fn take(&mut self, slot: Slot) -> Option<Edit<T>> {
        let edit = match slot {
            Slot::Deletion(index) => self
                .deletions
                .remove(&index)
                .map(|value| Edit::deletion(value, index)),
            Slot::Insertion(index) => self
                .insertions
                .remove(&index)
                .map(|value| Edit::insertion(value, index)),
            Slot::Substitution(index) => self
                .substitutions
                .remove(&index)
                .map(|value| Edit::substitution(value, index)),
            Slot::Move(index) => self.moves.remove(&index).map(|(origin, value)| {
                self.move_origins.remove(&origin);
                Edit::moved(value, origin, index)
            }),
        }?;

        if let Some(slots) = self.by_value.get_mut(&edit.value) {
            slots.retain(|s| *s != slot);
            if slots.is_empty() {
                self.by_value.remove(&edit.value);
            }
        }
        Some(edit)
    }
}

/// Marks the members of a longest strictly increasing subsequence.
///
/// Among equally long subsequences the one ending in the most recently
/// seen pile top wins, so later values with smaller targets stay put.
fn stationary_members(positions: &[usize]) -> Vec<bool> {
    let mut keep = vec![false; positions.len()];
    for index in positions.longest_increasing_subsequence() {
        keep[index] = true;
    }
    keep
}
