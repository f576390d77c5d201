//! Diffing of ordered sequences.
//!
//! [`ChangeSet::between`] computes the insertions, deletions, moves and
//! substitutions that turn one [`OrderedSet`](crate::collections::OrderedSet)
//! into another. The results controller runs it once per edited section and
//! once more over the section keys.

mod change_set;
mod edit;

pub use change_set::ChangeSet;
pub use edit::{Edit, EditOperation};
