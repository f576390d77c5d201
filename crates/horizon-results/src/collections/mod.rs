//! Ordered collections used by the results controller.
//!
//! - [`OrderedSet`]: unique values in an explicit order with O(1) lookups
//! - [`SortDescriptor`]: a comparator; slices of them form a sort chain
//! - [`SortUsing`] / [`SortedUsing`]: sorting `Vec`s and iterators by a chain

mod ordered_set;
mod sort_descriptor;

pub use ordered_set::OrderedSet;
pub use sort_descriptor::{
    SortDescriptor, SortDescriptorResult, SortDescriptors, SortUsing, SortedUsing,
};
