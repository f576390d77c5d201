//! Horizon Results - sectioned, ordered results with minimal change
//! reconciliation.
//!
//! The crate keeps a set of elements grouped into sorted sections and, for
//! every batch of changes, computes the section and object insertions,
//! deletions, moves and updates that turn the old content into the new one.
//!
//! - [`collections`]: `OrderedSet` and sort descriptors
//! - [`diff`]: the `ChangeSet` diff engine
//! - [`controller`]: `ResultsController` and its change events
//!
//! # Example
//!
//! ```
//! use horizon_results::prelude::*;
//!
//! let controller = ResultsController::<u32, u32>::builder()
//!     .section_key(|n: &u32| Some(n / 10))
//!     .sort_descriptors(vec![SortDescriptor::ascending()])
//!     .build();
//!
//! controller.signals().object_changed.connect(|change| {
//!     println!("{:?} {:?}", change.object, change.kind);
//! });
//!
//! controller.insert_objects([3, 14, 1]).unwrap();
//! assert_eq!(controller.sections(), vec![Some(0), Some(1)]);
//!
//! let changes = controller.update_objects([14]).unwrap();
//! assert_eq!(changes.object_changes[0].kind, ChangeKind::Update);
//! assert_eq!(changes.object_changes[0].at, Some(IndexPath::new(1, 0)));
//! ```

pub use horizon_results_core::*;

pub mod collections;
pub mod controller;
pub mod diff;
pub mod prelude;
