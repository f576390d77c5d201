//! Sectioned results controllers.
//!
//! A [`ResultsController`] keeps elements grouped into ordered sections and
//! turns each [`ChangeBatch`] into the minimal set of section and object
//! changes a collection view needs to animate.
//!
//! # Core Types
//!
//! - `ResultsController`: owns the content and reconciles change batches
//! - `SectionInfo`: one section value plus its ordered objects
//! - `IndexPath`: a (section, item) address
//! - `ChangeBatch`: deletions, insertions, updates and manual moves
//! - `ContentChanges`: the reconciled section, object and placeholder changes
//! - `ControllerSignals`: signals the changes are delivered through
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐     ┌───────────────────┐     ┌────────────────┐
//! │ ChangeBatch │────>│ ResultsController │────>│ ContentChanges │
//! └─────────────┘     │ (ChangeSet per    │     └────────────────┘
//!                     │  section)         │             │
//!                     └───────────────────┘             v
//!                                              ┌───────────────────┐
//!                                              │ ControllerSignals │
//!                                              └───────────────────┘
//! ```

use std::hash::Hash;

mod batch;
mod index_path;
mod results_controller;
mod section_info;
mod signals;

pub use batch::ChangeBatch;
pub use index_path::IndexPath;
pub use results_controller::{
    CompareFn, ControllerConfig, ResultsController, ResultsControllerBuilder, SectionKeyFn,
};
pub use section_info::SectionInfo;
pub use signals::{
    ChangeKind, ContentChanges, ControllerSignals, ObjectChange, PlaceholderChange, SectionChange,
};

/// Values a results controller can hold.
///
/// Elements are identified by equality and hashing; two equal elements are
/// the same element.
pub trait Element: Clone + Eq + Hash + Send + Sync + 'static {}

impl<T: Clone + Eq + Hash + Send + Sync + 'static> Element for T {}

/// Values that name a section. Sections are ordered by their value.
pub trait SectionValue: Element + Ord {}

impl<S: Element + Ord> SectionValue for S {}
