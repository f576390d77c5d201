//! Prelude module for Horizon Results.
//!
//! ```ignore
//! use horizon_results::prelude::*;
//! ```

// ============================================================================
// Core
// ============================================================================

pub use crate::{Result, ResultsError, Signal};

// ============================================================================
// Collections and Diffing
// ============================================================================

pub use crate::collections::{
    OrderedSet, SortDescriptor, SortDescriptorResult, SortDescriptors, SortUsing, SortedUsing,
};
pub use crate::diff::{ChangeSet, Edit, EditOperation};

// ============================================================================
// Controller
// ============================================================================

pub use crate::controller::{
    ChangeBatch, ChangeKind, ContentChanges, IndexPath, ObjectChange, PlaceholderChange,
    ResultsController, SectionChange, SectionInfo,
};
