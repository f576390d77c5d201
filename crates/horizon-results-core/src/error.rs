//! Error types for Horizon Results.
//!
//! Only recoverable failures are represented here. Broken orchestration
//! invariants (ending an edit that never began, re-entrant mutation during
//! change dispatch) panic instead, since they indicate a bug in the caller
//! rather than bad input.

/// Result type alias for Horizon Results operations.
pub type Result<T> = std::result::Result<T, ResultsError>;

/// Errors that can occur when working with ordered sets and results controllers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResultsError {
    /// The requested operation is not supported by this controller.
    #[error("{operation} is not available: {reason}")]
    OperationNotAvailable {
        operation: &'static str,
        reason: &'static str,
    },

    /// A positional index was past the end of the collection.
    #[error("index {index} is out of range for a collection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// An index path did not address an existing section or a valid item slot.
    #[error("invalid index path (section {section}, item {item})")]
    InvalidIndexPath { section: usize, item: usize },
}

impl ResultsError {
    /// Create an operation-not-available error.
    pub fn not_available(operation: &'static str, reason: &'static str) -> Self {
        Self::OperationNotAvailable { operation, reason }
    }

    /// Create an index-out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create an invalid-index-path error.
    pub fn invalid_index_path(section: usize, item: usize) -> Self {
        Self::InvalidIndexPath { section, item }
    }
}
