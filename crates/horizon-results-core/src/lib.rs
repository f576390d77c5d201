//! Core systems for Horizon Results.
//!
//! This crate provides the foundational pieces shared by the Horizon Results
//! collections and results controllers:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Errors**: The recoverable [`ResultsError`] taxonomy
//! - **Logging**: Tracing targets, span names and content tree debugging
//! - **Thread Checks**: Single-writer affinity and re-entrancy detection
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_results_core::Signal;
//!
//! // A signal carrying the number of objects in a section
//! let count_changed = Signal::<usize>::new();
//!
//! let conn_id = count_changed.connect(|count| {
//!     println!("section now holds {} objects", count);
//! });
//!
//! count_changed.emit(12);
//! count_changed.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;
pub mod thread_check;

pub use error::{Result, ResultsError};
pub use logging::{ContentTreeDebug, PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::{DispatchGuard, DispatchState, ThreadAffinity};
