//! Thread and re-entrancy verification utilities for Horizon Results.
//!
//! Results controllers follow a single-writer, single-consumer model: one
//! thread accumulates and reconciles change batches, and change callbacks
//! must not feed new mutations back into the controller while they are
//! being delivered. This module provides the runtime checks for both rules.
//!
//! - [`ThreadAffinity`] records the thread an object was created on and
//!   asserts that later mutations happen on the same thread.
//! - [`DispatchState`] tracks whether change callbacks are currently being
//!   delivered, and panics if a mutating entry point is called meanwhile.
//!
//! ```
//! use horizon_results_core::thread_check::DispatchState;
//!
//! let dispatch = DispatchState::new();
//! dispatch.assert_idle("apply");
//! {
//!     let _guard = dispatch.enter();
//!     assert!(dispatch.is_dispatching());
//! }
//! assert!(!dispatch.is_dispatching());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Thread affinity tracker for objects.
///
/// This struct records the thread on which an object was created and provides
/// methods to verify that subsequent operations occur on the same thread.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Create a new thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Assert that we are on the same thread, with a custom message.
    ///
    /// # Panics
    ///
    /// Panics if called from a different thread.
    pub fn assert_same_thread_with_msg(&self, msg: &str) {
        if !self.is_same_thread() {
            self.panic_wrong_thread(msg);
        }
    }

    /// Debug-only assertion with a custom message.
    #[inline]
    pub fn debug_assert_same_thread_with_msg(&self, msg: &str) {
        #[cfg(debug_assertions)]
        self.assert_same_thread_with_msg(msg);
        #[cfg(not(debug_assertions))]
        let _ = msg;
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, msg: &str) -> ! {
        let current = std::thread::current();
        let current_name = current.name().unwrap_or("<unnamed>");
        let current_id = current.id();

        panic!(
            "\n\
            ══════════════════════════════════════════════════════════════════════\n\
            THREAD AFFINITY VIOLATION\n\
            ══════════════════════════════════════════════════════════════════════\n\
            \n\
            {msg}\n\
            \n\
            Owner was created on thread: {:?}\n\
            Current thread: \"{current_name}\" (ID: {current_id:?})\n\
            \n\
            Results controllers accept change batches from a single writer.\n\
            Serialize batches onto the owning thread before applying them.\n\
            \n\
            ══════════════════════════════════════════════════════════════════════",
            self.thread_id
        )
    }
}

/// Tracks whether change callbacks are currently being delivered.
///
/// Mutating entry points call [`assert_idle`](Self::assert_idle); the
/// delivery loop holds a [`DispatchGuard`] obtained from
/// [`enter`](Self::enter).
#[derive(Debug, Default)]
pub struct DispatchState {
    dispatching: AtomicBool,
}

impl DispatchState {
    /// Create a new, idle dispatch state.
    pub const fn new() -> Self {
        Self {
            dispatching: AtomicBool::new(false),
        }
    }

    /// Returns `true` while a [`DispatchGuard`] is alive.
    #[inline]
    pub fn is_dispatching(&self) -> bool {
        self.dispatching.load(Ordering::Acquire)
    }

    /// Mark the start of callback delivery.
    ///
    /// # Panics
    ///
    /// Panics if delivery is already in progress (nested dispatch).
    pub fn enter(&self) -> DispatchGuard<'_> {
        if self.dispatching.swap(true, Ordering::AcqRel) {
            panic_reentrant("dispatch");
        }
        DispatchGuard { state: self }
    }

    /// Assert that no callbacks are being delivered.
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message naming `operation` if called from
    /// inside a change callback.
    #[inline]
    pub fn assert_idle(&self, operation: &str) {
        if self.is_dispatching() {
            panic_reentrant(operation);
        }
    }
}

/// RAII guard returned by [`DispatchState::enter`].
///
/// Marks the dispatch state idle again when dropped, including during
/// unwinding from a panicking callback.
#[derive(Debug)]
pub struct DispatchGuard<'a> {
    state: &'a DispatchState,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.state.dispatching.store(false, Ordering::Release);
    }
}

#[cold]
#[inline(never)]
fn panic_reentrant(operation: &str) -> ! {
    panic!(
        "\n\
        ══════════════════════════════════════════════════════════════════════\n\
        RE-ENTRANT MUTATION\n\
        ══════════════════════════════════════════════════════════════════════\n\
        \n\
        `{operation}` was called while change callbacks were being delivered.\n\
        \n\
        Change callbacks may query the controller but must not mutate it.\n\
        Collect the follow-up changes and apply them once the current batch\n\
        has finished dispatching.\n\
        \n\
        ══════════════════════════════════════════════════════════════════════"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_thread_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        affinity.assert_same_thread_with_msg("same thread");
        affinity.debug_assert_same_thread_with_msg("same thread");
    }

    #[test]
    fn test_thread_affinity_different_thread() {
        let affinity = ThreadAffinity::current();

        let other = std::thread::spawn(move || affinity.is_same_thread())
            .join()
            .unwrap();
        assert!(!other, "is_same_thread() should be false from another thread");
    }

    #[test]
    fn test_thread_affinity_panic_on_wrong_thread() {
        let affinity = ThreadAffinity::current();

        let result = std::thread::spawn(move || {
            affinity.assert_same_thread_with_msg("mutated from spawned thread");
        })
        .join();

        assert!(result.is_err(), "Expected thread to panic with affinity violation");
    }

    #[test]
    fn test_dispatch_guard_resets() {
        let state = DispatchState::new();
        assert!(!state.is_dispatching());
        {
            let _guard = state.enter();
            assert!(state.is_dispatching());
        }
        assert!(!state.is_dispatching());
        state.assert_idle("apply");
    }

    #[test]
    #[should_panic(expected = "RE-ENTRANT MUTATION")]
    fn test_assert_idle_panics_during_dispatch() {
        let state = DispatchState::new();
        let _guard = state.enter();
        state.assert_idle("apply");
    }

    #[test]
    fn test_dispatch_guard_resets_on_unwind() {
        let state = Arc::new(DispatchState::new());
        let state_clone = state.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = state_clone.enter();
            panic!("callback failed");
        });
        assert!(result.is_err());
        assert!(!state.is_dispatching());
    }
}
