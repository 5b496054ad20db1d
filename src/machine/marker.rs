//! Reentrancy marker: which thread is currently running a task body.

use parking_lot::Mutex;
use std::thread::{self, ThreadId};

#[derive(Debug, Default)]
pub(crate) struct ThreadMarker {
    owner: Mutex<Option<ThreadId>>,
}

impl ThreadMarker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Mark the calling thread as the executor until the guard is dropped.
    pub(crate) fn enter(&self) -> MarkerGuard<'_> {
        *self.owner.lock() = Some(thread::current().id());
        MarkerGuard { marker: self }
    }

    pub(crate) fn owner(&self) -> Option<ThreadId> {
        *self.owner.lock()
    }

    pub(crate) fn is_held_by_current_thread(&self) -> bool {
        self.owner() == Some(thread::current().id())
    }
}

/// Clears the marker on drop, including during unwinding.
pub(crate) struct MarkerGuard<'a> {
    marker: &'a ThreadMarker,
}

impl Drop for MarkerGuard<'_> {
    fn drop(&mut self) {
        *self.marker.owner.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn guard_sets_and_clears_owner() {
        let marker = ThreadMarker::new();
        assert!(marker.owner().is_none());

        {
            let _guard = marker.enter();
            assert_eq!(marker.owner(), Some(thread::current().id()));
            assert!(marker.is_held_by_current_thread());
        }

        assert!(marker.owner().is_none());
        assert!(!marker.is_held_by_current_thread());
    }

    #[test]
    fn guard_clears_owner_on_panic() {
        let marker = ThreadMarker::new();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = marker.enter();
            panic!("task body failed");
        }));

        assert!(result.is_err());
        assert!(marker.owner().is_none());
    }

    #[test]
    fn other_threads_do_not_hold_marker() {
        let marker = ThreadMarker::new();
        let _guard = marker.enter();

        thread::scope(|s| {
            s.spawn(|| assert!(!marker.is_held_by_current_thread()));
        });
    }
}
