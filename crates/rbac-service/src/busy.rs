//! Advisory tracking of ids targeted by in-flight mutations.
//!
//! The cache never blocks a second call on the same id; it only records
//! that one is outstanding so a caller can disable the control that would
//! issue it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

/// Reference-counted set of busy ids.
#[derive(Debug, Default)]
pub struct InFlight {
    counts: Mutex<HashMap<Uuid, usize>>,
}

/// Marks ids busy until dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    tracker: &'a InFlight,
    ids: Vec<Uuid>,
}

impl InFlight {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    fn counts(&self) -> MutexGuard<'_, HashMap<Uuid, usize>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark every id in `ids` busy for the lifetime of the guard.
    pub fn begin(&self, ids: impl IntoIterator<Item = Uuid>) -> InFlightGuard<'_> {
        let ids: Vec<Uuid> = ids.into_iter().collect();
        let mut counts = self.counts();
        for id in &ids {
            *counts.entry(*id).or_insert(0) += 1;
        }
        InFlightGuard { tracker: self, ids }
    }

    /// Whether any call targeting `id` is outstanding.
    pub fn is_busy(&self, id: Uuid) -> bool {
        self.counts().contains_key(&id)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut counts = self.tracker.counts();
        for id in &self.ids {
            if let Some(count) = counts.get_mut(id) {
                *count -= 1;
                if *count == 0 {
                    counts.remove(id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_releases_on_drop() {
        let tracker = InFlight::new();
        let id = Uuid::new_v4();
        {
            let _guard = tracker.begin([id]);
            assert!(tracker.is_busy(id));
        }
        assert!(!tracker.is_busy(id));
        assert!(tracker.counts().is_empty());
    }

    #[test]
    fn test_overlapping_guards_count() {
        let tracker = InFlight::new();
        let id = Uuid::new_v4();
        let first = tracker.begin([id]);
        let second = tracker.begin([id]);
        drop(first);
        assert!(tracker.is_busy(id));
        drop(second);
        assert!(!tracker.is_busy(id));
    }
}
