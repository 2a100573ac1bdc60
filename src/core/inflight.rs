//! # In-flight batch tracker.
//!
//! Records ids of batches currently inside `Handler::handle`. Updated synchronously by
//! the runner, read by `Processor::shutdown` to report which batches overran the
//! grace period.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

/// Set of batch ids currently executing.
#[derive(Default)]
pub(crate) struct InFlight {
    ids: Mutex<BTreeSet<u64>>,
}

impl InFlight {
    pub fn insert(&self, id: u64) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    pub fn remove(&self, id: u64) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    /// Sorted ids of executing batches.
    pub fn snapshot(&self) -> Vec<u64> {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_is_sorted_and_tracks_removal() {
        let f = InFlight::default();
        f.insert(3);
        f.insert(1);
        f.insert(2);
        f.remove(2);
        assert_eq!(f.snapshot(), vec![1, 3]);
    }
}
