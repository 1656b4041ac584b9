//! Per-item single-flight guard for sync runs.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{EngineError, ResultEngine};

/// Linked items with a sync currently running in this process.
#[derive(Clone, Debug, Default)]
pub(crate) struct InFlightItems {
    items: Arc<Mutex<HashSet<i32>>>,
}

impl InFlightItems {
    /// Claim `linked_item_id`, or fail with `SyncInProgress` when another run
    /// holds it. The claim is released when the permit is dropped, including
    /// when the sync future is cancelled.
    pub(crate) fn acquire(&self, linked_item_id: i32, item_id: &str) -> ResultEngine<SyncPermit> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        if !items.insert(linked_item_id) {
            return Err(EngineError::SyncInProgress(item_id.to_string()));
        }
        Ok(SyncPermit {
            items: Arc::clone(&self.items),
            linked_item_id,
        })
    }
}

#[derive(Debug)]
pub(crate) struct SyncPermit {
    items: Arc<Mutex<HashSet<i32>>>,
    linked_item_id: i32,
}

impl Drop for SyncPermit {
    fn drop(&mut self) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.linked_item_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_rejected_until_release() {
        let guard = InFlightItems::default();

        let permit = guard.acquire(1, "item-1").unwrap();
        assert_eq!(
            guard.acquire(1, "item-1").unwrap_err(),
            EngineError::SyncInProgress("item-1".to_string())
        );

        drop(permit);
        assert!(guard.acquire(1, "item-1").is_ok());
    }

    #[test]
    fn distinct_items_do_not_block_each_other() {
        let guard = InFlightItems::default();
        let _a = guard.acquire(1, "item-1").unwrap();
        assert!(guard.acquire(2, "item-2").is_ok());
    }
}
