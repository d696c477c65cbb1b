//! Per-owner serialisation of bag mutations.
//!
//! Replacements and undos for one owner run one at a time inside a process;
//! different owners proceed concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::ids::OwnerId;

/// Registry of async locks keyed by owner.
#[derive(Debug, Default)]
pub struct OwnerLocks {
    slots: Mutex<HashMap<OwnerId, Arc<AsyncMutex<()>>>>,
}

impl OwnerLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `owner_id`'s bag.
    pub async fn acquire(&self, owner_id: &OwnerId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // Idle slots are only referenced by the map.
            slots.retain(|owner, slot| owner == owner_id || Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(owner_id.clone()).or_default())
        };
        slot.lock_owned().await
    }

    /// Number of owners with a live slot.
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no owner holds a slot.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
