//! Whole-list snapshots of service state in a storage slot.
//!
//! The mock services keep their lists in memory. When a snapshot slot is
//! attached, the list is loaded from it at startup and written back after
//! every mutation, so separate processes over the same data directory see
//! the same catalog and orders.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::storage::SlotStorage;

/// Storage handle shared between services.
pub type SharedStorage = Arc<dyn SlotStorage + Send + Sync>;

/// One slot holding a serialized list.
#[derive(Clone)]
pub struct SnapshotSlot {
    storage: SharedStorage,
    namespace: String,
    key: String,
}

impl SnapshotSlot {
    pub fn new(storage: SharedStorage, namespace: impl Into<String>, key: impl Into<String>) -> Self {
        SnapshotSlot {
            storage,
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Loads the saved value. Absent, unreadable and malformed slots all
    /// give `None`; the caller falls back to seed data.
    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let raw = match self.storage.read(&self.namespace, &self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(slot = %self, error = %e, "Could not read snapshot");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(slot = %self, "Snapshot loaded");
                Some(value)
            }
            Err(e) => {
                warn!(slot = %self, error = %e, "Snapshot is malformed, ignoring it");
                None
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;
        self.storage.write(&self.namespace, &self.key, &json)
    }

    pub fn clear(&self) -> StoreResult<()> {
        self.storage.remove(&self.namespace, &self.key)
    }
}

impl fmt::Display for SnapshotSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.key)
    }
}

impl fmt::Debug for SnapshotSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotSlot")
            .field("namespace", &self.namespace)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_save_load_clear() {
        let storage = MemoryStorage::new();
        let slot = SnapshotSlot::new(Arc::new(storage.clone()), "quickcommerce", "numbers");

        assert_eq!(slot.load::<Vec<u32>>(), None);
        slot.save(&vec![1u32, 2, 3]).unwrap();
        assert_eq!(slot.load::<Vec<u32>>(), Some(vec![1, 2, 3]));
        assert_eq!(
            storage.read("quickcommerce", "numbers").unwrap().as_deref(),
            Some("[1,2,3]")
        );

        slot.clear().unwrap();
        assert_eq!(slot.load::<Vec<u32>>(), None);
    }

    #[test]
    fn test_malformed_snapshot_is_ignored() {
        let storage = MemoryStorage::new();
        storage.write("quickcommerce", "numbers", "{oops").unwrap();

        let slot = SnapshotSlot::new(Arc::new(storage), "quickcommerce", "numbers");
        assert_eq!(slot.load::<Vec<u32>>(), None);
        assert_eq!(slot.to_string(), "quickcommerce.numbers");
    }
}
