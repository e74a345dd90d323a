//! # Slot Storage
//!
//! A tiny namespaced key-value store holding whole serialized values,
//! the desktop counterpart of a browser's local storage.
//!
//! ## Slot Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  (namespace, key)            MemoryStorage        FileStorage           │
//! │  ────────────────            ─────────────        ───────────           │
//! │  ("quickcommerce", "cart")   HashMap entry        <dir>/quickcommerce.  │
//! │                                                          cart.json      │
//! │                                                                         │
//! │  write(): FileStorage writes <dir>/.<slot>.tmp then renames it over     │
//! │           the slot file, so a reader sees the old or the new value,     │
//! │           never half of one.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::error::{StoreError, StoreResult};

/// Namespaced key-value persistence for whole serialized values.
pub trait SlotStorage {
    /// Returns the stored value, or `None` if the slot was never written.
    fn read(&self, namespace: &str, key: &str) -> StoreResult<Option<String>>;

    /// Replaces the slot's value.
    fn write(&self, namespace: &str, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes the slot. Removing a missing slot is not an error.
    fn remove(&self, namespace: &str, key: &str) -> StoreResult<()>;
}

/// A shared storage handle is a storage too, so the cart and the service
/// snapshots can sit on one `Arc<dyn SlotStorage>`.
impl<T: SlotStorage + ?Sized> SlotStorage for Arc<T> {
    fn read(&self, namespace: &str, key: &str) -> StoreResult<Option<String>> {
        (**self).read(namespace, key)
    }

    fn write(&self, namespace: &str, key: &str, value: &str) -> StoreResult<()> {
        (**self).write(namespace, key, value)
    }

    fn remove(&self, namespace: &str, key: &str) -> StoreResult<()> {
        (**self).remove(namespace, key)
    }
}

fn slot_name(namespace: &str, key: &str) -> String {
    format!("{namespace}.{key}")
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-process storage. Clones share the same slots, which lets a test hand
/// the "same browser" to a second `CartStore`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic mid-insert cannot leave a HashMap half-written
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SlotStorage for MemoryStorage {
    fn read(&self, namespace: &str, key: &str) -> StoreResult<Option<String>> {
        Ok(self.slots().get(&slot_name(namespace, key)).cloned())
    }

    fn write(&self, namespace: &str, key: &str, value: &str) -> StoreResult<()> {
        self.slots()
            .insert(slot_name(namespace, key), value.to_string());
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> StoreResult<()> {
        self.slots().remove(&slot_name(namespace, key));
        Ok(())
    }
}

// =============================================================================
// File Storage
// =============================================================================

/// One JSON file per slot inside a data directory.
///
/// ## Usage
/// ```rust,ignore
/// let storage = FileStorage::new("/home/ana/.local/share/quickcommerce");
/// storage.write("quickcommerce", "cart", "[]")?;
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a slot.
    ///
    /// Namespace and key may only use ASCII letters, digits, `-` and `_`,
    /// so a slot can never point outside the data directory.
    pub fn slot_path(&self, namespace: &str, key: &str) -> StoreResult<PathBuf> {
        let slot = slot_name(namespace, key);
        let valid = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        if !valid(namespace) || !valid(key) {
            return Err(StoreError::persistence(
                slot,
                io::Error::new(ErrorKind::InvalidInput, "invalid slot name"),
            ));
        }
        Ok(self.dir.join(format!("{slot}.json")))
    }
}

impl SlotStorage for FileStorage {
    fn read(&self, namespace: &str, key: &str) -> StoreResult<Option<String>> {
        let path = self.slot_path(namespace, key)?;
        match fs::read_to_string(&path) {
            Ok(value) => {
                trace!(path = %path.display(), bytes = value.len(), "Slot read");
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::persistence(slot_name(namespace, key), e)),
        }
    }

    fn write(&self, namespace: &str, key: &str, value: &str) -> StoreResult<()> {
        let slot = slot_name(namespace, key);
        let path = self.slot_path(namespace, key)?;
        let tmp = self.dir.join(format!(".{slot}.tmp"));

        let result = fs::create_dir_all(&self.dir)
            .and_then(|()| fs::write(&tmp, value))
            .and_then(|()| fs::rename(&tmp, &path));

        if let Err(e) = result {
            // A leftover temp file is harmless
            let _ = fs::remove_file(&tmp);
            return Err(StoreError::persistence(slot, e));
        }

        debug!(path = %path.display(), bytes = value.len(), "Slot written");
        Ok(())
    }

    fn remove(&self, namespace: &str, key: &str) -> StoreResult<()> {
        let path = self.slot_path(namespace, key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::persistence(slot_name(namespace, key), e)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_clones_share_slots() {
        let a = MemoryStorage::new();
        let b = a.clone();

        assert_eq!(a.read("ns", "k").unwrap(), None);
        a.write("ns", "k", "v1").unwrap();
        assert_eq!(b.read("ns", "k").unwrap().as_deref(), Some("v1"));

        b.remove("ns", "k").unwrap();
        assert_eq!(a.read("ns", "k").unwrap(), None);
    }

    #[test]
    fn test_memory_storage_namespaces_are_separate() {
        let storage = MemoryStorage::new();
        storage.write("one", "cart", "1").unwrap();
        storage.write("two", "cart", "2").unwrap();
        assert_eq!(storage.read("one", "cart").unwrap().as_deref(), Some("1"));
        assert_eq!(storage.read("two", "cart").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.read("quickcommerce", "cart").unwrap(), None);

        storage.write("quickcommerce", "cart", "[1,2]").unwrap();
        assert_eq!(
            storage.read("quickcommerce", "cart").unwrap().as_deref(),
            Some("[1,2]")
        );
        assert!(dir.path().join("nested/quickcommerce.cart.json").exists());
        assert!(!dir.path().join("nested/.quickcommerce.cart.tmp").exists());

        storage.write("quickcommerce", "cart", "[]").unwrap();
        assert_eq!(
            storage.read("quickcommerce", "cart").unwrap().as_deref(),
            Some("[]")
        );

        storage.remove("quickcommerce", "cart").unwrap();
        storage.remove("quickcommerce", "cart").unwrap();
        assert_eq!(storage.read("quickcommerce", "cart").unwrap(), None);
    }

    #[test]
    fn test_file_storage_rejects_path_like_slots() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(storage.slot_path("../etc", "cart").is_err());
        assert!(storage.slot_path("quickcommerce", "a/b").is_err());
        assert!(storage.slot_path("", "cart").is_err());
        assert!(matches!(
            storage.write("quickcommerce", "..", "x"),
            Err(StoreError::Persistence { .. })
        ));
    }

    #[test]
    fn test_file_storage_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "not a directory").unwrap();

        let storage = FileStorage::new(&blocker);
        assert!(matches!(
            storage.write("quickcommerce", "cart", "[]"),
            Err(StoreError::Persistence { .. })
        ));
    }
}
