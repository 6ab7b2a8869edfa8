//! # Key/Value Persistence
//!
//! A small string key/value store, the shape a browser's local storage has.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CompanyProfile ──► KeyValueStore                                       │
//! │                       ├── FileStore    <data_dir>/<key>.json            │
//! │                       └── MemoryStore  HashMap (tests, --ephemeral)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are opaque strings. Callers own the serialization format.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// String key/value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never set.
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> StoreResult<()>;
}

// =============================================================================
// File Store
// =============================================================================

/// One file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "File store opened");
        Ok(FileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::Config(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        // Write then rename: readers never see a partial file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), "Stored item");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "Removed item");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("data")).unwrap();

        assert_eq!(store.get_item("companyDetails").unwrap(), None);
        store.set_item("companyDetails", "{\"name\":\"Acme\"}").unwrap();
        assert_eq!(
            store.get_item("companyDetails").unwrap().as_deref(),
            Some("{\"name\":\"Acme\"}")
        );
        assert!(dir.path().join("data/companyDetails.json").exists());

        store.remove_item("companyDetails").unwrap();
        assert_eq!(store.get_item("companyDetails").unwrap(), None);
        store.remove_item("companyDetails").unwrap();
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.set_item("../escape", "x").is_err());
        assert!(store.get_item("").is_err());
    }

    #[test]
    fn test_memory_store_clones_share_items() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set_item("k", "v").unwrap();
        assert_eq!(other.get_item("k").unwrap().as_deref(), Some("v"));
        other.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }
}
