//! Local key-value storage backing the identity store.

use analytics_core::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Durable string key-value store scoped to one client profile.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile store, one per process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// Sled-backed store that survives process restarts.
pub struct SledStorage {
    tree: sled::Tree,
}

impl SledStorage {
    const TREE: &'static str = "profile";

    /// Opens (or creates) the profile database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            Error::storage(format!("failed to open store at {}: {}", path.display(), e))
        })?;
        let tree = db
            .open_tree(Self::TREE)
            .map_err(|e| Error::storage(format!("failed to open profile tree: {}", e)))?;

        debug!(path = %path.display(), "Opened profile storage");
        Ok(Self { tree })
    }
}

impl KeyValueStore for SledStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .tree
            .get(key)
            .map_err(|e| Error::storage(format!("read {}: {}", key, e)))?;

        value
            .map(|bytes| {
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| Error::storage(format!("corrupt value for {}: {}", key, e)))
            })
            .transpose()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.tree
            .insert(key, value.as_bytes())
            .map_err(|e| Error::storage(format!("write {}: {}", key, e)))?;
        self.tree
            .flush()
            .map_err(|e| Error::storage(format!("flush {}: {}", key, e)))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.tree
            .remove(key)
            .map_err(|e| Error::storage(format!("remove {}: {}", key, e)))?;
        Ok(())
    }
}
