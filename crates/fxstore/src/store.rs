//! Store contract and the in-memory backend

use std::collections::HashMap;

use ahash::RandomState;
use parking_lot::RwLock;

use crate::error::Result;
use crate::value::RawValue;

/// Synchronous key-value persistence.
///
/// Implementations supply their own thread safety; callers add no locking.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<RawValue>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: RawValue) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently present, sorted
    fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory store keyed by string.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, RawValue, RandomState>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<RawValue>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: RawValue) -> Result<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
