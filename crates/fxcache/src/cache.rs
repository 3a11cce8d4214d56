//! TypedCache: typed key/value cache over an evicting backend

use std::hash::Hash;
use std::marker::PhantomData;

use crate::backend::{EvictingStore, LruStore};

/// Capacity used by [`TypedCache::new`]
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Typed cache layer over an [`EvictingStore`].
///
/// Entries may disappear at any time at the backend's discretion; a miss
/// after an insert is expected behavior, not an error. Keys keep their own
/// `Eq`/`Hash` semantics, there is no wrapping.
pub struct TypedCache<K, V, S = LruStore<K, V>> {
    /// Backend holding the entries
    store: S,

    _marker: PhantomData<fn(K) -> V>,
}

impl<K, V> TypedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Create a cache over an LRU backend with [`DEFAULT_CAPACITY`]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache over an LRU backend holding at most `capacity` entries
    ///
    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_store(LruStore::new(capacity))
    }
}

impl<K, V> Default for TypedCache<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> TypedCache<K, V, S>
where
    S: EvictingStore<K, V>,
{
    /// Create a cache over the given backend
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Store `value` under `key`, replacing any existing entry
    pub fn insert(&self, value: V, key: K) {
        self.store.set(key, value);
    }

    /// Current value for `key`, `None` when absent or evicted
    pub fn value(&self, key: &K) -> Option<V> {
        self.store.get(key)
    }

    /// Remove the entry for `key`; no-op when absent
    pub fn remove(&self, key: &K) {
        self.store.remove(key);
    }

    /// Remove every entry (statistics are kept)
    pub fn remove_all(&self) {
        self.store.clear();
    }

    /// Insert when `value` is `Some`, remove when `None`
    pub fn set(&self, key: K, value: Option<V>) {
        match value {
            Some(value) => self.insert(value, key),
            None => self.remove(&key),
        }
    }

    /// Number of resident entries
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Backend holding the entries
    pub fn store(&self) -> &S {
        &self.store
    }
}
