//! Evicting backends for [`TypedCache`](crate::TypedCache)

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::lru::LruCache;

/// An in-memory store that may drop entries whenever it sees fit.
///
/// The backend owns its own synchronization; callers hold `&self` only.
pub trait EvictingStore<K, V> {
    /// Store `value` under `key`, returning any entry dropped to make room
    fn set(&self, key: K, value: V) -> Option<(K, V)>;

    /// Current value for `key`, if it has not been evicted
    fn get(&self, key: &K) -> Option<V>;

    /// Remove `key`, returning its value if it was present
    fn remove(&self, key: &K) -> Option<V>;

    /// Drop every entry
    fn clear(&self);

    /// Number of resident entries
    fn len(&self) -> usize;

    /// Check if the store holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Capacity-bounded LRU backend
pub struct LruStore<K, V> {
    inner: Mutex<LruCache<K, V>>,
    evictions: AtomicU64,
}

impl<K, V> LruStore<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Create a backend holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            evictions: AtomicU64::new(0),
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    /// Entries dropped to make room since creation
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}

impl<K, V> EvictingStore<K, V> for LruStore<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    fn set(&self, key: K, value: V) -> Option<(K, V)> {
        let evicted = self.inner.lock().put(key, value);
        if evicted.is_some() {
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        evicted
    }

    fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().get(key).cloned()
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    fn clear(&self) {
        self.inner.lock().clear();
    }

    fn len(&self) -> usize {
        self.inner.lock().len()
    }

    fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
