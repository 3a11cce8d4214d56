//! PersistedValue: one named, typed setting

use std::sync::Arc;
use std::thread::{self, ThreadId};

use fxstore::KeyValueStore;
use tracing::trace;

use crate::defaults::codec::{Codec, JsonCodec};
use crate::env::{Diagnostics, Env};

/// Thread discipline for a [`PersistedValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    /// Any thread may read or write; every read goes to the store
    AnyThread,
    /// Only this thread may read or write; reads come from an in-memory shadow
    Thread(ThreadId),
}

impl Affinity {
    /// Pin to the calling thread
    pub fn current() -> Self {
        Affinity::Thread(thread::current().id())
    }
}

enum Shadow<V> {
    Pinned { owner: ThreadId, value: V },
    Unpinned,
}

/// A typed value stored under one key.
///
/// With [`Affinity::Thread`] the value is read from the store once, at
/// construction, and afterwards served from memory; writes update memory
/// first and then the store. Touching a pinned value from another thread is
/// a programming error and trips a debug assertion.
///
/// With [`Affinity::AnyThread`] each read decodes from the store, so changes
/// made by other handles are observed.
///
/// Writes always go through to the store, even when the value is unchanged.
pub struct PersistedValue<V, C = JsonCodec> {
    key: String,
    default_value: V,
    codec: C,
    store: Arc<dyn KeyValueStore>,
    diagnostics: Arc<dyn Diagnostics>,
    shadow: Shadow<V>,
}

impl<V, C> PersistedValue<V, C>
where
    V: Clone,
    C: Codec<V>,
{
    /// Create a setting stored under `key`
    ///
    /// # Arguments
    /// * `key` - Store key
    /// * `default_value` - Value read when nothing (decodable) is stored
    /// * `codec` - Encoding between `V` and the store
    /// * `env` - Store and diagnostics
    /// * `affinity` - Thread discipline; pinned values read the store now
    pub fn new(
        key: impl Into<String>,
        default_value: V,
        codec: C,
        env: &Env,
        affinity: Affinity,
    ) -> Self {
        let mut slot = Self {
            key: key.into(),
            default_value,
            codec,
            store: Arc::clone(env.store()),
            diagnostics: Arc::clone(env.diagnostics()),
            shadow: Shadow::Unpinned,
        };

        if let Affinity::Thread(owner) = affinity {
            let value = slot.stored_value();
            slot.shadow = Shadow::Pinned { owner, value };
        }

        slot
    }

    /// Create a setting whose default is `V::default()` (`None`, empty list, ...)
    pub fn with_default(key: impl Into<String>, codec: C, env: &Env, affinity: Affinity) -> Self
    where
        V: Default,
    {
        Self::new(key, V::default(), codec, env, affinity)
    }

    /// Current value
    pub fn read(&self) -> V {
        match &self.shadow {
            Shadow::Pinned { owner, value } => {
                check_affinity(*owner, &self.key);
                value.clone()
            }
            Shadow::Unpinned => self.stored_value(),
        }
    }

    /// Replace the value and persist it.
    ///
    /// A value that encodes as absent removes the stored entry, so a later
    /// reader sees the default rather than an empty marker.
    pub fn write(&mut self, new_value: V) {
        if let Shadow::Pinned { owner, .. } = &self.shadow {
            check_affinity(*owner, &self.key);
        }

        let encoded = self.codec.encode(&new_value);

        if let Shadow::Pinned { value, .. } = &mut self.shadow {
            *value = new_value;
        }

        let result = match encoded {
            Ok(Some(raw)) => self.store.set(&self.key, raw),
            Ok(None) => {
                trace!(key = %self.key, "value is absent, removing entry");
                self.store.remove(&self.key)
            }
            Err(err) => {
                self.diagnostics.log_coding_error(&self.key, &err);
                return;
            }
        };

        if let Err(err) = result {
            self.diagnostics.log_store_error(&self.key, &err);
        }
    }

    /// Store key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Value read when nothing decodable is stored
    pub fn default_value(&self) -> &V {
        &self.default_value
    }

    /// Whether reads are served from the in-memory shadow
    pub fn is_pinned(&self) -> bool {
        matches!(self.shadow, Shadow::Pinned { .. })
    }

    fn stored_value(&self) -> V {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return self.default_value.clone(),
            Err(err) => {
                self.diagnostics.log_store_error(&self.key, &err);
                return self.default_value.clone();
            }
        };

        match self.codec.decode(raw) {
            Ok(value) => value,
            Err(err) => {
                self.diagnostics.log_coding_error(&self.key, &err);
                self.default_value.clone()
            }
        }
    }
}

fn check_affinity(owner: ThreadId, key: &str) {
    debug_assert_eq!(
        thread::current().id(),
        owner,
        "persisted value {key:?} used off its designated thread"
    );
}
