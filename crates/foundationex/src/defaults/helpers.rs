//! Typed get/set helpers on any store

use fxstore::{Error as StoreError, KeyValueStore};
use tracing::debug;

use crate::defaults::codec::{Codec, CodingError};

/// Failure of [`StoreExt::encode`]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The value could not be encoded
    #[error(transparent)]
    Coding(#[from] CodingError),

    /// The store rejected the write
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Typed access to individual keys, without a long-lived [`PersistedValue`].
///
/// [`PersistedValue`]: crate::defaults::PersistedValue
pub trait StoreExt {
    /// Decode the value under `key`; `None` when absent, unreadable or of another type
    fn decode<T, C: Codec<T>>(&self, key: &str, codec: &C) -> Option<T>;

    /// Store `value` under `key` unless the currently decoded value already equals it.
    ///
    /// A value that encodes as absent removes the entry. Returns whether the
    /// store was touched.
    fn encode<T: PartialEq, C: Codec<T>>(
        &self,
        key: &str,
        value: &T,
        codec: &C,
    ) -> Result<bool, SettingsError>;
}

impl<S: KeyValueStore + ?Sized> StoreExt for S {
    fn decode<T, C: Codec<T>>(&self, key: &str, codec: &C) -> Option<T> {
        let raw = match self.get(key) {
            Ok(raw) => raw?,
            Err(err) => {
                debug!(key, %err, "store read failed");
                return None;
            }
        };

        match codec.decode(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(key, %err, "stored value not decodable");
                None
            }
        }
    }

    fn encode<T: PartialEq, C: Codec<T>>(
        &self,
        key: &str,
        value: &T,
        codec: &C,
    ) -> Result<bool, SettingsError> {
        let saved: Option<T> = self.decode(key, codec);
        if saved.as_ref() == Some(value) {
            return Ok(false);
        }

        match codec.encode(value)? {
            Some(raw) => self.set(key, raw)?,
            None => self.remove(key)?,
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::codec::{JsonCodec, RawCodec};
    use fxstore::{MemoryStore, RawValue};
    use std::collections::BTreeMap;

    #[test]
    fn test_decode_absent() {
        let store = MemoryStore::new();
        let value: Option<i64> = store.decode("missing", &RawCodec);
        assert_eq!(value, None);
    }

    #[test]
    fn test_decode_type_mismatch_is_none() {
        let store = MemoryStore::new();
        store.set("k", RawValue::Bool(true)).unwrap();

        let value: Option<String> = store.decode("k", &RawCodec);
        assert_eq!(value, None);
    }

    #[test]
    fn test_encode_then_decode() {
        let store = MemoryStore::new();

        assert!(store.encode("limit", &10i64, &RawCodec).unwrap());

        let value: Option<i64> = store.decode("limit", &RawCodec);
        assert_eq!(value, Some(10));
    }

    #[test]
    fn test_encode_skips_unchanged() {
        let store = MemoryStore::new();
        let mut scores = BTreeMap::new();
        scores.insert("ada".to_string(), 3u32);

        assert!(store.encode("scores", &scores, &JsonCodec).unwrap());
        assert!(!store.encode("scores", &scores, &JsonCodec).unwrap());

        scores.insert("alan".to_string(), 5);
        assert!(store.encode("scores", &scores, &JsonCodec).unwrap());
    }

    #[test]
    fn test_encode_absent_removes() {
        let store = MemoryStore::new();

        store.encode("name", &Some("x".to_string()), &RawCodec).unwrap();
        assert!(store.encode("name", &None::<String>, &RawCodec).unwrap());

        assert_eq!(store.get("name").unwrap(), None);
    }

    #[test]
    fn test_encode_through_dyn_store() {
        let store = MemoryStore::new();
        let store_obj: &dyn KeyValueStore = &store;

        store_obj.encode("flag", &true, &RawCodec).unwrap();
        assert_eq!(store_obj.decode::<bool, _>("flag", &RawCodec), Some(true));
    }
}
