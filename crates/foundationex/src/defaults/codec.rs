//! Value codecs

use fxstore::RawValue;
use serde::{de::DeserializeOwned, Serialize};

/// Failure to move a value between its typed and stored forms
#[derive(Debug, thiserror::Error)]
pub enum CodingError {
    /// Stored value has a different primitive shape than expected
    #[error("expected {expected} value, found {found}")]
    TypeMismatch {
        /// Shape the codec needed
        expected: &'static str,
        /// Shape found in the store
        found: &'static str,
    },

    /// Stored integer does not fit the target type
    #[error("value {value} out of range for {target}")]
    OutOfRange {
        /// Target type name
        target: &'static str,
        /// Stored value
        value: i64,
    },

    /// JSON serialization or deserialization failed
    #[error("JSON coding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Strategy for encoding `V` into a [`RawValue`] and back.
///
/// `encode` returning `Ok(None)` means the value is "absent" (an empty
/// optional); the stored entry is removed rather than written.
pub trait Codec<V> {
    /// Encode `value` for the store
    fn encode(&self, value: &V) -> Result<Option<RawValue>, CodingError>;

    /// Decode a stored value
    fn decode(&self, raw: RawValue) -> Result<V, CodingError>;
}

/// Types a store can hold directly
pub trait RawPrimitive: Sized {
    /// Name of the stored shape, for mismatch reports
    const KIND: &'static str;

    /// Stored form, `None` for an absent value
    fn to_raw(&self) -> Option<RawValue>;

    /// Typed form of a stored value
    fn from_raw(raw: RawValue) -> Result<Self, CodingError>;
}

fn mismatch<T: RawPrimitive>(found: &RawValue) -> CodingError {
    CodingError::TypeMismatch {
        expected: T::KIND,
        found: found.kind(),
    }
}

impl RawPrimitive for i64 {
    const KIND: &'static str = "int";

    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::Int(*self))
    }

    fn from_raw(raw: RawValue) -> Result<Self, CodingError> {
        match raw {
            RawValue::Int(value) => Ok(value),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl RawPrimitive for i32 {
    const KIND: &'static str = "int";

    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::Int(i64::from(*self)))
    }

    fn from_raw(raw: RawValue) -> Result<Self, CodingError> {
        match raw {
            RawValue::Int(value) => i32::try_from(value).map_err(|_| CodingError::OutOfRange {
                target: "i32",
                value,
            }),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl RawPrimitive for bool {
    const KIND: &'static str = "bool";

    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::Bool(*self))
    }

    fn from_raw(raw: RawValue) -> Result<Self, CodingError> {
        match raw {
            RawValue::Bool(value) => Ok(value),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl RawPrimitive for String {
    const KIND: &'static str = "string";

    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::String(self.clone()))
    }

    fn from_raw(raw: RawValue) -> Result<Self, CodingError> {
        match raw {
            RawValue::String(value) => Ok(value),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl RawPrimitive for Vec<u8> {
    const KIND: &'static str = "data";

    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::Data(self.clone()))
    }

    fn from_raw(raw: RawValue) -> Result<Self, CodingError> {
        match raw {
            RawValue::Data(value) => Ok(value),
            other => Err(mismatch::<Self>(&other)),
        }
    }
}

impl<T: RawPrimitive> RawPrimitive for Option<T> {
    const KIND: &'static str = T::KIND;

    fn to_raw(&self) -> Option<RawValue> {
        self.as_ref().and_then(T::to_raw)
    }

    fn from_raw(raw: RawValue) -> Result<Self, CodingError> {
        T::from_raw(raw).map(Some)
    }
}

/// Identity codec: the stored value is the value itself
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCodec;

impl<V: RawPrimitive> Codec<V> for RawCodec {
    fn encode(&self, value: &V) -> Result<Option<RawValue>, CodingError> {
        Ok(value.to_raw())
    }

    fn decode(&self, raw: RawValue) -> Result<V, CodingError> {
        V::from_raw(raw)
    }
}

/// JSON envelope codec: values are stored as JSON bytes in [`RawValue::Data`].
///
/// A value serializing to JSON `null` is absent. Decoding also accepts JSON
/// held in a [`RawValue::String`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<V: Serialize + DeserializeOwned> Codec<V> for JsonCodec {
    fn encode(&self, value: &V) -> Result<Option<RawValue>, CodingError> {
        let json = serde_json::to_value(value)?;
        if json.is_null() {
            return Ok(None);
        }
        Ok(Some(RawValue::Data(serde_json::to_vec(&json)?)))
    }

    fn decode(&self, raw: RawValue) -> Result<V, CodingError> {
        match raw {
            RawValue::Data(bytes) => Ok(serde_json::from_slice(&bytes)?),
            RawValue::String(text) => Ok(serde_json::from_str(&text)?),
            other => Err(CodingError::TypeMismatch {
                expected: "data",
                found: other.kind(),
            }),
        }
    }
}
