//! JSON helpers

use fxstore::RawValue;
use serde::{de::DeserializeOwned, Serialize};

use crate::defaults::{CodingError, RawPrimitive};

/// Prefix of the fallback text returned for unparseable input
const JSON_ERROR_MARKER: &str = "<json error>";

/// Re-serialize JSON bytes with indentation.
///
/// Input that does not parse is returned as (lossy) UTF-8 text behind an
/// error marker instead of failing.
pub fn pretty_print_json(data: &[u8]) -> String {
    match serde_json::from_slice::<serde_json::Value>(data)
        .and_then(|json| serde_json::to_string_pretty(&json))
    {
        Ok(pretty) => pretty,
        Err(_) => format!(
            "{JSON_ERROR_MARKER}\nstring data:\n{}",
            String::from_utf8_lossy(data)
        ),
    }
}

/// A value whose raw form is its JSON text.
///
/// With [`RawCodec`](crate::defaults::RawCodec) it is stored as a
/// [`RawValue::String`], keeping the entry human-readable in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRawValue<T> {
    /// Wrapped value
    pub value: T,
}

impl<T> JsonRawValue<T> {
    /// Wrap `value`
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Unwrap the value
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Serialize> JsonRawValue<T> {
    /// JSON text of the value, `"{}"` if it cannot be serialized
    pub fn raw_value(&self) -> String {
        serde_json::to_string(&self.value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl<T: DeserializeOwned> JsonRawValue<T> {
    /// Parse JSON text, `None` if it does not describe a `T`
    pub fn from_raw_value(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok().map(Self::new)
    }
}

impl<T: Serialize + DeserializeOwned> RawPrimitive for JsonRawValue<T> {
    const KIND: &'static str = "string";

    fn to_raw(&self) -> Option<RawValue> {
        Some(RawValue::String(self.raw_value()))
    }

    fn from_raw(raw: RawValue) -> Result<Self, CodingError> {
        match raw {
            RawValue::String(text) => Ok(Self::new(serde_json::from_str(&text)?)),
            other => Err(CodingError::TypeMismatch {
                expected: Self::KIND,
                found: other.kind(),
            }),
        }
    }
}
