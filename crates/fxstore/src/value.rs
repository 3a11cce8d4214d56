//! Primitive values held by a store

/// A value in the representation a store persists.
///
/// Anything richer than these four shapes has to be encoded into one of them
/// (usually JSON bytes in [`RawValue::Data`]) before it reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawValue {
    /// Signed 64-bit integer
    Int(i64),
    /// Boolean flag
    Bool(bool),
    /// UTF-8 string
    String(String),
    /// Opaque byte blob
    Data(Vec<u8>),
}

impl RawValue {
    /// Short name of the variant, used in type-mismatch reports
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Int(_) => "int",
            RawValue::Bool(_) => "bool",
            RawValue::String(_) => "string",
            RawValue::Data(_) => "data",
        }
    }

    /// Size of the variable-length payload, zero for fixed-size variants
    pub fn payload_len(&self) -> usize {
        match self {
            RawValue::Int(_) | RawValue::Bool(_) => 0,
            RawValue::String(s) => s.len(),
            RawValue::Data(d) => d.len(),
        }
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Int(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::String(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(value: Vec<u8>) -> Self {
        RawValue::Data(value)
    }
}
