//! # foundationex
//!
//! Small extension utilities for application platforms.
//!
//! ## Modules
//! - [`defaults`]: typed values persisted in a key-value store, with codecs
//!   and an optional single-thread in-memory shadow
//! - [`env`]: store handle and diagnostics sink passed to constructors
//! - [`geo`]: coordinate regions sized in miles
//! - [`hex_color`]: `#RRGGBB[AA]` parsing
//! - [`json`]: JSON pretty-printing and string-backed JSON values
//! - [`result`]: deserializing into either a success or a failure shape
//!
//! The typed cache lives in `fxcache` and is re-exported here.

#![warn(missing_docs)]

pub mod defaults;
pub mod env;
pub mod geo;
pub mod hex_color;
pub mod json;
pub mod result;

pub use defaults::{
    Affinity, Codec, CodingError, JsonCodec, PersistedValue, RawCodec, RawPrimitive,
    SettingsError, StoreExt,
};
pub use env::{Diagnostics, Env, TracingDiagnostics};
pub use fxcache::{EvictingStore, LruStore, TypedCache};
pub use fxstore::{Error as StoreError, FileStore, KeyValueStore, MemoryStore, RawValue};
pub use geo::{Coordinate, Region, Span};
pub use hex_color::{parse_hex_color, HexColorError, Rgba};
pub use json::{pretty_print_json, JsonRawValue};
pub use result::DecodedResult;
