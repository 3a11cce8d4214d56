//! Typed values persisted in a key-value store
//!
//! A [`PersistedValue`] is one named setting. Its [`Codec`] decides how the
//! value is represented in the store: [`RawCodec`] stores primitives as they
//! are, [`JsonCodec`] stores anything serde can handle as JSON bytes.
//!
//! Decode failures never reach the caller. They are reported to the
//! environment's [`Diagnostics`](crate::env::Diagnostics) and the setting
//! reads as its default.

mod codec;
mod helpers;
mod persisted;

pub use codec::{Codec, CodingError, JsonCodec, RawCodec, RawPrimitive};
pub use helpers::{SettingsError, StoreExt};
pub use persisted::{Affinity, PersistedValue};
