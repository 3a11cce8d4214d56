//! # fxstore
//!
//! Key-value persistence store backing FoundationEx settings.
//!
//! ## Backends
//! - [`MemoryStore`]: process-local map, nothing survives the process
//! - [`FileStore`]: append-only record log replayed into memory on open
//!
//! Values are limited to the primitive representations in [`RawValue`];
//! structured values are encoded into one of those by the caller.

#![warn(missing_docs)]

mod error;
mod file;
mod parser;
mod store;
mod value;

pub use error::{Error, Result};
pub use file::FileStore;
pub use store::{KeyValueStore, MemoryStore};
pub use value::RawValue;
