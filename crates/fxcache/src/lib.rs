//! # fxcache
//!
//! Typed key/value cache whose entries live in an evicting backend.
//!
//! ## Architecture
//! - **TypedCache**: typed insert/lookup/remove facade, no state of its own
//! - **EvictingStore**: backend contract; the backend decides when entries go
//! - **LruStore**: bounded LRU backend (AHash map + index-linked list) counting its evictions

#![warn(missing_docs)]

mod backend;
mod cache;
mod lru;

pub use backend::{EvictingStore, LruStore};
pub use cache::{TypedCache, DEFAULT_CAPACITY};
