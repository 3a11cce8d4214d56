//! Environment handed to settings constructors
//!
//! An [`Env`] bundles the key-value store and the diagnostics sink. It is
//! passed explicitly; [`install`] optionally registers one process-wide
//! default at startup for code paths that cannot take a parameter, such as
//! `Deserialize` impls.

use std::sync::Arc;

use fxstore::{Error as StoreError, KeyValueStore, MemoryStore};
use once_cell::sync::OnceCell;
use tracing::{error, warn};

use crate::defaults::CodingError;

static DEFAULT_ENV: OnceCell<Env> = OnceCell::new();

/// Sink for failures that are recovered locally and never reach the caller.
pub trait Diagnostics: Send + Sync {
    /// A stored value could not be decoded (or a value could not be encoded).
    ///
    /// `context` names what was being coded, usually the settings key.
    fn log_coding_error(&self, context: &str, error: &CodingError);

    /// The store itself failed while reading or writing `key`
    fn log_store_error(&self, key: &str, error: &StoreError) {
        error!(key, %error, "settings store error");
    }
}

/// Diagnostics sink that reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn log_coding_error(&self, context: &str, error: &CodingError) {
        warn!(context, %error, "coding error, falling back to default");
    }
}

/// Store handle and diagnostics sink
#[derive(Clone)]
pub struct Env {
    store: Arc<dyn KeyValueStore>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Env {
    /// Environment over `store`, reporting through [`TracingDiagnostics`]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Environment over a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Replace the diagnostics sink
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The key-value store
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// The diagnostics sink
    pub fn diagnostics(&self) -> &Arc<dyn Diagnostics> {
        &self.diagnostics
    }
}

/// Register the process-wide default environment.
///
/// Succeeds once; later calls hand the rejected environment back.
pub fn install(env: Env) -> Result<(), Env> {
    DEFAULT_ENV.set(env)
}

/// The process-wide default environment, if one was installed
pub fn installed() -> Option<&'static Env> {
    DEFAULT_ENV.get()
}

/// Diagnostics sink of the installed environment, or [`TracingDiagnostics`]
pub fn diagnostics() -> Arc<dyn Diagnostics> {
    match installed() {
        Some(env) => Arc::clone(env.diagnostics()),
        None => Arc::new(TracingDiagnostics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxstore::RawValue;

    #[test]
    fn test_env_shares_store() {
        let env = Env::in_memory();
        let copy = env.clone();

        env.store().set("k", RawValue::Int(1)).unwrap();

        assert_eq!(copy.store().get("k").unwrap(), Some(RawValue::Int(1)));
    }

    #[test]
    fn test_install_once() {
        // Other tests in this binary may race to install; either way the
        // second install in this test must be rejected.
        let _ = install(Env::in_memory());
        assert!(installed().is_some());
        assert!(install(Env::in_memory()).is_err());
    }
}
