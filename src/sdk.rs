//! Main entry point tying capture and query together.
//!
//! `Glassbox` owns one [`TraceStore`] with a controlled lifecycle: construct
//! it at process start, hand the store to query consumers, and mint capture
//! builders wired to it. Multiple isolated instances coexist freely (one per
//! test, one per tenant, ...).

use glassbox_capture::{CaptureConfig, ExecutionBuilder};
use glassbox_store::TraceStore;
use std::sync::Arc;

/// The Glassbox SDK instance.
///
/// # Example
///
/// ```ignore
/// use glassbox::prelude::*;
///
/// let gb = Glassbox::new();
/// let builder = gb.capture(CaptureConfig::new().name("selection run"));
/// // ... drive the builder ...
/// let recent = gb.store().find_all(&QueryOptions::new().limit(20));
/// ```
#[derive(Clone)]
pub struct Glassbox {
    store: Arc<TraceStore>,
}

impl Glassbox {
    /// Create an instance with a fresh, empty store.
    pub fn new() -> Self {
        Glassbox {
            store: Arc::new(TraceStore::new()),
        }
    }

    /// Create an instance around an existing store.
    pub fn with_store(store: Arc<TraceStore>) -> Self {
        Glassbox { store }
    }

    /// The underlying store, for query consumers and subscriptions.
    pub fn store(&self) -> Arc<TraceStore> {
        self.store.clone()
    }

    /// Start capturing an execution wired to this instance's store.
    ///
    /// A store the caller already configured on `config` is respected;
    /// otherwise this instance's store is injected.
    pub fn capture(&self, config: CaptureConfig) -> ExecutionBuilder {
        ExecutionBuilder::new(config.store_if_unset(self.store.clone()))
    }
}

impl Default for Glassbox {
    fn default() -> Self {
        Self::new()
    }
}
