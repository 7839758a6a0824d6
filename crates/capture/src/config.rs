//! Capture configuration
//!
//! `CaptureConfig` is the single configuration surface of the capture
//! protocol: labels, initial context and tags, autosave behavior, the store
//! to push snapshots into, and the lifecycle hooks.
//!
//! The store is injected explicitly (there is no process-wide default), so
//! tests and multi-tenant hosts can run any number of isolated stores.

use glassbox_core::{Execution, Step, Value};
use glassbox_store::TraceStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Default execution name when none is configured.
pub const DEFAULT_EXECUTION_NAME: &str = "Unnamed Execution";

/// Hook invoked with a step snapshot.
pub type StepHook = Arc<dyn Fn(&Step) + Send + Sync>;

/// Hook invoked with an execution snapshot.
pub type ExecutionHook = Arc<dyn Fn(&Execution) + Send + Sync>;

/// Configuration for one captured execution.
///
/// Hooks fire synchronously at the matching lifecycle points and are
/// side-effect-only: a panicking hook is caught, logged, and swallowed, and
/// can never corrupt the trace.
///
/// # Example
///
/// ```ignore
/// let builder = ExecutionBuilder::new(
///     CaptureConfig::new()
///         .name("Competitor Product Selection")
///         .tag("production")
///         .store(store.clone()),
/// );
/// ```
#[derive(Clone, Default)]
pub struct CaptureConfig {
    pub(crate) execution_id: Option<String>,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) context: HashMap<String, Value>,
    pub(crate) tags: Vec<String>,
    pub(crate) auto_save: Option<bool>,
    pub(crate) store: Option<Arc<TraceStore>>,
    pub(crate) on_step_start: Option<StepHook>,
    pub(crate) on_step_complete: Option<StepHook>,
    pub(crate) on_execution_complete: Option<ExecutionHook>,
}

impl CaptureConfig {
    /// Create a config with defaults: name `"Unnamed Execution"`, autosave
    /// on, no store, no hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply the execution id instead of generating one.
    ///
    /// The caller is responsible for uniqueness per logical run; the id is
    /// what enforces single-writer-per-execution.
    pub fn execution_id(mut self, id: impl Into<String>) -> Self {
        self.execution_id = Some(id.into());
        self
    }

    /// Human label for the execution.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Longer description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Initial context mapping.
    pub fn context(mut self, context: HashMap<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Add one initial context entry.
    pub fn context_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Add one tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Set all tags.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Whether every mutation is pushed to the store immediately
    /// (default: true). With autosave off, callers save snapshots manually.
    pub fn auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = Some(auto_save);
        self
    }

    /// Store to push snapshots into. Without a store, autosave is a no-op.
    pub fn store(mut self, store: Arc<TraceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Inject `store` only if none was configured. Used by facades that
    /// carry a default store.
    pub fn store_if_unset(mut self, store: Arc<TraceStore>) -> Self {
        if self.store.is_none() {
            self.store = Some(store);
        }
        self
    }

    /// Hook fired when a step is opened.
    pub fn on_step_start(mut self, hook: impl Fn(&Step) + Send + Sync + 'static) -> Self {
        self.on_step_start = Some(Arc::new(hook));
        self
    }

    /// Hook fired when a step completes or fails.
    pub fn on_step_complete(mut self, hook: impl Fn(&Step) + Send + Sync + 'static) -> Self {
        self.on_step_complete = Some(Arc::new(hook));
        self
    }

    /// Hook fired when the execution is finalized.
    pub fn on_execution_complete(
        mut self,
        hook: impl Fn(&Execution) + Send + Sync + 'static,
    ) -> Self {
        self.on_execution_complete = Some(Arc::new(hook));
        self
    }
}
