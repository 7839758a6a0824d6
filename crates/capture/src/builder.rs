//! Execution builder: the capture protocol's entry point
//!
//! An [`ExecutionBuilder`] lets pipeline code narrate a run incrementally
//! while the trace stays structurally valid at every observable point. The
//! builder owns no mutable state directly; execution state lives behind an
//! `Arc<Mutex>` shared with step sub-builders and snapshot readers, so a
//! step can be in flight while another thread observes live progress.
//!
//! ## Protocol
//!
//! ```ignore
//! let builder = ExecutionBuilder::new(
//!     CaptureConfig::new().name("Competitor Product Selection").store(store),
//! );
//!
//! let step = builder
//!     .open_step("price filter", StepType::Filter)?
//!     .with_input(json!({"candidatesCount": 12}))
//!     .with_reasoning("drop anything outside 0.5x-2x of reference price")
//!     .complete(json!({"passed": 8, "failed": 4}), None)?;
//!
//! let execution = builder.finalize(Some(json!({"winner": "candidate-3"}).into()));
//! ```
//!
//! None of the operations fail under well-formed sequences. A pipeline
//! failure is captured as a failed step, not an error out of the capture
//! API; the only hard errors are operations driven past `finalize`.

use crate::config::{CaptureConfig, ExecutionHook, StepHook, DEFAULT_EXECUTION_NAME};
use crate::step::StepBuilder;
use glassbox_core::{
    generate_execution_id, now_millis, step_id, Error, Execution, Result, Step, StepType, Value,
};
use glassbox_store::TraceStore;
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Mutable execution state, shared between the builder, its step
/// sub-builders, and snapshot readers.
pub(crate) struct Inner {
    pub(crate) execution: Execution,
    pub(crate) finalized: bool,
}

/// Immutable per-execution capture wiring: store, autosave flag, hooks.
pub(crate) struct Shared {
    pub(crate) auto_save: bool,
    pub(crate) store: Option<Arc<TraceStore>>,
    pub(crate) on_step_start: Option<StepHook>,
    pub(crate) on_step_complete: Option<StepHook>,
    pub(crate) on_execution_complete: Option<ExecutionHook>,
}

impl Shared {
    /// Push a snapshot to the store if autosave is on and a store is wired.
    pub(crate) fn autosave(&self, execution: &Execution) {
        if self.auto_save {
            if let Some(store) = &self.store {
                store.save(execution.clone());
            }
        }
    }

    pub(crate) fn fire_step_start(&self, step: &Step) {
        fire_step_hook(&self.on_step_start, step, "on_step_start");
    }

    pub(crate) fn fire_step_complete(&self, step: &Step) {
        fire_step_hook(&self.on_step_complete, step, "on_step_complete");
    }

    pub(crate) fn fire_execution_complete(&self, execution: &Execution) {
        if let Some(hook) = &self.on_execution_complete {
            if catch_unwind(AssertUnwindSafe(|| hook(execution))).is_err() {
                warn!(execution = %execution.id, "on_execution_complete hook panicked");
            }
        }
    }
}

fn fire_step_hook(hook: &Option<StepHook>, step: &Step, hook_name: &str) {
    if let Some(hook) = hook {
        if catch_unwind(AssertUnwindSafe(|| hook(step))).is_err() {
            warn!(step = %step.id, hook = hook_name, "step hook panicked");
        }
    }
}

/// Stateful capture handle for one execution.
///
/// Exactly one builder should narrate a given execution id; the collision
/// resistance of generated ids is what enforces that, not a lock.
pub struct ExecutionBuilder {
    inner: Arc<Mutex<Inner>>,
    shared: Arc<Shared>,
}

impl ExecutionBuilder {
    /// Start capturing a fresh execution in the `Running` state.
    ///
    /// If autosave is on and a store is configured, the new execution is
    /// pushed immediately, so readers see the in-progress run.
    pub fn new(config: CaptureConfig) -> Self {
        let id = config
            .execution_id
            .unwrap_or_else(generate_execution_id);
        let name = config
            .name
            .unwrap_or_else(|| DEFAULT_EXECUTION_NAME.to_string());

        let mut execution = Execution::new(id, name, now_millis());
        execution.description = config.description;
        execution.context = config.context;
        execution.tags = config.tags;

        let shared = Arc::new(Shared {
            auto_save: config.auto_save.unwrap_or(true),
            store: config.store,
            on_step_start: config.on_step_start,
            on_step_complete: config.on_step_complete,
            on_execution_complete: config.on_execution_complete,
        });

        debug!(execution = %execution.id, name = %execution.name, "execution capture started");
        shared.autosave(&execution);

        ExecutionBuilder {
            inner: Arc::new(Mutex::new(Inner {
                execution,
                finalized: false,
            })),
            shared,
        }
    }

    /// The execution's id.
    pub fn id(&self) -> String {
        self.inner.lock().execution.id.clone()
    }

    /// Whether [`ExecutionBuilder::finalize`] has been called.
    pub fn is_finalized(&self) -> bool {
        self.inner.lock().finalized
    }

    /// Open a step: allocates the next step id, stamps the start time, and
    /// appends it to the execution immediately, so the in-progress step is
    /// visible to readers before completion.
    ///
    /// Fires `on_step_start` and autosaves. Fails with
    /// [`Error::ExecutionFinalized`] after `finalize`.
    pub fn open_step(
        &self,
        name: impl Into<String>,
        step_type: StepType,
    ) -> Result<StepBuilder> {
        let (step, snapshot) = {
            let mut inner = self.inner.lock();
            if inner.finalized {
                return Err(Error::ExecutionFinalized {
                    id: inner.execution.id.clone(),
                    operation: "open_step",
                });
            }
            let id = step_id(inner.execution.steps.len() + 1);
            let step = Step::open(id, name, step_type, now_millis());
            inner.execution.steps.push(step.clone());
            (step, inner.execution.clone())
        };

        debug!(execution = %snapshot.id, step = %step.id, step_type = %step.step_type, "step opened");
        self.shared.fire_step_start(&step);
        self.shared.autosave(&snapshot);

        Ok(StepBuilder::new(
            self.inner.clone(),
            self.shared.clone(),
            step.id,
        ))
    }

    /// Merge one entry into the execution's context (last-write-wins).
    ///
    /// Permitted at any time before finalization; autosaves.
    pub fn add_context(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let snapshot = {
            let mut inner = self.inner.lock();
            if inner.finalized {
                return Err(Error::ExecutionFinalized {
                    id: inner.execution.id.clone(),
                    operation: "add_context",
                });
            }
            inner.execution.context.insert(key.into(), value.into());
            inner.execution.clone()
        };
        self.shared.autosave(&snapshot);
        Ok(())
    }

    /// Finalize the execution: status becomes `Failed` iff any step failed,
    /// else `Completed`; the end time is stamped and the final output
    /// recorded. Fires `on_execution_complete`, autosaves, and returns the
    /// complete snapshot.
    ///
    /// Calling this again is permitted and idempotent: it recomputes status
    /// and end time from current step data (and a `None` output preserves
    /// the previously recorded one). Prefer calling it once.
    pub fn finalize(&self, final_output: Option<Value>) -> Execution {
        let snapshot = {
            let mut inner = self.inner.lock();
            inner.execution.finalize(final_output, now_millis());
            inner.finalized = true;
            inner.execution.clone()
        };

        debug!(execution = %snapshot.id, status = %snapshot.status, "execution finalized");
        self.shared.fire_execution_complete(&snapshot);
        self.shared.autosave(&snapshot);
        snapshot
    }

    /// Deep, decoupled copy of the current execution state, safe to hand to
    /// observers while the run is still in progress.
    pub fn snapshot(&self) -> Execution {
        self.inner.lock().execution.clone()
    }
}
