//! Step sub-builder
//!
//! A [`StepBuilder`] stages fields on one pending step and closes it with
//! exactly one terminal call. The terminal operations take `self` by value:
//! a spent sub-builder cannot be reused, so the one-terminal-call contract is
//! enforced at compile time rather than by a runtime state check.
//!
//! Setters are chainable, may run in any order, and a repeated setter
//! overwrites the prior value. The one malformed sequence move semantics
//! cannot rule out, a sub-builder outliving its execution's `finalize`,
//! degrades safely: setters drop the staged field with a warning, and
//! `complete`/`fail` return [`Error::ExecutionFinalized`].

use crate::builder::{Inner, Shared};
use glassbox_core::{
    now_millis, validate_evaluations, CandidateEvaluation, Error, FilterSpec, Result, Step,
    StepMetrics, Value,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Fluent builder for one open step.
pub struct StepBuilder {
    inner: Arc<Mutex<Inner>>,
    shared: Arc<Shared>,
    step_id: String,
}

impl std::fmt::Debug for StepBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepBuilder")
            .field("step_id", &self.step_id)
            .finish_non_exhaustive()
    }
}

impl StepBuilder {
    pub(crate) fn new(inner: Arc<Mutex<Inner>>, shared: Arc<Shared>, step_id: String) -> Self {
        StepBuilder {
            inner,
            shared,
            step_id,
        }
    }

    /// The step's id (unique within its execution).
    pub fn id(&self) -> &str {
        &self.step_id
    }

    /// Stage a mutation on the pending step. Dropped with a warning if the
    /// execution was finalized underneath this sub-builder.
    fn stage(self, operation: &'static str, mutate: impl FnOnce(&mut Step)) -> Self {
        {
            let mut inner = self.inner.lock();
            if inner.finalized {
                warn!(step = %self.step_id, operation, "execution already finalized; staged field dropped");
            } else if let Some(step) = inner
                .execution
                .steps
                .iter_mut()
                .find(|s| s.id == self.step_id)
            {
                mutate(step);
            }
        }
        self
    }

    /// Set the step's input payload.
    pub fn with_input(self, input: impl Into<Value>) -> Self {
        let input = input.into();
        self.stage("with_input", |step| step.input = Some(input))
    }

    /// Record the filter configurations this step ran with.
    pub fn with_filters(self, filters: HashMap<String, FilterSpec>) -> Self {
        self.stage("with_filters", |step| step.filters_applied = filters)
    }

    /// Set the step's reasoning narrative.
    pub fn with_reasoning(self, reasoning: impl Into<String>) -> Self {
        let reasoning = reasoning.into();
        self.stage("with_reasoning", |step| step.reasoning = Some(reasoning))
    }

    /// Attach arbitrary metadata.
    pub fn with_metadata(self, metadata: HashMap<String, Value>) -> Self {
        self.stage("with_metadata", |step| step.metadata = metadata)
    }

    /// Record the candidates this step evaluated.
    ///
    /// Fails fast with [`Error::InvalidEvaluation`] if the set violates an
    /// invariant (duplicate ids, rank on an unqualified candidate, duplicate
    /// ranks).
    pub fn with_evaluations(self, evaluations: Vec<CandidateEvaluation>) -> Result<Self> {
        validate_evaluations(&evaluations)?;
        Ok(self.stage("with_evaluations", |step| step.evaluations = evaluations))
    }

    /// Close the step as completed.
    ///
    /// Sets the output, stamps the end time, merges `metrics`, and
    /// overwrites `duration_ms` with the computed wall-clock value. Fires
    /// `on_step_complete`, autosaves, and returns the finalized step.
    pub fn complete(self, output: impl Into<Value>, metrics: Option<StepMetrics>) -> Result<Step> {
        let output = output.into();
        self.close(move |step, ended_at| step.complete(output, metrics, ended_at))
    }

    /// Close the step as failed, recording the error message. Duration is
    /// computed the same way as for completion.
    pub fn fail(self, error: impl Into<String>) -> Result<Step> {
        let error = error.into();
        self.close(move |step, ended_at| step.fail(error, ended_at))
    }

    fn close(self, transition: impl FnOnce(&mut Step, i64)) -> Result<Step> {
        let (step, snapshot) = {
            let mut inner = self.inner.lock();
            if inner.finalized {
                return Err(Error::ExecutionFinalized {
                    id: inner.execution.id.clone(),
                    operation: "close_step",
                });
            }
            let step = inner
                .execution
                .steps
                .iter_mut()
                .find(|s| s.id == self.step_id)
                .ok_or_else(|| {
                    Error::Internal(format!(
                        "step {} missing from its own execution",
                        self.step_id
                    ))
                })?;
            transition(step, now_millis());
            let step = step.clone();
            let snapshot = inner.execution.clone();
            (step, snapshot)
        };

        self.shared.fire_step_complete(&step);
        self.shared.autosave(&snapshot);
        Ok(step)
    }
}
