//! Trace entities: executions, steps, and candidate evaluations
//!
//! These types form an ownership tree: an `Execution` exclusively owns its
//! `Step`s, and each step owns its `CandidateEvaluation`s. Nothing is shared;
//! `Clone` is therefore a deep copy, which is how store snapshots and builder
//! snapshots stay decoupled from the authoritative copy.
//!
//! ## Lifecycle
//!
//! - An execution is created `Running` and transitions once, via
//!   [`Execution::finalize`], to `Completed` or `Failed` (failed iff at least
//!   one step failed).
//! - A step is created `Running` and transitions exactly once, via
//!   [`Step::complete`] or [`Step::fail`]. `metrics.duration_ms` is always
//!   computed from the timestamps at close; caller-supplied durations are
//!   overwritten.
//!
//! Invariants are enforced at the capture boundary (see
//! [`validate_evaluations`]) rather than by a runtime validation layer.

use crate::error::{Error, Result};
use crate::status::{Status, StepType};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One filter's verdict on one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterResult {
    /// Whether the candidate passed this filter
    pub passed: bool,
    /// Human-readable justification for the verdict
    pub detail: String,
}

impl FilterResult {
    /// A passing verdict
    pub fn pass(detail: impl Into<String>) -> Self {
        FilterResult {
            passed: true,
            detail: detail.into(),
        }
    }

    /// A failing verdict
    pub fn fail(detail: impl Into<String>) -> Self {
        FilterResult {
            passed: false,
            detail: detail.into(),
        }
    }
}

/// A filter's configuration, independent of any single candidate.
///
/// Recorded per step under the filter's name: the threshold (or whatever
/// configuration the filter runs with) plus a human-readable rule
/// description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// The filter's threshold or configuration
    pub value: Value,
    /// Human-readable rule description (e.g. "0.5x-2x of reference price")
    pub rule: String,
}

impl FilterSpec {
    /// Create a new filter spec
    pub fn new(value: impl Into<Value>, rule: impl Into<String>) -> Self {
        FilterSpec {
            value: value.into(),
            rule: rule.into(),
        }
    }
}

/// One candidate considered during a step.
///
/// `score`, `score_breakdown`, and `rank` are populated only by ranking
/// steps. If `rank` is set the candidate must be qualified; ranks start at 1
/// (best) and are unique among a step's qualified candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvaluation {
    /// Unique within the step's evaluation set (not globally)
    pub id: String,
    /// Arbitrary domain payload, opaque to the core
    pub data: Value,
    /// Verdicts keyed by filter name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub filter_results: HashMap<String, FilterResult>,
    /// Whether the candidate survived all applicable filters
    pub qualified: bool,
    /// Composite score (ranking steps only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Per-component score contributions; advisory: `score` should be
    /// derivable from it, but the core does not enforce that
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<HashMap<String, f64>>,
    /// 1 = best; unique among qualified candidates in a step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
}

impl CandidateEvaluation {
    /// Create an evaluation for a candidate (unqualified until marked)
    pub fn new(id: impl Into<String>, data: impl Into<Value>) -> Self {
        CandidateEvaluation {
            id: id.into(),
            data: data.into(),
            filter_results: HashMap::new(),
            qualified: false,
            score: None,
            score_breakdown: None,
            rank: None,
        }
    }

    /// Record one filter's verdict
    pub fn with_filter_result(mut self, filter: impl Into<String>, result: FilterResult) -> Self {
        self.filter_results.insert(filter.into(), result);
        self
    }

    /// Set whether the candidate qualified
    pub fn with_qualified(mut self, qualified: bool) -> Self {
        self.qualified = qualified;
        self
    }

    /// Set the composite score
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Set the per-component score breakdown
    pub fn with_score_breakdown(mut self, breakdown: HashMap<String, f64>) -> Self {
        self.score_breakdown = Some(breakdown);
        self
    }

    /// Set the rank (1 = best). The candidate must also be qualified.
    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Check this evaluation's own invariants.
    pub fn validate(&self) -> Result<()> {
        if let Some(rank) = self.rank {
            if rank == 0 {
                return Err(Error::InvalidEvaluation {
                    id: self.id.clone(),
                    reason: "rank must be >= 1".to_string(),
                });
            }
            if !self.qualified {
                return Err(Error::InvalidEvaluation {
                    id: self.id.clone(),
                    reason: "rank set on unqualified candidate".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Validate a step's whole evaluation set.
///
/// Checks each evaluation plus the cross-candidate invariants: ids unique
/// within the set, ranks unique among qualified candidates.
pub fn validate_evaluations(evaluations: &[CandidateEvaluation]) -> Result<()> {
    let mut ids = HashSet::new();
    let mut ranks = HashSet::new();

    for eval in evaluations {
        eval.validate()?;

        if !ids.insert(eval.id.as_str()) {
            return Err(Error::InvalidEvaluation {
                id: eval.id.clone(),
                reason: "duplicate evaluation id within step".to_string(),
            });
        }
        if let Some(rank) = eval.rank {
            if !ranks.insert(rank) {
                return Err(Error::InvalidEvaluation {
                    id: eval.id.clone(),
                    reason: format!("duplicate rank {} among qualified candidates", rank),
                });
            }
        }
    }
    Ok(())
}

/// Counters describing a step's work.
///
/// All fields optional; callers report what they know. `duration_ms` is
/// special: whatever a caller supplies, the capture protocol overwrites it
/// with `ended_at - started_at` when the step closes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepMetrics {
    /// Items the step received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_count: Option<u64>,
    /// Items the step produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_count: Option<u64>,
    /// Candidates that passed (filter steps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_count: Option<u64>,
    /// Candidates that failed (filter steps)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<u64>,
    /// Wall-clock duration; computed by the core at step close
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl StepMetrics {
    /// Empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input count
    pub fn with_input_count(mut self, count: u64) -> Self {
        self.input_count = Some(count);
        self
    }

    /// Set the output count
    pub fn with_output_count(mut self, count: u64) -> Self {
        self.output_count = Some(count);
        self
    }

    /// Set the passed count
    pub fn with_passed_count(mut self, count: u64) -> Self {
        self.passed_count = Some(count);
        self
    }

    /// Set the failed count
    pub fn with_failed_count(mut self, count: u64) -> Self {
        self.failed_count = Some(count);
        self
    }

    /// Merge `other` into `self`; fields present in `other` win.
    pub fn merge(&mut self, other: &StepMetrics) {
        if other.input_count.is_some() {
            self.input_count = other.input_count;
        }
        if other.output_count.is_some() {
            self.output_count = other.output_count;
        }
        if other.passed_count.is_some() {
            self.passed_count = other.passed_count;
        }
        if other.failed_count.is_some() {
            self.failed_count = other.failed_count;
        }
        if other.duration_ms.is_some() {
            self.duration_ms = other.duration_ms;
        }
    }
}

/// One unit of pipeline work within an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Unique within the owning execution
    pub id: String,
    /// Human label
    pub name: String,
    /// Categorization label; does not change behavior
    pub step_type: StepType,
    /// Current lifecycle status
    pub status: Status,
    /// When the step was opened (epoch ms)
    pub started_at: i64,
    /// When the step closed; `>= started_at`, present only after a terminal
    /// transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<i64>,
    /// Arbitrary input payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Output payload; present only when completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Human-readable narrative explaining the step's outcome
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Work counters; `duration_ms` computed at close
    #[serde(default)]
    pub metrics: StepMetrics,
    /// Candidates considered, in evaluation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evaluations: Vec<CandidateEvaluation>,
    /// Filter configurations keyed by filter name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub filters_applied: HashMap<String, FilterSpec>,
    /// Arbitrary metadata, opaque to the core
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
    /// Error message; present only when failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Step {
    /// Open a new step in the `Running` state.
    pub fn open(
        id: impl Into<String>,
        name: impl Into<String>,
        step_type: StepType,
        started_at: i64,
    ) -> Self {
        Step {
            id: id.into(),
            name: name.into(),
            step_type,
            status: Status::Running,
            started_at,
            ended_at: None,
            input: None,
            output: None,
            reasoning: None,
            metrics: StepMetrics::default(),
            evaluations: Vec::new(),
            filters_applied: HashMap::new(),
            metadata: HashMap::new(),
            error: None,
        }
    }

    /// Close the step as completed.
    ///
    /// Merges `caller_metrics` into the step's metrics, then overwrites
    /// `duration_ms` with the computed value.
    pub fn complete(&mut self, output: Value, caller_metrics: Option<StepMetrics>, ended_at: i64) {
        self.status = Status::Completed;
        self.output = Some(output);
        self.close_at(ended_at, caller_metrics);
    }

    /// Close the step as failed.
    pub fn fail(&mut self, error: impl Into<String>, ended_at: i64) {
        self.status = Status::Failed;
        self.error = Some(error.into());
        self.close_at(ended_at, None);
    }

    fn close_at(&mut self, ended_at: i64, caller_metrics: Option<StepMetrics>) {
        self.ended_at = Some(ended_at);
        if let Some(m) = caller_metrics {
            self.metrics.merge(&m);
        }
        // Computed duration always wins over anything the caller supplied.
        self.metrics.duration_ms = Some(self.duration_from(ended_at));
    }

    fn duration_from(&self, ended_at: i64) -> u64 {
        ended_at.saturating_sub(self.started_at).max(0) as u64
    }

    /// Wall-clock duration in milliseconds, if the step has closed.
    pub fn duration_ms(&self) -> Option<u64> {
        self.ended_at.map(|e| self.duration_from(e))
    }
}

/// One full pipeline run: the complete captured trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Globally unique id
    pub id: String,
    /// Human label
    pub name: String,
    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the run started (epoch ms)
    pub started_at: i64,
    /// When the run finalized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<i64>,
    /// Current lifecycle status; computed at finalization, never set
    /// independently by callers
    pub status: Status,
    /// Steps in open order, append-only
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Run-scoped context, mutable until finalization
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, Value>,
    /// Final pipeline output, set at finalization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_output: Option<Value>,
    /// Immutable tags for categorical querying
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Execution {
    /// Create a new execution in the `Running` state.
    pub fn new(id: impl Into<String>, name: impl Into<String>, started_at: i64) -> Self {
        Execution {
            id: id.into(),
            name: name.into(),
            description: None,
            started_at,
            ended_at: None,
            status: Status::Running,
            steps: Vec::new(),
            context: HashMap::new(),
            final_output: None,
            tags: Vec::new(),
        }
    }

    /// Finalize the execution: compute status from the owned steps, stamp the
    /// end time, and record the final output.
    ///
    /// Status is `Failed` iff at least one step failed, else `Completed`.
    /// Calling this again recomputes status and end time from current step
    /// data (idempotent); a `None` output on a later call preserves the
    /// previously recorded one.
    pub fn finalize(&mut self, final_output: Option<Value>, ended_at: i64) {
        self.status = if self.has_failed_steps() {
            Status::Failed
        } else {
            Status::Completed
        };
        self.ended_at = Some(ended_at);
        if final_output.is_some() {
            self.final_output = final_output;
        }
    }

    /// Whether any owned step failed.
    pub fn has_failed_steps(&self) -> bool {
        self.steps.iter().any(|s| s.status.is_failed())
    }

    /// The steps that failed.
    pub fn failed_steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|s| s.status.is_failed())
    }

    /// Look up a step by id.
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Wall-clock duration in milliseconds, if finalized.
    pub fn duration_ms(&self) -> Option<u64> {
        self.ended_at
            .map(|e| e.saturating_sub(self.started_at).max(0) as u64)
    }
}
