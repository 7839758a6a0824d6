//! # Glassbox
//!
//! Decision-observability SDK for multi-step AI pipelines.
//!
//! Glassbox captures the internal reasoning of non-deterministic pipelines
//! (LLM-driven candidate selection and the like) so a human can reconstruct
//! *why* a pipeline produced a given output, not merely *what* it output.
//!
//! ## Quick Start
//!
//! ```ignore
//! use glassbox::prelude::*;
//!
//! // One store per process (or per test); no hidden globals.
//! let gb = Glassbox::new();
//!
//! // Narrate a run.
//! let builder = gb.capture(CaptureConfig::new().name("Competitor Product Selection"));
//! builder
//!     .open_step("price filter", StepType::Filter)?
//!     .with_input(json!({"candidatesCount": 12}))
//!     .with_reasoning("drop anything outside 0.5x-2x of reference price")
//!     .complete(json!({"passed": 8, "failed": 4}), None)?;
//! let execution = builder.finalize(Some(json!({"winner": "candidate-3"}).into()));
//!
//! // Query it back.
//! let failed = gb.store().find_by_status(Status::Failed);
//! ```
//!
//! ## Components
//!
//! - [`glassbox_core`] - the trace data model: [`Execution`], [`Step`],
//!   [`CandidateEvaluation`], [`FilterResult`], the opaque [`Value`] payload
//!   type, and the invariants tying them together.
//! - [`glassbox_capture`] - the capture protocol: [`ExecutionBuilder`] and
//!   the fluent [`StepBuilder`].
//! - [`glassbox_store`] - the query side: [`TraceStore`] with filtering,
//!   sorting, pagination, aggregation, and change notification.
//!
//! Data flows one direction: pipeline code → builder → immutable execution
//! snapshots → store → query consumers.

#![warn(missing_docs)]

mod sdk;

pub mod prelude;

// Re-export the main entry point
pub use sdk::Glassbox;

// Re-export the capture surface
pub use glassbox_capture::{CaptureConfig, ExecutionBuilder, StepBuilder, DEFAULT_EXECUTION_NAME};

// Re-export the data model
pub use glassbox_core::{
    generate_execution_id, now_millis, validate_evaluations, CandidateEvaluation, Error,
    Execution, FilterResult, FilterSpec, Result, Status, Step, StepMetrics, StepType, Value,
};

// Re-export the query surface
pub use glassbox_store::{
    OrderBy, OrderDirection, QueryOptions, StatusCounts, Subscription, TraceStore,
};
