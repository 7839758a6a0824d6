//! Core trace data model for Glassbox
//!
//! This crate defines the entities a decision trace is made of (executions,
//! steps, candidate evaluations, filter verdicts) plus the opaque payload
//! [`Value`] type, status enums, id/time helpers, and the canonical error
//! type.
//!
//! Pure data: no I/O, no locking, no interpretation of payloads. Lifecycle
//! mutation lives on the entities themselves ([`Execution::finalize`],
//! [`Step::complete`], [`Step::fail`]) and is driven exclusively by the
//! capture crate; invariants are enforced at those boundaries.

pub mod error;
pub mod status;
pub mod trace;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use status::{Status, StepType};
pub use trace::{
    validate_evaluations, CandidateEvaluation, Execution, FilterResult, FilterSpec, Step,
    StepMetrics,
};
pub use types::{generate_execution_id, now_millis, step_id};
pub use value::Value;
