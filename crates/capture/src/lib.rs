//! Execution capture protocol for Glassbox
//!
//! The write side of the SDK: pipeline code drives an [`ExecutionBuilder`]
//! to record a run: opening steps, staging evaluation/filter/reasoning data
//! on them through the fluent [`StepBuilder`], and finalizing the whole
//! execution. The builder guarantees an append-only, structurally valid
//! trace under arbitrary caller sequences and computes all derived fields
//! (durations, aggregate status) itself.
//!
//! Lifecycle hooks and autosave push snapshots outward as the run
//! progresses; see [`CaptureConfig`].

pub mod builder;
pub mod config;
pub mod step;

pub use builder::ExecutionBuilder;
pub use config::{CaptureConfig, ExecutionHook, StepHook, DEFAULT_EXECUTION_NAME};
pub use step::StepBuilder;
