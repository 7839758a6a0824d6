//! Convenient imports for Glassbox.
//!
//! This module re-exports the most commonly used types so you can get
//! started with a single import:
//!
//! ```ignore
//! use glassbox::prelude::*;
//!
//! let gb = Glassbox::new();
//! let builder = gb.capture(CaptureConfig::new().name("my pipeline"));
//! ```

// Main entry point
pub use crate::Glassbox;

// Capture protocol
pub use glassbox_capture::{CaptureConfig, ExecutionBuilder, StepBuilder};

// Error handling
pub use glassbox_core::{Error, Result};

// Trace entities
pub use glassbox_core::{
    CandidateEvaluation, Execution, FilterResult, FilterSpec, Step, StepMetrics,
};

// Core types
pub use glassbox_core::{Status, StepType, Value};

// Query surface
pub use glassbox_store::{
    OrderBy, OrderDirection, QueryOptions, StatusCounts, Subscription, TraceStore,
};

// Re-export serde_json for convenience
pub use serde_json::json;
