//! Lifecycle status and step categorization
//!
//! `Status` is shared by executions and steps; both move through the same
//! closed set of states. `StepType` is a pure categorization label and never
//! changes core behavior.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an execution or a step.
///
/// Valid transitions:
/// - Execution: `Running` → `Completed` or `Failed` (via finalize)
/// - Step: `Running` → `Completed` or `Failed` (exactly one terminal call)
///
/// `Pending` never occurs on entities produced by the builder (executions and
/// steps are born `Running`); it exists because the status set is closed and
/// externally produced traces may carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not yet started
    Pending,
    /// In progress
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

impl Status {
    /// All status values, in a stable order (used for aggregation)
    pub const ALL: [Status; 4] = [
        Status::Pending,
        Status::Running,
        Status::Completed,
        Status::Failed,
    ];

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Completed | Status::Failed)
    }

    /// Check if this is the running state
    pub fn is_running(&self) -> bool {
        matches!(self, Status::Running)
    }

    /// Check if this is the failed state
    pub fn is_failed(&self) -> bool {
        matches!(self, Status::Failed)
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Completed => "completed",
            Status::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of pipeline work a step performs.
///
/// Categorization only: the capture protocol treats every step type
/// identically. Filter and rank steps conventionally carry evaluations, but
/// nothing enforces that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    /// LLM invocation
    Llm,
    /// Search or retrieval
    Search,
    /// Candidate filtering
    Filter,
    /// Candidate ranking
    Rank,
    /// Data transformation
    Transform,
    /// Anything else
    Custom,
}

impl StepType {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Llm => "llm",
            StepType::Search => "search",
            StepType::Filter => "filter",
            StepType::Rank => "rank",
            StepType::Transform => "transform",
            StepType::Custom => "custom",
        }
    }
}

impl std::fmt::Display for StepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
