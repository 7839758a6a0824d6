//! Unified error types for Glassbox
//!
//! One canonical error enum for the whole SDK. Note what is *not* here:
//! lookups that miss return an absence value (`Option`/`bool`), and callback
//! failures are isolated and logged by the caller. Neither surfaces as an
//! `Error`.

use thiserror::Error;

/// All Glassbox errors.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation was invoked on an execution that has already been
    /// finalized.
    #[error("execution {id} is finalized: {operation} is not permitted")]
    ExecutionFinalized {
        /// Id of the finalized execution
        id: String,
        /// The rejected operation
        operation: &'static str,
    },

    /// A candidate evaluation violated a structural invariant.
    #[error("invalid evaluation '{id}': {reason}")]
    InvalidEvaluation {
        /// Id of the offending evaluation
        id: String,
        /// What was violated
        reason: String,
    },

    /// A boundary contract was violated.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Internal error (bug or invariant violation).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for Glassbox operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error reports a builder driven past a terminal state.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::ExecutionFinalized { .. })
    }

    /// Check if this error reports rejected input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidEvaluation { .. } | Error::Validation(_)
        )
    }
}
