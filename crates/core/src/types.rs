//! Identifier generation and timestamps
//!
//! Execution ids carry a millisecond time component plus a random suffix,
//! collision-resistant for the trace volumes this system targets without
//! needing any cross-builder coordination. Uniqueness of the id is also what
//! enforces the single-writer-per-execution model: two builders only collide
//! if a caller reuses an id.

use chrono::Utc;
use uuid::Uuid;

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a fresh execution id (format: `exec-{millis:x}-{rand8}`).
pub fn generate_execution_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("exec-{:x}-{}", now_millis(), &suffix[..8])
}

/// Step id for the `n`-th step of an execution (1-based open order).
///
/// Unique within the owning execution, not globally.
pub fn step_id(n: usize) -> String {
    format!("step-{}", n)
}
