//! In-memory trace store
//!
//! Holds executions keyed by id and answers point lookups, multi-predicate
//! queries, aggregation, and change notification.
//!
//! ## Design
//!
//! The execution map sits behind a single `RwLock`: `find_all` must observe
//! one consistent snapshot while it filters, so matches are collected under
//! the read lock and sorted/paginated after it is released. Sharded or
//! lock-free maps would let the map mutate mid-query.
//!
//! Writers hand the store complete snapshots; `save` always overwrites
//! wholesale (no field-level merge). What the store returns are deep copies,
//! so no reader can corrupt the authoritative copy a builder is still
//! mutating.
//!
//! ## Subscribers
//!
//! `save` notifies subscribers synchronously, so a slow subscriber stalls the
//! writer. Callbacks are cloned out of the registry lock before being
//! invoked: a subscriber may subscribe or unsubscribe reentrantly without
//! deadlocking. A panicking subscriber is caught, logged, and skipped; the
//! remaining subscribers still run.

use crate::query::QueryOptions;
use glassbox_core::{Execution, Status};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

type SubscriberFn = Arc<dyn Fn(&Execution) + Send + Sync>;
type SubscriberMap = HashMap<u64, SubscriberFn>;

/// Counts of stored executions per status.
///
/// All four statuses are always present (zero included), so consumers never
/// have to treat an absent key as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Executions in `Pending`
    pub pending: u64,
    /// Executions in `Running`
    pub running: u64,
    /// Executions in `Completed`
    pub completed: u64,
    /// Executions in `Failed`
    pub failed: u64,
}

impl StatusCounts {
    /// Count for one status.
    pub fn get(&self, status: Status) -> u64 {
        match status {
            Status::Pending => self.pending,
            Status::Running => self.running,
            Status::Completed => self.completed,
            Status::Failed => self.failed,
        }
    }

    /// Sum over all statuses; always equals the store's total count.
    pub fn total(&self) -> u64 {
        self.pending + self.running + self.completed + self.failed
    }
}

/// Handle for an active store subscription.
///
/// Dropping the handle does NOT unsubscribe: the callback stays registered
/// until [`Subscription::unsubscribe`] is called (or the store is dropped).
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<SubscriberMap>>,
}

impl Subscription {
    /// Remove the subscriber; it receives no further notifications.
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().remove(&self.id);
        }
    }

    /// Whether the subscriber is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map(|r| r.lock().contains_key(&self.id))
            .unwrap_or(false)
    }
}

/// Indexed collection of executions with query and notification support.
///
/// Construct one per process (or per test) and share it via `Arc`; there is
/// deliberately no global instance.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(TraceStore::new());
/// store.save(execution);
/// let failed = store.find_by_status(Status::Failed);
/// ```
pub struct TraceStore {
    executions: RwLock<HashMap<String, Execution>>,
    subscribers: Arc<Mutex<SubscriberMap>>,
    next_subscriber_id: AtomicU64,
}

impl TraceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        TraceStore {
            executions: RwLock::new(HashMap::new()),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_subscriber_id: AtomicU64::new(0),
        }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Upsert an execution by id (wholesale overwrite, no field merge), then
    /// synchronously notify every active subscriber.
    ///
    /// Saving the same snapshot twice is an idempotent overwrite.
    pub fn save(&self, execution: Execution) {
        debug!(execution = %execution.id, status = %execution.status, "saving execution");
        let snapshot = execution.clone();
        self.executions
            .write()
            .insert(execution.id.clone(), execution);
        self.notify(&snapshot);
    }

    /// Remove an execution; reports whether a removal occurred.
    pub fn delete(&self, id: &str) -> bool {
        self.executions.write().remove(id).is_some()
    }

    /// Remove all executions. No notification fan-out.
    pub fn clear(&self) {
        self.executions.write().clear();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Point lookup by id. Returns a deep copy, or `None` if absent.
    pub fn get(&self, id: &str) -> Option<Execution> {
        self.executions.read().get(id).cloned()
    }

    /// Number of stored executions.
    pub fn len(&self) -> usize {
        self.executions.read().len()
    }

    /// Total number of stored executions.
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.executions.read().is_empty()
    }

    /// Filtered, sorted, paginated query.
    ///
    /// Filters (status AND any-tag AND inclusive start-time range) are
    /// evaluated against one consistent snapshot; the result is then sorted
    /// by the requested key (ties broken by id) and sliced by
    /// `offset`/`limit`.
    pub fn find_all(&self, options: &QueryOptions) -> Vec<Execution> {
        let mut matched: Vec<Execution> = {
            let executions = self.executions.read();
            executions
                .values()
                .filter(|e| options.matches(e))
                .cloned()
                .collect()
        };

        matched.sort_by(|a, b| options.compare(a, b));

        let tail = matched.into_iter().skip(options.offset);
        match options.limit {
            Some(limit) => tail.take(limit).collect(),
            None => tail.collect(),
        }
    }

    /// All executions with the given status.
    pub fn find_by_status(&self, status: Status) -> Vec<Execution> {
        self.find_all(&QueryOptions::new().status(status))
    }

    /// All executions carrying at least one of the given tags.
    pub fn find_by_tags<I, S>(&self, tags: I) -> Vec<Execution>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.find_all(&QueryOptions::new().tags(tags))
    }

    /// All executions whose start time falls in `[from, to]`.
    pub fn find_by_time_range(&self, from: i64, to: i64) -> Vec<Execution> {
        self.find_all(&QueryOptions::new().from_time(from).to_time(to))
    }

    /// Per-status counts over the whole store.
    pub fn count_by_status(&self) -> StatusCounts {
        let executions = self.executions.read();
        let mut counts = StatusCounts::default();
        for execution in executions.values() {
            match execution.status {
                Status::Pending => counts.pending += 1,
                Status::Running => counts.running += 1,
                Status::Completed => counts.completed += 1,
                Status::Failed => counts.failed += 1,
            }
        }
        counts
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register a callback invoked once per [`TraceStore::save`] with the
    /// saved execution, until the returned handle's
    /// [`Subscription::unsubscribe`] is called.
    ///
    /// Multiple subscribers are permitted; no ordering guarantee among them.
    pub fn subscribe(&self, callback: impl Fn(&Execution) + Send + Sync + 'static) -> Subscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().insert(id, Arc::new(callback));
        Subscription {
            id,
            registry: Arc::downgrade(&self.subscribers),
        }
    }

    fn notify(&self, execution: &Execution) {
        // Clone callbacks out of the lock so reentrant subscribe/unsubscribe
        // from inside a callback cannot deadlock.
        let callbacks: Vec<SubscriberFn> = self.subscribers.lock().values().cloned().collect();
        for callback in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(execution))).is_err() {
                warn!(execution = %execution.id, "subscriber panicked during notification");
            }
        }
    }
}

impl Default for TraceStore {
    fn default() -> Self {
        Self::new()
    }
}
