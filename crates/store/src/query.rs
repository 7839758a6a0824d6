//! Query options for the trace store
//!
//! One options value covers filtering, sorting, and pagination. Filters are
//! ANDed together; the tag filter alone is an any-of (OR) match. Sorting is
//! applied to the filtered set before pagination.
//!
//! The permissive query semantics of loosely-typed stores (unknown sort keys
//! falling back to a default, negative offsets clamped) are unrepresentable
//! here: sort keys are enums and pagination fields are unsigned.

use glassbox_core::{Execution, Status};
use std::cmp::Ordering;

/// Sort key for [`crate::TraceStore::find_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    /// Sort by `started_at` (the default)
    #[default]
    StartTime,
    /// Sort by `ended_at`; executions that have not finished sort as 0,
    /// i.e. as the oldest
    EndTime,
    /// Sort by `name`, comparing Unicode code points
    Name,
}

/// Sort direction for [`crate::TraceStore::find_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Smallest (or lexicographically first) first
    Asc,
    /// Largest first (the default: newest runs first)
    #[default]
    Desc,
}

/// Filter, sort, and pagination options for store queries.
///
/// # Example
///
/// ```ignore
/// let failed_recent = store.find_all(
///     &QueryOptions::new()
///         .status(Status::Failed)
///         .from_time(one_hour_ago)
///         .limit(20),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Exact status match
    pub status: Option<Status>,
    /// Match executions carrying ANY of these tags
    pub tags: Option<Vec<String>>,
    /// Inclusive lower bound on `started_at`
    pub from_time: Option<i64>,
    /// Inclusive upper bound on `started_at`
    pub to_time: Option<i64>,
    /// Sort key
    pub order_by: OrderBy,
    /// Sort direction
    pub order_direction: OrderDirection,
    /// Maximum results after `offset` is applied
    pub limit: Option<usize>,
    /// Results to skip from the front of the sorted set
    pub offset: usize,
}

impl QueryOptions {
    /// Options matching everything, sorted by start time descending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require an exact status.
    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Require at least one of `tags` to be present on the execution.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Inclusive lower bound on start time.
    pub fn from_time(mut self, from: i64) -> Self {
        self.from_time = Some(from);
        self
    }

    /// Inclusive upper bound on start time.
    pub fn to_time(mut self, to: i64) -> Self {
        self.to_time = Some(to);
        self
    }

    /// Set the sort key.
    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = order_by;
        self
    }

    /// Set the sort direction.
    pub fn direction(mut self, direction: OrderDirection) -> Self {
        self.order_direction = direction;
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip results from the front of the sorted set.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Whether `execution` passes every configured filter.
    pub(crate) fn matches(&self, execution: &Execution) -> bool {
        if let Some(status) = self.status {
            if execution.status != status {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !tags.iter().any(|t| execution.tags.iter().any(|e| e == t)) {
                return false;
            }
        }
        if let Some(from) = self.from_time {
            if execution.started_at < from {
                return false;
            }
        }
        if let Some(to) = self.to_time {
            if execution.started_at > to {
                return false;
            }
        }
        true
    }

    /// Total order over executions for this query's sort options.
    ///
    /// Ties on the sort key break by id, so pagination partitions the result
    /// set without duplicates or gaps even when sort keys collide.
    pub(crate) fn compare(&self, a: &Execution, b: &Execution) -> Ordering {
        let primary = match self.order_by {
            OrderBy::StartTime => a.started_at.cmp(&b.started_at),
            OrderBy::EndTime => a.ended_at.unwrap_or(0).cmp(&b.ended_at.unwrap_or(0)),
            OrderBy::Name => a.name.cmp(&b.name),
        };
        let ordering = primary.then_with(|| a.id.cmp(&b.id));
        match self.order_direction {
            OrderDirection::Asc => ordering,
            OrderDirection::Desc => ordering.reverse(),
        }
    }
}
