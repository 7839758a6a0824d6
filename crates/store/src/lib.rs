//! Trace store for Glassbox
//!
//! An indexed, in-memory collection of executions supporting point lookup,
//! multi-predicate filtering, sorting, pagination, aggregation, and change
//! notification. This is the read side of the SDK: dashboards and analytics
//! consume traces exclusively through [`TraceStore`] and never mutate them;
//! all mutation flows through the capture protocol.
//!
//! The store is volatile by design; a durable backend would implement the
//! same CRUD + query surface.

pub mod query;
pub mod store;

pub use query::{OrderBy, OrderDirection, QueryOptions};
pub use store::{StatusCounts, Subscription, TraceStore};
