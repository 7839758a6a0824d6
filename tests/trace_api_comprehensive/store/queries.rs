//! Query tests
//!
//! Status, tag, and time-range filtering (ANDed together), sort keys and
//! directions, and the documented missing-end-time convention.

use crate::*;

fn ids(executions: &[Execution]) -> Vec<&str> {
    executions.iter().map(|e| e.id.as_str()).collect()
}

#[test]
fn test_status_filter_returns_exact_subset() {
    let store = TraceStore::new();
    store.save(failed("f1", 10, 20));
    store.save(completed("c1", 30, 40));
    store.save(failed("f2", 50, 60));
    store.save(running("r1", 70));

    let all = store.find_all(&QueryOptions::new());
    let only_failed = store.find_all(&QueryOptions::new().status(Status::Failed));

    assert_eq!(only_failed.len(), 2);
    assert!(only_failed.iter().all(|e| e.status == Status::Failed));
    // Requested sort order (start time desc) holds within the subset.
    assert_eq!(ids(&only_failed), ["f2", "f1"]);
    // And it is a subset of the unfiltered result.
    assert!(only_failed
        .iter()
        .all(|e| all.iter().any(|a| a.id == e.id)));
}

#[test]
fn test_tag_filter_matches_any_supplied_tag() {
    let store = TraceStore::new();
    store.save(with_tags(running("only-c", 1), &["c"]));
    store.save(with_tags(running("a-and-c", 2), &["a", "c"]));
    store.save(with_tags(running("only-b", 3), &["b"]));
    store.save(running("untagged", 4));

    let matched = store.find_all(&QueryOptions::new().tags(["a", "b"]));
    let mut matched_ids = ids(&matched);
    matched_ids.sort_unstable();

    assert_eq!(matched_ids, ["a-and-c", "only-b"]);
}

#[test]
fn test_time_range_bounds_are_inclusive() {
    let store = TraceStore::new();
    store.save(running("before", 99));
    store.save(running("at-from", 100));
    store.save(running("inside", 150));
    store.save(running("at-to", 200));
    store.save(running("after", 201));

    let matched = store.find_by_time_range(100, 200);
    let mut matched_ids = ids(&matched);
    matched_ids.sort_unstable();

    assert_eq!(matched_ids, ["at-from", "at-to", "inside"]);
}

#[test]
fn test_filters_combine_with_and() {
    let store = TraceStore::new();
    store.save(with_tags(failed("match", 100, 110), &["prod"]));
    store.save(with_tags(failed("wrong-time", 500, 510), &["prod"]));
    store.save(with_tags(completed("wrong-status", 100, 120), &["prod"]));
    store.save(failed("wrong-tags", 100, 130));

    let matched = store.find_all(
        &QueryOptions::new()
            .status(Status::Failed)
            .tags(["prod"])
            .from_time(50)
            .to_time(150),
    );
    assert_eq!(ids(&matched), ["match"]);
}

#[test]
fn test_default_order_start_time_desc() {
    let store = TraceStore::new();
    store.save(running("old", 100));
    store.save(running("newest", 300));
    store.save(running("middle", 200));

    let all = store.find_all(&QueryOptions::new());
    assert_eq!(ids(&all), ["newest", "middle", "old"]);
}

#[test]
fn test_order_by_start_time_asc() {
    let store = TraceStore::new();
    store.save(running("b", 200));
    store.save(running("a", 100));

    let all = store.find_all(&QueryOptions::new().direction(OrderDirection::Asc));
    assert_eq!(ids(&all), ["a", "b"]);
}

#[test]
fn test_order_by_name() {
    let store = TraceStore::new();
    store.save(Execution::new("1", "zebra pipeline", 0));
    store.save(Execution::new("2", "alpha pipeline", 1));
    store.save(Execution::new("3", "mango pipeline", 2));

    let ascending = store.find_all(
        &QueryOptions::new()
            .order_by(OrderBy::Name)
            .direction(OrderDirection::Asc),
    );
    let names: Vec<&str> = ascending.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["alpha pipeline", "mango pipeline", "zebra pipeline"]);

    let descending = store.find_all(&QueryOptions::new().order_by(OrderBy::Name));
    let names: Vec<&str> = descending.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["zebra pipeline", "mango pipeline", "alpha pipeline"]);
}

/// Documented convention: executions without an end time sort as 0 under
/// end-time ordering, i.e. unfinished runs come out oldest.
#[test]
fn test_missing_end_time_sorts_as_zero() {
    let store = TraceStore::new();
    store.save(completed("finished-early", 10, 100));
    store.save(completed("finished-late", 10, 900));
    store.save(running("unfinished", 10_000));

    let ascending = store.find_all(
        &QueryOptions::new()
            .order_by(OrderBy::EndTime)
            .direction(OrderDirection::Asc),
    );
    assert_eq!(ids(&ascending), ["unfinished", "finished-early", "finished-late"]);

    let descending = store.find_all(&QueryOptions::new().order_by(OrderBy::EndTime));
    assert_eq!(ids(&descending), ["finished-late", "finished-early", "unfinished"]);
}

#[test]
fn test_convenience_wrappers_match_find_all() {
    let store = TraceStore::new();
    store.save(with_tags(failed("f", 100, 110), &["prod"]));
    store.save(with_tags(completed("c", 120, 130), &["staging"]));

    assert_eq!(
        ids(&store.find_by_status(Status::Failed)),
        ids(&store.find_all(&QueryOptions::new().status(Status::Failed)))
    );
    assert_eq!(
        ids(&store.find_by_tags(["prod"])),
        ids(&store.find_all(&QueryOptions::new().tags(["prod"])))
    );
    assert_eq!(
        ids(&store.find_by_time_range(100, 115)),
        ids(&store.find_all(&QueryOptions::new().from_time(100).to_time(115)))
    );
}

#[test]
fn test_query_on_empty_store() {
    let store = TraceStore::new();
    assert!(store.find_all(&QueryOptions::new()).is_empty());
    assert!(store.find_by_status(Status::Running).is_empty());
}
