//! Pagination tests
//!
//! The partition law: walking `find_all` with a fixed limit and increasing
//! offset reconstructs the full result with no duplicates and no gaps, for
//! any fixed filter/sort options, including colliding sort keys.

use crate::*;
use proptest::prelude::*;

fn ids(executions: &[Execution]) -> Vec<String> {
    executions.iter().map(|e| e.id.clone()).collect()
}

fn paginate(store: &TraceStore, base: &QueryOptions, limit: usize) -> Vec<String> {
    let mut collected = Vec::new();
    let mut offset = 0;
    loop {
        let page = store.find_all(&base.clone().offset(offset).limit(limit));
        if page.is_empty() {
            break;
        }
        assert!(page.len() <= limit);
        collected.extend(ids(&page));
        offset += limit;
    }
    collected
}

#[test]
fn test_offset_skips_limit_truncates() {
    let store = TraceStore::new();
    for i in 0..10 {
        store.save(running(&format!("exec-{:02}", i), i));
    }
    let base = QueryOptions::new().direction(OrderDirection::Asc);

    let page = store.find_all(&base.clone().offset(3).limit(4));
    assert_eq!(
        ids(&page),
        ["exec-03", "exec-04", "exec-05", "exec-06"]
    );
}

#[test]
fn test_offset_past_end_is_empty() {
    let store = TraceStore::new();
    store.save(running("only", 0));

    assert!(store
        .find_all(&QueryOptions::new().offset(5).limit(3))
        .is_empty());
}

#[test]
fn test_limit_zero_returns_nothing() {
    let store = TraceStore::new();
    store.save(running("a", 0));
    assert!(store.find_all(&QueryOptions::new().limit(0)).is_empty());
}

#[test]
fn test_pages_reconstruct_full_result_with_equal_sort_keys() {
    let store = TraceStore::new();
    // All start times identical: ordering falls back to the id tie-break.
    for i in 0..7 {
        store.save(running(&format!("exec-{}", i), 42));
    }

    let base = QueryOptions::new();
    let full = ids(&store.find_all(&base));
    let paged = paginate(&store, &base, 2);
    assert_eq!(paged, full);
}

proptest! {
    /// Pagination law over arbitrary start times (collisions included),
    /// page sizes, and sort directions.
    #[test]
    fn pagination_partitions_without_gaps_or_duplicates(
        starts in prop::collection::vec(0i64..500, 1..40),
        limit in 1usize..9,
        ascending in any::<bool>(),
    ) {
        let store = TraceStore::new();
        for (i, started_at) in starts.iter().enumerate() {
            store.save(running(&format!("exec-{:03}", i), *started_at));
        }

        let direction = if ascending { OrderDirection::Asc } else { OrderDirection::Desc };
        let base = QueryOptions::new().direction(direction);

        let full = ids(&store.find_all(&base));
        let paged = paginate(&store, &base, limit);

        prop_assert_eq!(&paged, &full);

        let unique: std::collections::HashSet<&String> = paged.iter().collect();
        prop_assert_eq!(unique.len(), starts.len());
    }
}
