//! Store CRUD tests
//!
//! Upsert semantics, point lookup, delete, clear, and the deep-equal
//! round-trip of a fully populated execution.

use crate::*;
use std::collections::HashMap;

#[test]
fn test_get_missing_is_absence_not_error() {
    let store = TraceStore::new();
    assert!(store.get("exec-nope").is_none());
}

#[test]
fn test_save_upserts_by_id() {
    let store = TraceStore::new();
    store.save(running("exec-1", 10));
    assert_eq!(store.len(), 1);

    // Same id: wholesale overwrite, not a second entry.
    store.save(completed("exec-1", 10, 50));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("exec-1").unwrap().status, Status::Completed);
}

#[test]
fn test_repeated_identical_saves_are_idempotent() {
    let store = TraceStore::new();
    let execution = completed("exec-1", 10, 50);
    store.save(execution.clone());
    store.save(execution.clone());

    assert_eq!(store.len(), 1);
    assert_eq!(store.get("exec-1").unwrap(), execution);
}

#[test]
fn test_delete_reports_whether_removed() {
    let store = TraceStore::new();
    store.save(running("exec-1", 0));

    assert!(store.delete("exec-1"));
    assert!(!store.delete("exec-1"));
    assert!(store.get("exec-1").is_none());
}

#[test]
fn test_clear_empties_the_store() {
    let store = TraceStore::new();
    for i in 0..4 {
        store.save(running(&format!("exec-{}", i), i));
    }
    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.find_all(&QueryOptions::new()).len(), 0);
}

/// Round-trip property: a fully populated execution (5 steps, each with
/// evaluations, filters, reasoning) comes back deep-equal from the store.
#[test]
fn test_fully_populated_roundtrip_deep_equal() {
    let builder = ExecutionBuilder::new(
        CaptureConfig::new()
            .name("full roundtrip")
            .description("every field populated")
            .tag("roundtrip")
            .context_entry("dataset", "catalog-v2"),
    );

    for step_index in 0..5u32 {
        let candidates = 3 + (step_index as usize * 9) % 10; // 3..12 evaluations
        let evaluations: Vec<CandidateEvaluation> = (0..candidates)
            .map(|i| {
                CandidateEvaluation::new(
                    format!("cand-{}", i),
                    json!({"price": 10 + i, "reviews": i * 7}),
                )
                .with_qualified(i % 3 != 0)
                .with_filter_result(
                    "price",
                    if i % 3 != 0 {
                        FilterResult::pass("in range")
                    } else {
                        FilterResult::fail("out of range")
                    },
                )
            })
            .collect();

        let mut filters = HashMap::new();
        filters.insert(
            "price".to_string(),
            FilterSpec::new(json!({"min": 10, "max": 60}), "0.5x-2x of reference"),
        );

        builder
            .open_step(format!("step {}", step_index), StepType::Filter)
            .unwrap()
            .with_input(json!({"candidatesCount": candidates}))
            .with_filters(filters)
            .with_evaluations(evaluations)
            .unwrap()
            .with_reasoning(format!("pass {} narrows the field", step_index))
            .complete(json!({"stage": step_index}), None)
            .unwrap();
    }

    let execution = builder.finalize(Some(json!({"winner": "cand-1"}).into()));

    let store = TraceStore::new();
    store.save(execution.clone());

    let loaded = store.get(&execution.id).expect("present");
    assert_eq!(loaded, execution);
    assert_eq!(loaded.steps.len(), 5);
}

#[test]
fn test_stored_copy_immune_to_later_builder_mutation() {
    let store = std::sync::Arc::new(TraceStore::new());
    let builder = ExecutionBuilder::new(
        CaptureConfig::new().store(store.clone()).auto_save(false),
    );

    store.save(builder.snapshot());
    let before = store.get(&builder.id()).unwrap();

    // Builder keeps mutating; the stored snapshot must not move.
    builder.add_context("later", "value").unwrap();
    assert_eq!(store.get(&builder.id()).unwrap(), before);
}
