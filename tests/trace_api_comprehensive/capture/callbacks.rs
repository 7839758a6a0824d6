//! Lifecycle hook tests
//!
//! Hooks fire synchronously with the right payloads and are isolated: a
//! panicking hook is swallowed and can never corrupt the trace.

use crate::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[test]
fn test_hooks_fire_once_per_lifecycle_point() {
    let starts = Arc::new(AtomicUsize::new(0));
    let completes = Arc::new(AtomicUsize::new(0));
    let finals = Arc::new(AtomicUsize::new(0));

    let (s, c, f) = (starts.clone(), completes.clone(), finals.clone());
    let builder = ExecutionBuilder::new(
        CaptureConfig::new()
            .on_step_start(move |_| {
                s.fetch_add(1, Ordering::SeqCst);
            })
            .on_step_complete(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .on_execution_complete(move |_| {
                f.fetch_add(1, Ordering::SeqCst);
            }),
    );

    builder
        .open_step("a", StepType::Search)
        .unwrap()
        .complete(Value::Null, None)
        .unwrap();
    builder
        .open_step("b", StepType::Llm)
        .unwrap()
        .fail("boom")
        .unwrap();
    builder.finalize(None);

    assert_eq!(starts.load(Ordering::SeqCst), 2);
    assert_eq!(completes.load(Ordering::SeqCst), 2); // complete AND fail
    assert_eq!(finals.load(Ordering::SeqCst), 1);
}

#[test]
fn test_step_start_hook_sees_running_step() {
    let seen: Arc<Mutex<Vec<Status>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    let builder = ExecutionBuilder::new(CaptureConfig::new().on_step_start(move |step| {
        seen_clone.lock().unwrap().push(step.status);
    }));
    builder
        .open_step("observed", StepType::Filter)
        .unwrap()
        .complete(Value::Null, None)
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![Status::Running]);
}

#[test]
fn test_step_complete_hook_sees_terminal_step() {
    let seen: Arc<Mutex<Vec<(String, Status)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    let builder = ExecutionBuilder::new(CaptureConfig::new().on_step_complete(move |step| {
        seen_clone.lock().unwrap().push((step.id.clone(), step.status));
    }));
    builder
        .open_step("good", StepType::Search)
        .unwrap()
        .complete(Value::Null, None)
        .unwrap();
    builder
        .open_step("bad", StepType::Llm)
        .unwrap()
        .fail("nope")
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], ("step-1".to_string(), Status::Completed));
    assert_eq!(seen[1], ("step-2".to_string(), Status::Failed));
}

#[test]
fn test_execution_complete_hook_sees_full_snapshot() {
    let seen: Arc<Mutex<Option<Execution>>> = Arc::new(Mutex::new(None));
    let seen_clone = seen.clone();

    let builder = ExecutionBuilder::new(
        CaptureConfig::new()
            .name("hooked run")
            .on_execution_complete(move |execution| {
                *seen_clone.lock().unwrap() = Some(execution.clone());
            }),
    );
    builder
        .open_step("only", StepType::Transform)
        .unwrap()
        .complete(Value::Null, None)
        .unwrap();
    let finalized = builder.finalize(Some(Value::from("result")));

    let observed = seen.lock().unwrap().clone().expect("hook fired");
    assert_eq!(observed, finalized);
}

#[test]
fn test_panicking_hooks_are_isolated() {
    let builder = ExecutionBuilder::new(
        CaptureConfig::new()
            .on_step_start(|_| panic!("start hook bug"))
            .on_step_complete(|_| panic!("complete hook bug"))
            .on_execution_complete(|_| panic!("final hook bug")),
    );

    // Every operation still succeeds and the trace stays intact.
    let step = builder
        .open_step("resilient", StepType::Custom)
        .unwrap()
        .complete(Value::from("still fine"), None)
        .unwrap();
    assert_eq!(step.status, Status::Completed);

    let execution = builder.finalize(None);
    assert_eq!(execution.status, Status::Completed);
    assert_eq!(execution.steps.len(), 1);
}

#[test]
fn test_panicking_hook_does_not_block_autosave() {
    let gb = Glassbox::new();
    let builder = gb.capture(CaptureConfig::new().on_step_complete(|_| panic!("hook bug")));

    builder
        .open_step("saved anyway", StepType::Search)
        .unwrap()
        .complete(Value::Null, None)
        .unwrap();

    let stored = gb.store().get(&builder.id()).unwrap();
    assert_eq!(stored.steps.len(), 1);
    assert_eq!(stored.steps[0].status, Status::Completed);
}
