//! Event channel scenarios across continuation trees

use std::any::Any;
use std::io;

use futures::executor::{block_on, LocalPool};
use hooked_runtime::{Hooked, HookedError, Overrides, Reason};
use proptest::prelude::*;
use serde_json::{json, Value};

use crate::{init_tracing, reached, Gate, Recorder, TreeBuilder};

// ============================================================================
// SINGLE NODE
// ============================================================================

#[test]
fn test_progress_is_observed_step_by_step() {
    init_tracing();
    let mut pool = LocalPool::new();
    let gate = Gate::new();

    let steps = gate.clone();
    let job: Hooked<&str, u32> = Hooked::from_task(move |hooks| async move {
        steps.wait().await;
        hooks.emit("progress", 1u32);
        steps.wait().await;
        hooks.emit("progress", 2u32);
        steps.wait().await;
        Ok("done")
    });
    let progress = Recorder::<u32>::new();
    job.on("progress", progress.listener());
    job.drive(&pool.spawner()).unwrap();

    pool.run_until_stalled();
    assert!(progress.is_empty());

    gate.open();
    pool.run_until_stalled();
    assert_eq!(progress.values(), vec![1]);

    gate.open();
    pool.run_until_stalled();
    assert_eq!(progress.values(), vec![1, 2]);
    assert!(!job.is_settled());

    gate.open();
    pool.run_until_stalled();
    assert_eq!(pool.run_until(job).unwrap(), "done");
}

#[test]
fn test_events_reach_matching_listeners_only() {
    let job: Hooked<&str, u32> = Hooked::from_task(|hooks| async move {
        hooks.event("event1", 1000u32);
        hooks.event("event2", 2000u32);
        hooks.event("event3", 3000u32);
        Ok("result")
    });
    let (first, second, third) = (
        Recorder::<u32>::new(),
        Recorder::<u32>::new(),
        Recorder::<u32>::new(),
    );
    job.on("event1", first.listener())
        .on("event2", second.listener())
        .on("event3", third.listener());

    assert_eq!(block_on(job).unwrap(), "result");
    assert_eq!(first.values(), vec![1000]);
    assert_eq!(second.values(), vec![2000]);
    assert_eq!(third.values(), vec![3000]);
}

#[test]
fn test_event_without_payload() {
    let job: Hooked<&str, String> = Hooked::from_task(|hooks| async move {
        hooks.broadcast("ping", None::<String>);
        Ok("result")
    });
    let pings = Recorder::<String>::new();
    job.on("ping", pings.listener());

    assert_eq!(block_on(job).unwrap(), "result");
    assert_eq!(pings.calls(), vec![None]);
}

#[test]
fn test_event_not_sent_to_self_when_local_is_off() {
    let job: Hooked<&str, u32> = Hooked::from_task(|hooks| async move {
        hooks.event_with("event", 1000u32, Overrides::new().with_local(false));
        Ok("result")
    });
    let events = Recorder::<u32>::new();
    job.on("event", events.listener());

    assert_eq!(block_on(job).unwrap(), "result");
    assert!(events.is_empty());
}

#[test]
fn test_try_on_rejects_non_listener() {
    let job = Hooked::<()>::empty();
    let err = job.try_on("event", Box::new(42) as Box<dyn Any>).unwrap_err();
    assert!(matches!(err, HookedError::InvalidListener { .. }));
}

// ============================================================================
// DIRECTIONS
// ============================================================================

#[test]
fn test_event_does_not_echo() {
    let tree = TreeBuilder::chain(2).build::<u32>();
    let seen = tree.record("event");

    tree.node(1).event("event", 1u32);

    assert_eq!(reached(&seen), vec![1]);
}

#[test]
fn test_emit_does_not_go_upstream() {
    let tree = TreeBuilder::chain(2).build::<u32>();
    let seen = tree.record("emit");

    tree.node(1).emit("emit", 1u32);

    assert_eq!(reached(&seen), vec![1, 2]);
}

#[test]
fn test_broadcast_from_root_reaches_every_chain() {
    let tree = TreeBuilder::new().children(0, 2).child(1).build::<u32>();
    let seen = tree.record("broadcast");

    let report = tree.root().broadcast("broadcast", 7u32);

    assert_eq!(report.delivered, 4);
    assert_eq!(reached(&seen), vec![0, 1, 2, 3]);
}

#[test]
fn test_sibling_chains() {
    // 0 is the parent, 1 is chain A with child 3, 2 is chain B
    let tree = TreeBuilder::new().children(0, 2).child(1).build::<u32>();

    let seen = tree.record("progress");
    tree.node(1).broadcast("progress", 1u32);
    assert_eq!(reached(&seen), vec![0, 1, 3]);
    assert!(seen[2].is_empty());

    let seen = tree.record("update");
    tree.node(1).emit("update", 2u32);
    assert_eq!(reached(&seen), vec![1, 3]);
}

#[test]
fn test_all_directions_off_delivers_nothing() {
    let tree = TreeBuilder::new().children(0, 2).build::<u32>();
    let seen = tree.record("broadcast");

    let report = tree.node(1).broadcast_with("broadcast", 1u32, Overrides::silent());

    assert_eq!(report.delivered, 0);
    assert!(reached(&seen).is_empty());
}

// ============================================================================
// CONTINUATIONS
// ============================================================================

#[test]
fn test_broadcast_from_handler_reaches_parent() {
    let wrapped: Hooked<&str> = Hooked::resolved("result");
    let seen = Recorder::<Value>::new();
    wrapped.on("broadcast", seen.listener());

    let chained = wrapped.then(|value, hooks| async move {
        hooks.broadcast("broadcast", json!("from handler"));
        Ok(value.to_uppercase())
    });

    assert_eq!(block_on(chained).unwrap(), "RESULT");
    assert_eq!(seen.values(), vec![json!("from handler")]);
}

#[test]
fn test_event_from_catch_stays_on_child() {
    let wrapped: Hooked<String, String> =
        Hooked::from_future(async { Err(Reason::msg("ERROR")) });
    let upstream = Recorder::<String>::new();
    wrapped.on("error", upstream.listener());

    let chained = wrapped.catch(|reason, hooks| async move {
        hooks.event("error", reason.to_string());
        Ok(reason.to_string())
    });
    let local = Recorder::<String>::new();
    chained.on("error", local.listener());

    assert_eq!(block_on(chained).unwrap(), "ERROR");
    assert!(upstream.is_empty());
    assert_eq!(local.values(), vec!["ERROR".to_string()]);
}

#[test]
fn test_listener_in_handler_hears_later_emit() {
    let wrapped: Hooked<&str, String> = Hooked::resolved("result");
    let seen = Recorder::<String>::new();

    let sink = seen.clone();
    let chained = wrapped.then(move |value, hooks| async move {
        hooks.on("broadcast", sink.listener());
        Ok(value.to_uppercase())
    });

    assert_eq!(block_on(wrapped.clone()).unwrap(), "result");
    assert_eq!(block_on(chained).unwrap(), "RESULT");

    wrapped.emit("broadcast", "broadcast emit".to_string());
    assert_eq!(seen.values(), vec!["broadcast emit".to_string()]);
}

#[test]
fn test_outside_broadcast_after_settlement() {
    let seen = Recorder::<String>::new();
    let sink = seen.clone();
    let wrapped: Hooked<&str, String> = Hooked::new(move |resolve, _, hooks| {
        hooks.on("broadcast", sink.listener());
        resolve.resolve("result");
    });
    let chained = wrapped.then(|value, _| async move { Ok(value.to_uppercase()) });

    assert_eq!(block_on(wrapped.clone()).unwrap(), "result");
    assert_eq!(block_on(chained.clone()).unwrap(), "RESULT");

    chained.broadcast("broadcast", "outside broadcast".to_string());
    assert_eq!(seen.values(), vec!["outside broadcast".to_string()]);
}

// ============================================================================
// FAILURES
// ============================================================================

fn invalid() -> Reason {
    io::Error::new(io::ErrorKind::InvalidData, "invalid payload").into()
}

#[test]
fn test_listener_failure_rejects_node_and_children() {
    let job: Hooked<u32, u32> = Hooked::from_task(|hooks| async move {
        hooks.event("check", 1u32);
        Ok(1)
    });
    job.on("check", |_: Option<&u32>| Err::<(), _>(invalid()));
    let next = job.then(|value, _| async move { Ok(value + 1) });

    let reason = block_on(next).unwrap_err();
    let original = reason.downcast_ref::<io::Error>().unwrap();
    assert_eq!(original.kind(), io::ErrorKind::InvalidData);
    assert!(block_on(job).unwrap_err().ptr_eq(&reason));
}

#[test]
fn test_failure_stops_one_branch_only() {
    let tree = TreeBuilder::new().children(0, 2).child(1).build::<u32>();
    tree.node(1)
        .on("tick", |_: Option<&u32>| Err::<(), _>(Reason::msg("branch down")));
    let seen = tree.record("tick");

    let report = tree.root().emit("tick", 1u32);

    assert_eq!(report.failed, 1);
    assert_eq!(reached(&seen), vec![0, 2]);
    assert!(block_on(tree.node(1).clone()).is_err());
    assert!(block_on(tree.node(2).clone()).is_ok());
    assert!(block_on(tree.node(3).clone()).is_err());
}

#[test]
fn test_late_failure_is_reported() {
    init_tracing();
    let tree = TreeBuilder::chain(1).build::<Value>();
    assert!(block_on(tree.node(1).clone()).is_ok());

    tree.node(1)
        .on("tick", |_: Option<&Value>| Err::<(), _>(Reason::msg("too late")));
    tree.root().emit("tick", json!(1));

    let unhandled = tree.root().drain_unhandled();
    assert_eq!(unhandled.len(), 1);
    assert_eq!(unhandled[0].node, tree.node(1).id());
    assert_eq!(unhandled[0].event, "tick");
    assert!(tree.node(1).drain_unhandled().is_empty());
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_broadcast_reaches_each_node_once(
        picks in prop::collection::vec(any::<usize>(), 0..24),
        origin in any::<usize>(),
    ) {
        let shape = TreeBuilder::random(&picks);
        let origin = origin % shape.len();
        let tree = shape.build::<u32>();
        let seen = tree.record("broadcast");

        tree.node(origin).broadcast("broadcast", 1u32);

        let mut expected = shape.ancestors(origin);
        expected.extend(shape.subtree(origin));
        expected.sort_unstable();

        prop_assert!(seen.iter().all(|recorder| recorder.len() <= 1));
        prop_assert_eq!(reached(&seen), expected);
    }

    #[test]
    fn prop_event_never_echoes(
        picks in prop::collection::vec(any::<usize>(), 1..24),
        origin in any::<usize>(),
    ) {
        let shape = TreeBuilder::random(&picks);
        let origin = origin % shape.len();
        let tree = shape.build::<u32>();
        let seen = tree.record("event");

        tree.node(origin).event("event", 1u32);

        prop_assert_eq!(reached(&seen), vec![origin]);
    }
}
