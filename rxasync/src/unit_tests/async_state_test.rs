use crate::unit_tests::{flush, wait_until, Controlled};
use crate::{
    use_async, use_async_with, AsyncOptions, AsyncSnapshot, Input, Operation, ViewScope,
};
use futures::StreamExt;
use futures_signals::signal::{Mutable, SignalExt};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

type Op = Operation<String, (), String>;

fn resolving(value: &'static str) -> Op {
    Operation::from_fn(move || async move { Ok(value.to_string()) })
}

fn rejecting(error: &'static str) -> Op {
    Operation::from_fn(move || async move { Err(error.to_string()) })
}

// Test the state right after creation
#[tokio::test]
async fn test_initial_values() {
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(resolving("done")), Input::constant(()));

    assert!(handle.is_loading());
    assert_eq!(handle.data(), None);
    assert_eq!(handle.error(), None);
    assert_eq!(handle.attempts(), 1);
}

#[tokio::test]
async fn test_resolves_to_data() {
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(resolving("done")), Input::constant(()));

    let settled = handle.settled().await;
    assert_eq!(settled, AsyncSnapshot::success("done".to_string()));
    assert!(!handle.is_loading());
    assert_eq!(handle.error(), None);
    assert_eq!(handle.data(), Some("done".to_string()));
}

#[tokio::test]
async fn test_rejects_to_error() {
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(rejecting("boom")), Input::constant(()));

    let settled = handle.settled().await;
    assert_eq!(settled, AsyncSnapshot::fail("boom".to_string()));
    assert_eq!(handle.data(), None);
}

#[tokio::test]
async fn test_snapshot_stream_order() {
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(resolving("done")), Input::constant(()));

    let mut states = Vec::new();
    let mut stream = handle.to_stream();
    while let Some(snapshot) = stream.next().await {
        let complete = snapshot.is_complete();
        states.push(snapshot);
        if complete {
            break;
        }
    }

    let loading = AsyncSnapshot {
        is_loading: true,
        data: None,
        error: None,
    };
    assert_eq!(states.len(), 2);
    assert_eq!(states[0], loading);
    assert_eq!(states[1], AsyncSnapshot::success("done".to_string()));
}

// Test retry after a failed attempt
#[tokio::test]
async fn test_retry_after_failure() {
    let fail = Arc::new(AtomicBool::new(true));
    let calls = Arc::new(AtomicUsize::new(0));
    let operation: Op = {
        let fail = fail.clone();
        let calls = calls.clone();
        Operation::from_fn(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            let fail = fail.load(Ordering::SeqCst);
            async move {
                if fail {
                    Err("first-error".to_string())
                } else {
                    Ok("done".to_string())
                }
            }
        })
    };

    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(operation), Input::constant(()));
    assert_eq!(handle.settled().await, AsyncSnapshot::fail("first-error".to_string()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    fail.store(false, Ordering::SeqCst);
    handle.retry();

    assert!(handle.is_loading());
    assert_eq!(handle.error(), None);
    assert_eq!(handle.data(), None);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(handle.attempts(), 2);

    assert_eq!(handle.settled().await, AsyncSnapshot::success("done".to_string()));
}

#[tokio::test]
async fn test_retry_with_retain_keeps_error_while_loading() {
    let controlled = Controlled::<(), String, String>::new();
    let scope = ViewScope::new();
    let handle = use_async_with(
        &scope,
        Input::constant(controlled.operation()),
        Input::constant(()),
        AsyncOptions::default().retain_settled(true),
    );

    controlled.settle(0, Err("error".to_string()));
    assert_eq!(handle.settled().await, AsyncSnapshot::fail("error".to_string()));

    handle.retry();
    assert!(handle.is_loading());
    assert_eq!(handle.error(), Some("error".to_string()));
    assert_eq!(handle.data(), None);

    controlled.settle(1, Ok("done".to_string()));
    assert_eq!(handle.settled().await, AsyncSnapshot::success("done".to_string()));
}

#[tokio::test]
async fn test_retry_reuses_params() {
    let controlled = Controlled::<u32, String, String>::new();
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(controlled.operation()), Input::constant(7));

    handle.retry();
    assert_eq!(controlled.calls(), 2);
    assert_eq!(controlled.params(0), 7);
    assert_eq!(controlled.params(1), 7);
    assert!(controlled.signal(0).is_cancelled());
    assert!(!controlled.signal(1).is_cancelled());
}

// Test abort on an attempt that never settles
#[tokio::test]
async fn test_abort_pending() {
    let controlled = Controlled::<(), String, String>::new();
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(controlled.operation()), Input::constant(()));
    assert!(handle.is_loading());

    handle.abort();

    assert_eq!(handle.snapshot(), AsyncSnapshot::uninitialized());
    assert!(controlled.signal(0).is_cancelled());

    handle.abort();
    assert_eq!(handle.snapshot(), AsyncSnapshot::uninitialized());

    controlled.settle(0, Ok("late".to_string()));
    flush().await;
    assert_eq!(handle.snapshot(), AsyncSnapshot::uninitialized());
}

#[tokio::test]
async fn test_abort_keeps_settled_values() {
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(resolving("done")), Input::constant(()));
    handle.settled().await;

    handle.abort();
    assert_eq!(handle.snapshot(), AsyncSnapshot::success("done".to_string()));
}

#[tokio::test]
async fn test_unmount_cancels_pending() {
    let controlled = Controlled::<(), String, String>::new();
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(controlled.operation()), Input::constant(()));

    scope.unmount();

    assert!(controlled.signal(0).is_cancelled());
    assert!(!handle.is_loading());
}

#[tokio::test]
async fn test_drop_scope_cancels_pending() {
    let controlled = Controlled::<(), String, String>::new();
    let scope = ViewScope::new();
    let _handle = use_async(&scope, Input::constant(controlled.operation()), Input::constant(()));

    drop(scope);

    assert!(controlled.signal(0).is_cancelled());
}

#[tokio::test]
async fn test_unmount_stops_watching_inputs() {
    let controlled = Controlled::<u32, String, String>::new();
    let params = Mutable::new(1);
    let scope = ViewScope::new();
    let _handle = use_async(
        &scope,
        Input::constant(controlled.operation()),
        Input::cell(params.clone()),
    );

    scope.unmount();
    params.set(2);
    flush().await;
    assert_eq!(controlled.calls(), 1);
}

#[tokio::test]
async fn test_passes_params() {
    let controlled = Controlled::<u32, String, String>::new();
    let scope = ViewScope::new();
    let _handle = use_async(&scope, Input::constant(controlled.operation()), Input::constant(42));

    assert_eq!(controlled.calls(), 1);
    assert_eq!(controlled.params(0), 42);
}

#[tokio::test]
async fn test_value_wrapped_arguments() {
    let operation = Mutable::new(Operation::<String, String, String>::new(
        |message, _| async move { Ok(message) },
    ));
    let params = Mutable::new("done".to_string());
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::cell(operation), Input::cell(params));

    assert_eq!(handle.settled().await, AsyncSnapshot::success("done".to_string()));
}

// Changing only the params restarts the operation
#[tokio::test]
async fn test_params_change_restarts() {
    let controlled = Controlled::<u32, String, String>::new();
    let params = Mutable::new(1);
    let scope = ViewScope::new();
    let handle = use_async(
        &scope,
        Input::constant(controlled.operation()),
        Input::cell(params.clone()),
    );

    params.set(2);
    wait_until(|| controlled.calls() == 2).await;

    assert_eq!(controlled.params(1), 2);
    assert!(controlled.signal(0).is_cancelled());
    assert!(handle.is_loading());

    controlled.settle(0, Ok("stale".to_string()));
    controlled.settle(1, Ok("fresh".to_string()));
    assert_eq!(handle.settled().await, AsyncSnapshot::success("fresh".to_string()));
}

#[tokio::test]
async fn test_operation_change_restarts() {
    let scope = ViewScope::new();
    let operation = Mutable::new(resolving("done"));
    let handle = use_async(&scope, Input::cell(operation.clone()), Input::constant(()));
    assert_eq!(handle.settled().await, AsyncSnapshot::success("done".to_string()));

    let controlled = Controlled::<(), String, String>::new();
    operation.set(controlled.operation());
    wait_until(|| controlled.calls() == 1).await;

    assert!(handle.is_loading());
    assert_eq!(handle.attempts(), 2);

    controlled.settle(0, Ok("done again".to_string()));
    assert_eq!(handle.settled().await, AsyncSnapshot::success("done again".to_string()));
}

#[tokio::test]
async fn test_set_operation_goes_through_watcher() {
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(resolving("a")), Input::constant(()));
    assert_eq!(handle.settled().await, AsyncSnapshot::success("a".to_string()));

    handle.set_operation(resolving("b"));
    wait_until(|| handle.attempts() == 2).await;
    assert_eq!(handle.settled().await, AsyncSnapshot::success("b".to_string()));
}

fn doubling() -> Operation<u32, u32, String> {
    Operation::new(|params, _| async move { Ok(params * 2) })
}

// settled() right after a cell change waits for the attempt it triggers
#[tokio::test]
async fn test_settled_sees_params_change() {
    let params = Mutable::new(1);
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(doubling()), Input::cell(params.clone()));
    assert_eq!(handle.settled().await, AsyncSnapshot::success(2));

    params.set(2);
    assert_eq!(handle.settled().await, AsyncSnapshot::success(4));
    assert_eq!(handle.attempts(), 2);
}

#[tokio::test]
async fn test_set_params_restarts() {
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(doubling()), Input::constant(5));
    assert_eq!(handle.settled().await, AsyncSnapshot::success(10));

    handle.set_params(21);
    assert_eq!(handle.settled().await, AsyncSnapshot::success(42));
    assert_eq!(handle.attempts(), 2);
}

// A rejection of an old attempt arriving after a newer resolve is ignored
#[tokio::test]
async fn test_reject_then_resolve_of_newer_attempt() {
    let failing = Controlled::<(), String, String>::new();
    let succeeding = Controlled::<(), String, String>::new();
    let operation = Mutable::new(failing.operation());
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::cell(operation.clone()), Input::constant(()));

    operation.set(succeeding.operation());
    wait_until(|| succeeding.calls() == 1).await;

    failing.settle(0, Err("error".to_string()));
    succeeding.settle(0, Ok("success".to_string()));
    flush().await;

    assert!(!handle.is_loading());
    assert_eq!(handle.error(), None);
    assert_eq!(handle.data(), Some("success".to_string()));
}

#[tokio::test]
async fn test_stale_success_after_newer_failure() {
    let controlled = Controlled::<u32, String, String>::new();
    let params = Mutable::new(1);
    let scope = ViewScope::new();
    let handle = use_async(
        &scope,
        Input::constant(controlled.operation()),
        Input::cell(params.clone()),
    );

    params.set(2);
    wait_until(|| controlled.calls() == 2).await;

    controlled.settle(1, Err("newer failed".to_string()));
    flush().await;
    controlled.settle(0, Ok("older".to_string()));
    flush().await;

    assert_eq!(handle.snapshot(), AsyncSnapshot::fail("newer failed".to_string()));
}

#[tokio::test]
async fn test_mutually_exclusive_data_or_error() {
    let scope = ViewScope::new();
    let operation = Mutable::new(resolving("done"));
    let handle = use_async(&scope, Input::cell(operation.clone()), Input::constant(()));
    assert_eq!(handle.settled().await, AsyncSnapshot::success("done".to_string()));

    operation.set(rejecting("error"));
    wait_until(|| handle.attempts() == 2).await;
    assert_eq!(handle.settled().await, AsyncSnapshot::fail("error".to_string()));

    operation.set(resolving("done"));
    wait_until(|| handle.attempts() == 3).await;
    assert_eq!(handle.settled().await, AsyncSnapshot::success("done".to_string()));
}

#[tokio::test]
async fn test_field_signals() {
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(rejecting("boom")), Input::constant(()));

    let loading: Vec<bool> = handle.is_loading_signal().to_stream().take(2).collect().await;
    assert_eq!(loading, vec![true, false]);

    let error: Vec<Option<String>> = handle.error_signal().to_stream().take(1).collect().await;
    assert_eq!(error, vec![Some("boom".to_string())]);
    let data: Vec<Option<String>> = handle.data_signal().to_stream().take(1).collect().await;
    assert_eq!(data, vec![None]);
}

#[tokio::test]
async fn test_clones_share_state() {
    let scope = ViewScope::new();
    let handle = use_async(&scope, Input::constant(resolving("done")), Input::constant(()));
    let clone = handle.clone();

    handle.settled().await;
    assert_eq!(clone.data(), Some("done".to_string()));
    assert!(handle.downgrade().upgrade().is_some());
}
