//! Future Semantics Tests
//!
//! Listener delivery, cancellation and bounded waits through a real engine.

use crate::common::*;
use parking_lot::Mutex;
use std::sync::{Arc, Barrier};
use std::time::Duration;

use strata_client::{
    BucketProperties, EngineConfig, Error, FetchBucketProperties, FutureListener, Namespace,
    Operation, Response, StrataClient, StrataFuture, WaitStatus,
};

fn fetch(name: &str) -> FetchBucketProperties {
    FetchBucketProperties::builder()
        .with_namespace(Namespace::new(name))
        .build()
        .unwrap()
}

/// Single-worker client whose handler blocks on `gate` for bucket "blocker".
fn gated_client(gate: Arc<Barrier>) -> StrataClient {
    init_tracing();
    let config = EngineConfig {
        worker_threads: 1,
        max_queue_depth: 16,
    };
    StrataClient::local(&config, move |op: &Operation| -> strata_client::Result<Response> {
        if let Operation::FetchBucketProps { namespace } = op {
            if namespace.bucket_name().as_bytes() == b"blocker" {
                gate.wait();
            }
        }
        Ok(Response::BucketProperties(BucketProperties::default()))
    })
    .unwrap()
}

#[test]
fn listeners_fire_in_registration_order() {
    let gate = Arc::new(Barrier::new(2));
    let client = gated_client(Arc::clone(&gate));
    let future = client.execute_async(&fetch("blocker"));

    let order = Arc::new(Mutex::new(Vec::new()));
    for i in 0..5 {
        let order = Arc::clone(&order);
        future.add_listener(Arc::new(
            move |f: &dyn StrataFuture<BucketProperties, Namespace>| {
                assert!(f.is_done());
                order.lock().push(i);
            },
        ));
    }

    gate.wait();
    future.wait();
    // Shutdown joins the worker, so every listener has run.
    client.shutdown();
    assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn listener_added_after_completion_runs_immediately() {
    let (client, _) = create_client();
    let future = client.execute_async(&fetch("b"));
    future.wait();

    let ran = Arc::new(Mutex::new(false));
    let r = Arc::clone(&ran);
    future.add_listener(Arc::new(
        move |_: &dyn StrataFuture<BucketProperties, Namespace>| *r.lock() = true,
    ));
    assert!(*ran.lock());
}

#[test]
fn removed_listener_is_not_called() {
    let gate = Arc::new(Barrier::new(2));
    let client = gated_client(Arc::clone(&gate));
    let future = client.execute_async(&fetch("blocker"));

    let calls = Arc::new(Mutex::new(0));
    let c = Arc::clone(&calls);
    let listener: Arc<dyn FutureListener<BucketProperties, Namespace>> =
        Arc::new(move |_: &dyn StrataFuture<BucketProperties, Namespace>| *c.lock() += 1);
    future.add_listener(Arc::clone(&listener));
    assert!(future.remove_listener(&listener));
    assert!(!future.remove_listener(&listener));

    gate.wait();
    future.wait();
    client.shutdown();
    assert_eq!(*calls.lock(), 0);
}

#[test]
fn cancel_queued_command() {
    let gate = Arc::new(Barrier::new(2));
    let client = gated_client(Arc::clone(&gate));
    let running = client.execute_async(&fetch("blocker"));
    std::thread::sleep(Duration::from_millis(50));

    let queued = client.execute_async(&fetch("queued"));
    assert!(queued.cancel());
    assert!(queued.is_cancelled());
    assert!(queued.is_done());

    // The running one can no longer be cancelled
    assert!(!running.cancel());

    gate.wait();
    assert!(running.get().is_ok());
    assert_eq!(queued.get(), Err(Error::Cancelled));
    client.shutdown();
}

#[test]
fn bounded_wait_times_out_then_completes() {
    let gate = Arc::new(Barrier::new(2));
    let client = gated_client(Arc::clone(&gate));
    let future = client.execute_async(&fetch("blocker"));

    assert_eq!(
        future.wait_timeout(Duration::from_millis(20)),
        WaitStatus::TimedOut
    );
    assert!(!future.is_done());
    assert!(future.get_timeout(Duration::from_millis(1)).is_none());

    gate.wait();
    assert_eq!(
        future.get_timeout(Duration::from_secs(5)),
        Some(Ok(BucketProperties::default()))
    );
    client.shutdown();
}

#[test]
fn full_queue_rejects_command() {
    let gate = Arc::new(Barrier::new(2));
    init_tracing();
    let config = EngineConfig {
        worker_threads: 1,
        max_queue_depth: 1,
    };
    let g = Arc::clone(&gate);
    let client = StrataClient::local(&config, move |op: &Operation| -> strata_client::Result<Response> {
        if let Operation::FetchBucketProps { namespace } = op {
            if namespace.bucket_name().as_bytes() == b"blocker" {
                g.wait();
            }
        }
        Ok(Response::BucketProperties(BucketProperties::default()))
    })
    .unwrap();

    let running = client.execute_async(&fetch("blocker"));
    std::thread::sleep(Duration::from_millis(50));
    let queued = client.execute_async(&fetch("queued"));
    let rejected = client.execute_async(&fetch("rejected"));

    assert!(matches!(rejected.get(), Err(Error::Rejected { .. })));
    assert_eq!(rejected.query_info(), Some(Namespace::new("rejected")));

    gate.wait();
    assert!(running.get().is_ok());
    assert!(queued.get().is_ok());
    client.shutdown();
}

#[test]
fn handler_panic_becomes_internal_error() {
    init_tracing();
    let client = StrataClient::local(&EngineConfig::default(), |_: &Operation| -> strata_client::Result<Response> {
        panic!("handler bug")
    })
    .unwrap();
    match client.execute(&fetch("b")) {
        Err(Error::Internal { reason }) => assert!(reason.contains("handler bug")),
        other => panic!("expected internal error, got {:?}", other),
    }
    client.shutdown();
}
