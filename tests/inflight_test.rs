//! Tests for [`InFlightRegistry`] request coalescing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use huginn::cache::{Fetch, InFlightRegistry};
use huginn::{HuginnError, RequestKey};
use serde_json::json;
use tokio::sync::oneshot;

fn key(path: &str) -> RequestKey {
    RequestKey::new(path, [("raw_json", "1")])
}

/// A fetch that resolves when `rx` fires, counting how often it was built.
fn gated_fetch(calls: &Arc<AtomicU32>, rx: oneshot::Receiver<()>) -> Fetch {
    calls.fetch_add(1, Ordering::SeqCst);
    async move {
        let _ = rx.await;
        Ok(Arc::new(json!({"data": {"children": []}})))
    }
    .boxed()
}

#[tokio::test]
async fn concurrent_callers_share_one_call() {
    let registry = InFlightRegistry::new();
    let calls = Arc::new(AtomicU32::new(0));
    let (tx, rx) = oneshot::channel();
    let k = key("/hot.json");

    let first = registry.dedupe(&k, || gated_fetch(&calls, rx));
    let second = registry.dedupe(&k, || panic!("second caller must not start a call"));
    assert!(!first.joined);
    assert!(second.joined);
    assert!(registry.contains(&k));

    tx.send(()).unwrap();
    let (a, b) = tokio::join!(first.handle, second.handle);
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn distinct_keys_do_not_coalesce() {
    let registry = InFlightRegistry::new();
    let calls = Arc::new(AtomicU32::new(0));
    let (_tx1, rx1) = oneshot::channel();
    let (_tx2, rx2) = oneshot::channel();

    let a = registry.dedupe(&key("/hot.json"), || gated_fetch(&calls, rx1));
    let b = registry.dedupe(&key("/new.json"), || gated_fetch(&calls, rx2));
    assert!(!a.joined);
    assert!(!b.joined);
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn released_after_success() {
    let registry = InFlightRegistry::new();
    let k = key("/hot.json");

    let pending = registry.dedupe(&k, || async { Ok(Arc::new(json!(1))) }.boxed());
    pending.handle.await.unwrap();

    assert!(!registry.contains(&k));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn released_after_failure() {
    let registry = InFlightRegistry::new();
    let k = key("/hot.json");

    let pending = registry.dedupe(&k, || {
        async {
            Err(HuginnError::RequestFailed {
                cause: "boom".into(),
            })
        }
        .boxed()
    });
    assert!(pending.handle.await.is_err());
    assert!(!registry.contains(&k));

    // a fresh call can start right away
    let retry = registry.dedupe(&k, || async { Ok(Arc::new(json!(2))) }.boxed());
    assert!(!retry.joined);
    assert_eq!(*retry.handle.await.unwrap(), json!(2));
}

#[tokio::test]
async fn released_when_sole_awaiter_drops() {
    let registry = InFlightRegistry::new();
    let calls = Arc::new(AtomicU32::new(0));
    let (_tx, rx) = oneshot::channel();
    let k = key("/hot.json");

    let pending = registry.dedupe(&k, || gated_fetch(&calls, rx));
    let handle = pending.handle.clone();
    let poll = tokio::time::timeout(Duration::from_millis(10), handle).await;
    assert!(poll.is_err(), "call should still be pending");
    assert!(registry.contains(&k));

    drop(pending);
    assert!(!registry.contains(&k));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn survives_while_one_awaiter_remains() {
    let registry = InFlightRegistry::new();
    let calls = Arc::new(AtomicU32::new(0));
    let (tx, rx) = oneshot::channel();
    let k = key("/hot.json");

    let first = registry.dedupe(&k, || gated_fetch(&calls, rx));
    let second = registry.dedupe(&k, || panic!("must join"));
    drop(first);
    assert!(registry.contains(&k));

    tx.send(()).unwrap();
    assert!(second.handle.await.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn clear_forgets_registrations() {
    let registry = InFlightRegistry::new();
    let calls = Arc::new(AtomicU32::new(0));
    let (tx_old, rx_old) = oneshot::channel();
    let (_tx_new, rx_new) = oneshot::channel();
    let k = key("/hot.json");

    let old = registry.dedupe(&k, || gated_fetch(&calls, rx_old));
    registry.clear();
    assert!(!registry.contains(&k));

    let fresh = registry.dedupe(&k, || gated_fetch(&calls, rx_new));
    assert!(!fresh.joined);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // the old call settling must not evict the new registration
    tx_old.send(()).unwrap();
    old.handle.await.unwrap();
    assert!(registry.contains(&k));
}
