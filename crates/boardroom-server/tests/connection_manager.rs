//! Concurrency and lifecycle tests for the WebSocket ConnectionManager.
//!
//! These tests verify supersession, connection-id-guarded removal, and
//! delivery behavior without a real socket in the loop.

use boardroom_server::api_ws::ConnectionManager;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Helper to create a sender whose receiver is dropped immediately.
fn dummy_sender() -> mpsc::Sender<String> {
    mpsc::channel::<String>(1).0
}

#[tokio::test]
async fn test_send_to_missing_session_is_noop() {
    let cm = ConnectionManager::new();

    // Sending to a session that doesn't exist should not panic
    cm.send("ghost", "hello".to_string()).await;
    assert!(!cm.is_connected("ghost").await);
}

#[tokio::test]
async fn test_register_supersedes_and_notifies_the_old_peer() {
    let cm = ConnectionManager::new();

    let (tx1, mut rx1) = mpsc::channel::<String>(16);
    let first_id = cm.register("s1".to_string(), tx1).await;

    let (tx2, mut rx2) = mpsc::channel::<String>(16);
    let second_id = cm.register("s1".to_string(), tx2).await;
    assert_ne!(first_id, second_id);

    // The superseded peer gets one final error frame.
    let notice = rx1.recv().await.expect("expected a supersession notice");
    let parsed: serde_json::Value = serde_json::from_str(&notice).expect("notice is JSON");
    assert_eq!(parsed["type"], "error");
    assert!(
        parsed["content"]
            .as_str()
            .expect("content field")
            .contains("superseded"),
        "notice should state the supersession, got: {}",
        parsed
    );

    // The manager held the only sender for the first connection, so its
    // channel is now closed.
    assert!(rx1.recv().await.is_none(), "old channel should be closed");

    // Frames for the session reach the replacement.
    cm.send("s1", "ping".to_string()).await;
    let msg = rx2.recv().await.expect("replacement should receive");
    assert_eq!(msg, "ping");
}

#[tokio::test]
async fn test_unregister_requires_matching_connection_id() {
    let cm = ConnectionManager::new();

    let first_id = cm.register("s1".to_string(), dummy_sender()).await;
    let second_id = cm.register("s1".to_string(), dummy_sender()).await;

    // The superseded connection's teardown must not evict the replacement.
    assert!(!cm.unregister("s1", first_id).await);
    assert!(cm.is_connected("s1").await);

    assert!(cm.unregister("s1", second_id).await);
    assert!(!cm.is_connected("s1").await);

    // Repeated removal is a stale request, not an error.
    assert!(!cm.unregister("s1", second_id).await);
}

#[tokio::test]
async fn test_sends_are_delivered_in_call_order() {
    let cm = ConnectionManager::new();

    let (tx, mut rx) = mpsc::channel::<String>(16);
    cm.register("s1".to_string(), tx).await;

    for frame in ["one", "two", "three"] {
        cm.send("s1", frame.to_string()).await;
    }

    assert_eq!(rx.recv().await.as_deref(), Some("one"));
    assert_eq!(rx.recv().await.as_deref(), Some("two"));
    assert_eq!(rx.recv().await.as_deref(), Some("three"));
}

#[tokio::test]
async fn test_full_channel_drops_the_frame_without_blocking() {
    let cm = ConnectionManager::new();

    // Capacity 1 and nothing draining: the second send must be dropped.
    let (tx, mut rx) = mpsc::channel::<String>(1);
    cm.register("s1".to_string(), tx).await;

    cm.send("s1", "kept".to_string()).await;
    cm.send("s1", "dropped".to_string()).await;

    assert_eq!(rx.recv().await.as_deref(), Some("kept"));
    assert!(rx.try_recv().is_err(), "overflow frame should be dropped");
}

#[tokio::test]
async fn test_concurrent_replacement_settles_to_one_connection() {
    // Simulate the same session id reconnecting many times concurrently.
    let cm = Arc::new(ConnectionManager::new());
    let mut handles = Vec::new();

    for _ in 0..50 {
        let cm = cm.clone();
        handles.push(tokio::spawn(async move {
            cm.register("reconnecting".to_string(), dummy_sender()).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.expect("registration should not panic"));
    }

    // Exactly one registration survives; all others are stale.
    assert!(cm.is_connected("reconnecting").await);
    let mut survivors = 0;
    for id in ids {
        if cm.unregister("reconnecting", id).await {
            survivors += 1;
        }
    }
    assert_eq!(survivors, 1);
    assert!(!cm.is_connected("reconnecting").await);
}

#[tokio::test]
async fn test_live_sessions_reflects_registrations() {
    let cm = ConnectionManager::new();
    cm.register("s1".to_string(), dummy_sender()).await;
    cm.register("s2".to_string(), dummy_sender()).await;

    let live = cm.live_sessions().await;
    assert_eq!(live.len(), 2);
    assert!(live.contains("s1"));
    assert!(live.contains("s2"));
}
