//! WebSocket protocol tests.

use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::helpers::{QUIET_PERIOD, TestApp, entry, list_has};

#[tokio::test]
async fn test_ws_rejects_invalid_token() {
    let app = TestApp::spawn().await;

    match connect_async(app.ws_url("not-a-jwt")).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("expected 401 handshake failure, got {:?}", other.map(|_| ())),
    }
    assert_eq!(app.state.realtime.connections.connection_count(), 0);
}

#[tokio::test]
async fn test_ws_rejects_missing_token() {
    let app = TestApp::spawn().await;

    let url = format!("ws://{}/ws", app.addr);
    match connect_async(url).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("expected 401 handshake failure, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_presence_list_carries_avatar() {
    let app = TestApp::spawn().await;
    app.users.set_avatar(1, "alice.png");

    let mut alice = app.connect(1, "alice").await;
    let _bob = app.connect(2, "bob").await;

    let list = alice.wait_for_presence(|l| list_has(l, "bob")).await;
    assert_eq!(entry(&list, "alice")["avatar"], "alice.png");
    assert_eq!(entry(&list, "alice")["userId"], 1);
    assert_eq!(entry(&list, "bob")["isBusy"], false);
}

#[tokio::test]
async fn test_call_routes_to_latest_connection() {
    let app = TestApp::spawn().await;

    let mut first = app.connect(1, "alice").await;
    let mut second = app.connect(1, "alice").await;
    let mut bob = app.connect(2, "bob").await;

    // Both alice connections collapse into one entry
    assert_eq!(app.state.realtime.presence.snapshot().len(), 2);

    bob.emit(
        "initiate-call",
        json!({"target": "alice", "room": "r1", "type": "video", "callMode": "1:1"}),
    )
    .await;

    let call = second.expect_event("incoming-call").await;
    assert_eq!(call["from"], "bob");
    assert_eq!(call["room"], "r1");
    assert_eq!(call["type"], "video");
    assert_eq!(call["callMode"], "1:1");

    assert!(first.next_event("incoming-call", QUIET_PERIOD).await.is_none());
}

#[tokio::test]
async fn test_call_to_offline_user_is_rejected() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect(1, "alice").await;

    alice
        .emit("initiate-call", json!({"target": "ghost", "room": "r1"}))
        .await;

    let rejected = alice.expect_event("call-rejected").await;
    assert_eq!(rejected["from"], "System");
    assert_eq!(rejected["reason"], "offline");
    assert!(alice.next_event("call-rejected", QUIET_PERIOD).await.is_none());
}

#[tokio::test]
async fn test_call_after_disconnect_is_rejected() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect(1, "alice").await;
    let bob = app.connect(2, "bob").await;

    bob.close().await;
    alice.wait_for_presence(|l| !list_has(l, "bob")).await;

    alice
        .emit("initiate-call", json!({"target": "bob", "room": "r1"}))
        .await;
    alice.expect_event("call-rejected").await;
}

#[tokio::test]
async fn test_room_chat_reaches_members_but_not_sender() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect(1, "alice").await;
    let mut bob = app.connect(2, "bob").await;

    alice.emit("join", json!({"room": "r1"})).await;
    alice
        .wait_for_presence(|l| list_has(l, "alice") && entry(l, "alice")["isBusy"] == true)
        .await;

    bob.emit("join", json!({"room": "r1"})).await;
    let joined = alice.expect_event("user-joined").await;
    assert_eq!(joined["username"], "bob");

    alice
        .emit("chat-message", json!({"room": "r1", "text": "hi"}))
        .await;

    let msg = bob.expect_event("chat-message").await;
    assert_eq!(msg["room"], "r1");
    assert_eq!(msg["text"], "hi");
    assert_eq!(msg["sender"], "alice");
    assert!(msg["time"].is_string());

    assert!(alice.next_event("chat-message", QUIET_PERIOD).await.is_none());

    app.wait_for_stored(1).await;
    let stored = app.store.all();
    assert_eq!(stored[0].room.as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_private_chat_forwards_and_echoes() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect(1, "alice").await;
    let mut bob = app.connect(2, "bob").await;

    alice
        .emit(
            "private-chat",
            json!({"to": "bob", "text": "psst", "clientId": "c-1"}),
        )
        .await;

    let received = bob.expect_event("private-chat").await;
    assert_eq!(received["text"], "psst");
    assert_eq!(received["sender"], "alice");
    assert_eq!(received["clientId"], "c-1");

    let echo = alice.expect_event("private-chat").await;
    assert_eq!(echo["to"], "bob");
    assert_eq!(echo["sender"], "alice");
}

#[tokio::test]
async fn test_private_chat_to_offline_user_is_stored_and_echoed() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect(1, "alice").await;

    alice
        .emit("private-chat", json!({"to": "carol", "text": "later"}))
        .await;

    let echo = alice.expect_event("private-chat").await;
    assert_eq!(echo["to"], "carol");

    app.wait_for_stored(1).await;
    let stored = app.store.all();
    assert_eq!(stored[0].receiver.as_deref(), Some("carol"));
    assert_eq!(stored[0].body, "later");
}

#[tokio::test]
async fn test_offer_is_relayed_verbatim() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect(1, "alice").await;
    let mut bob = app.connect(2, "bob").await;

    let list = alice.wait_for_presence(|l| list_has(l, "bob")).await;
    let alice_id = entry(&list, "alice")["id"].clone();
    let bob_id = entry(&list, "bob")["id"].clone();

    let offer = json!({"type": "offer", "sdp": "v=0\r\no=- 1 2 IN IP4 0.0.0.0"});
    alice
        .emit("offer", json!({"to": &bob_id, "offer": &offer}))
        .await;

    let relayed = bob.expect_event("offer").await;
    assert_eq!(relayed["offer"], offer);
    assert_eq!(relayed["from"], alice_id);
    assert_eq!(relayed["username"], "alice");

    bob.emit("ice", json!({"to": &alice_id, "candidate": {"candidate": "c0"}}))
        .await;
    let ice = alice.expect_event("ice").await;
    assert_eq!(ice["candidate"]["candidate"], "c0");
    assert_eq!(ice["from"], bob_id);
}

#[tokio::test]
async fn test_malformed_frames_keep_connection_open() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect(1, "alice").await;

    alice.send_raw("not json at all").await;
    alice.emit("no-such-event", json!({})).await;
    alice.emit("initiate-call", json!({"room": "r1"})).await;

    alice
        .emit("private-chat", json!({"to": "alice", "text": "still here"}))
        .await;
    let echo = alice.expect_event("private-chat").await;
    assert_eq!(echo["text"], "still here");
    assert!(alice.next_event("private-chat", QUIET_PERIOD).await.is_none());

    let metrics = app.state.realtime.metrics.snapshot();
    assert!(metrics.events_ignored >= 3);
}
