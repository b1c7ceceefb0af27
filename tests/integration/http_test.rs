//! HTTP endpoint tests.

use serde_json::json;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::helpers::{TestApp, list_has};

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/health", None).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_detailed_health_counts_connections() {
    let app = TestApp::spawn().await;
    let _alice = app.connect(1, "alice").await;
    let _alice_again = app.connect(1, "alice").await;

    let response = app.get("/api/health/detailed", None).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["data"]["ws_connections"], 2);
    assert_eq!(response.body["data"]["online_users"], 1);
    assert_eq!(response.body["data"]["realtime"]["connections_opened"], 2);
}

#[tokio::test]
async fn test_detailed_health_reports_degraded_store() {
    let app = TestApp::spawn().await;
    app.store.set_unavailable(true);

    let response = app.get("/api/health/detailed", None).await;
    assert_eq!(response.body["data"]["status"], "degraded");
}

#[tokio::test]
async fn test_presence_requires_auth() {
    let app = TestApp::spawn().await;

    let response = app.get("/api/presence", None).await;
    assert_eq!(response.status, 401);

    let response = app.get("/api/presence", Some("garbage")).await;
    assert_eq!(response.status, 401);
}

#[tokio::test]
async fn test_presence_lists_online_users() {
    let app = TestApp::spawn().await;
    let _alice = app.connect(1, "alice").await;
    let token = app.token(2, "bob");

    let response = app.get("/api/presence", Some(&token)).await;
    assert_eq!(response.status, 200);
    assert!(list_has(&response.body["data"], "alice"));
    assert!(!list_has(&response.body["data"], "bob"));
}

#[tokio::test]
async fn test_direct_history_after_private_chat() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect(1, "alice").await;

    alice
        .emit("private-chat", json!({"to": "bob", "text": "one"}))
        .await;
    alice
        .emit("private-chat", json!({"to": "bob", "text": "two"}))
        .await;
    app.wait_for_stored(2).await;

    let bob_token = app.token(2, "bob");
    let response = app
        .get("/api/messages/direct/alice", Some(&bob_token))
        .await;
    assert_eq!(response.status, 200);

    let data = response.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["text"], "one");
    assert_eq!(data[1]["text"], "two");
    assert_eq!(data[1]["sender"], "alice");

    let carol_token = app.token(3, "carol");
    let response = app
        .get("/api/messages/direct/alice", Some(&carol_token))
        .await;
    assert_eq!(response.body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_room_history_respects_limit() {
    let app = TestApp::spawn().await;
    let mut alice = app.connect(1, "alice").await;

    alice.emit("join", json!({"room": "r1"})).await;
    for text in ["a", "b", "c"] {
        alice
            .emit("chat-message", json!({"room": "r1", "text": text}))
            .await;
    }
    app.wait_for_stored(3).await;

    let token = app.token(1, "alice");
    let response = app
        .get("/api/messages/room/r1?limit=2", Some(&token))
        .await;
    assert_eq!(response.status, 200);
    let data = response.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[1]["text"], "c");

    let response = app
        .get("/api/messages/room/r1?limit=0", Some(&token))
        .await;
    assert_eq!(response.status, 400);
}

#[tokio::test]
async fn test_revoked_token_is_refused() {
    let app = TestApp::spawn().await;
    let token = app.token(1, "alice");

    let response = app.post("/api/auth/revoke", Some(&token)).await;
    assert_eq!(response.status, 200);
    assert!(response.body["data"]["token_id"].is_string());

    match connect_async(app.ws_url(&token)).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("expected 401 handshake failure, got {:?}", other.map(|_| ())),
    }
    assert_eq!(app.get("/api/presence", Some(&token)).await.status, 401);
    assert_eq!(app.post("/api/auth/revoke", Some(&token)).await.status, 401);

    // A freshly issued token for the same user is unaffected
    let _alice = app.connect(1, "alice").await;
}

#[tokio::test]
async fn test_revoke_requires_auth() {
    let app = TestApp::spawn().await;
    assert_eq!(app.post("/api/auth/revoke", None).await.status, 401);
}
