//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use huddle_api::{AppState, build_app};
use huddle_auth::{JwtDecoder, JwtEncoder};
use huddle_core::config::AppConfig;
use huddle_database::{InMemoryMessageStore, InMemoryUserDirectory};
use huddle_realtime::RealtimeEngine;

/// How long to wait for an event that should arrive.
const EVENT_TIMEOUT: Duration = Duration::from_secs(5);
/// How long to watch for an event that should not arrive.
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Test application context
pub struct TestApp {
    /// Bound server address
    pub addr: SocketAddr,
    /// Shared app state
    pub state: AppState,
    /// Message store behind the relay
    pub store: Arc<InMemoryMessageStore>,
    /// Avatar directory
    pub users: Arc<InMemoryUserDirectory>,
    encoder: JwtEncoder,
    _shutdown: oneshot::Sender<()>,
}

/// Response from an in-process HTTP request
pub struct TestResponse {
    /// Status code
    pub status: StatusCode,
    /// Parsed JSON body (`Null` if not JSON)
    pub body: Value,
}

impl TestApp {
    /// Start an app with default configuration
    pub async fn spawn() -> Self {
        Self::spawn_with(AppConfig::default()).await
    }

    /// Start an app with the given configuration
    pub async fn spawn_with(mut config: AppConfig) -> Self {
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let store = Arc::new(InMemoryMessageStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        let decoder = Arc::new(JwtDecoder::new(&config.auth));
        let realtime = Arc::new(RealtimeEngine::new(
            &config.realtime,
            decoder.clone(),
            store.clone(),
            users.clone(),
        ));
        let encoder = JwtEncoder::new(&config.auth);
        let state = AppState::new(config, decoder, realtime, store.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(huddle_api::serve(
            listener,
            state.clone(),
            async move {
                let _ = shutdown_rx.await;
            },
            Duration::from_secs(1),
        ));

        Self {
            addr,
            state,
            store,
            users,
            encoder,
            _shutdown: shutdown_tx,
        }
    }

    /// A valid token for the given identity
    pub fn token(&self, user_id: i64, username: &str) -> String {
        self.encoder.issue(user_id, username).unwrap().token
    }

    /// WebSocket URL with a token query parameter
    pub fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/ws?token={}", self.addr, token)
    }

    /// Connect as a user and wait until the server has registered the session
    pub async fn connect(&self, user_id: i64, username: &str) -> WsClient {
        let (stream, _) = connect_async(self.ws_url(&self.token(user_id, username)))
            .await
            .unwrap();
        let mut client = WsClient {
            username: username.to_string(),
            stream,
        };
        client.wait_for_presence(|list| list_has(list, username)).await;
        client
    }

    /// Issue a GET against the router in-process
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token).await
    }

    /// Issue a body-less POST against the router in-process
    pub async fn post(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::POST, uri, token).await
    }

    async fn request(&self, method: Method, uri: &str, token: Option<&str>) -> TestResponse {
        let app = build_app(self.state.clone(), &self.state.config.server.cors);
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }

    /// Wait until the store holds `count` messages
    pub async fn wait_for_stored(&self, count: usize) {
        tokio::time::timeout(EVENT_TIMEOUT, async {
            while self.store.len() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("messages were not stored in time");
    }
}

/// Whether a presence list contains a username
pub fn list_has(list: &Value, username: &str) -> bool {
    list.as_array()
        .is_some_and(|entries| entries.iter().any(|e| e["username"] == username))
}

/// The presence entry for a username
pub fn entry<'a>(list: &'a Value, username: &str) -> &'a Value {
    list.as_array()
        .and_then(|entries| entries.iter().find(|e| e["username"] == username))
        .unwrap_or_else(|| panic!("{username} missing from presence list {list}"))
}

/// A WebSocket client speaking the event envelope protocol
pub struct WsClient {
    /// Username this client authenticated as
    pub username: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Send an event envelope
    pub async fn emit(&mut self, event: &str, data: Value) {
        self.send_raw(&json!({"event": event, "data": data}).to_string())
            .await;
    }

    /// Send a raw text frame
    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::Text(text.to_string().into()))
            .await
            .unwrap();
    }

    /// Next event envelope, waiting at most `wait`
    async fn next_envelope(&mut self, wait: Duration) -> Option<Value> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let frame = tokio::time::timeout_at(deadline, self.stream.next())
                .await
                .ok()??;
            match frame.ok()? {
                Message::Text(text) => return serde_json::from_str(text.as_str()).ok(),
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Data of the next event named `event`, skipping others, or `None` if
    /// none arrives within `wait`
    pub async fn next_event(&mut self, event: &str, wait: Duration) -> Option<Value> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            let envelope = self.next_envelope(remaining).await?;
            if envelope["event"] == event {
                return Some(envelope["data"].clone());
            }
        }
    }

    /// Data of the next event named `event`; panics on timeout
    pub async fn expect_event(&mut self, event: &str) -> Value {
        let username = self.username.clone();
        self.next_event(event, EVENT_TIMEOUT)
            .await
            .unwrap_or_else(|| panic!("{username} never received {event}"))
    }

    /// Wait for an `update-user-list` satisfying `predicate` and return it
    pub async fn wait_for_presence(&mut self, predicate: impl Fn(&Value) -> bool) -> Value {
        loop {
            let list = self.expect_event("update-user-list").await;
            if predicate(&list) {
                return list;
            }
        }
    }

    /// Close the connection
    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
