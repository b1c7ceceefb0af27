//! WebSocket upgrade handler.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use huddle_auth::VerifiedIdentity;
use huddle_realtime::connection::{OutboundFrame, run_heartbeat};
use huddle_realtime::message::codec;

use crate::error::ApiResult;
use crate::state::AppState;

/// Query parameters for WebSocket authentication.
#[derive(Debug, Default, serde::Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: Option<String>,
}

/// GET /ws?token={jwt}: WebSocket upgrade
///
/// The credential comes from the `token` query parameter, or from an
/// `Authorization: Bearer` header when the parameter is absent. It is
/// verified before the upgrade, so a refused connection never touches
/// presence state.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> ApiResult<Response> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .typed_get::<Authorization<Bearer>>()
                .map(|auth| auth.token().to_string())
        });

    let identity = state
        .realtime
        .authenticator
        .authenticate(token.as_deref())
        .await?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, identity, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, identity: VerifiedIdentity, socket: WebSocket) {
    let engine = state.realtime.clone();
    let (handle, mut outbound_rx) = engine.connections.open(identity).await;
    let conn_id = handle.id;

    info!(
        conn_id = %conn_id,
        user_id = handle.user_id,
        username = %handle.username,
        "WebSocket connection established"
    );

    let (mut ws_tx, mut ws_rx) = socket.split();

    tokio::spawn(run_heartbeat(handle.clone(), engine.heartbeat_config()));

    // Outbound forwarder
    let writer = handle.clone();
    tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                _ = writer.closed() => break,
                frame = outbound_rx.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };

            let message = match frame {
                OutboundFrame::Event(event) => match codec::encode(&event) {
                    Ok(text) => Message::Text(text.into()),
                    Err(e) => {
                        warn!(conn_id = %writer.id, event = event.name(), error = %e, "Failed to encode event");
                        continue;
                    }
                },
                OutboundFrame::Ping => Message::Ping(Bytes::new()),
            };

            if ws_tx.send(message).await.is_err() {
                writer.mark_dead();
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    // Inbound events, processed in arrival order
    loop {
        let next = tokio::select! {
            _ = handle.closed() => break,
            next = ws_rx.next() => next,
        };

        match next {
            Some(Ok(Message::Text(text))) => {
                handle.record_pong();
                engine.connections.handle_inbound(&handle, text.as_str());
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => handle.record_pong(),
            Some(Err(e)) => {
                debug!(conn_id = %conn_id, error = %e, "WebSocket read error");
                break;
            }
        }
    }

    engine.connections.close(&conn_id);
    handle.mark_dead();

    info!(
        conn_id = %conn_id,
        username = %handle.username,
        "WebSocket connection closed"
    );
}
