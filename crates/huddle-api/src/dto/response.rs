//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use huddle_entity::message::{ChatMessage, MessageKind};
use huddle_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A stored chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message id.
    pub id: i64,
    /// Sending username.
    pub sender: String,
    /// Receiving username (direct messages).
    pub receiver: Option<String>,
    /// Room (room messages).
    pub room: Option<String>,
    /// Message text.
    pub text: String,
    /// Inline image.
    pub image: Option<String>,
    /// `private` or `group`.
    pub kind: MessageKind,
    /// When the message was stored.
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for MessageResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            sender: m.sender,
            receiver: m.receiver,
            room: m.room,
            text: m.body,
            image: m.image,
            kind: m.kind,
            created_at: m.created_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Uptime.
    pub uptime_seconds: u64,
}

/// Detailed health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Message store status.
    pub store: String,
    /// Live WebSocket connections.
    pub ws_connections: usize,
    /// Distinct usernames online.
    pub online_users: usize,
    /// Non-empty rooms.
    pub rooms: usize,
    /// Relay counters.
    pub realtime: MetricsSnapshot,
}

/// Result of revoking the caller's token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevokedTokenResponse {
    /// Id of the revoked token.
    pub token_id: String,
    /// When the token would have expired anyway.
    pub expires_at: DateTime<Utc>,
}
