//! Chat message entities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Whether a message was addressed to one user or to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// One-to-one message; `receiver` is set.
    Private,
    /// Room broadcast; `room` is set.
    Group,
}

impl MessageKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored chat message.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    /// Primary key.
    pub id: i64,
    /// Sending username.
    pub sender: String,
    /// Receiving username for private messages.
    pub receiver: Option<String>,
    /// Room for group messages.
    pub room: Option<String>,
    /// Message text.
    pub body: String,
    /// Optional inline image (data URL or remote reference).
    pub image: Option<String>,
    /// Private or group.
    pub kind: MessageKind,
    /// When the store accepted the message.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Sending username.
    pub sender: String,
    /// Receiving username (private only).
    pub receiver: Option<String>,
    /// Room (group only).
    pub room: Option<String>,
    /// Message text.
    pub body: String,
    /// Optional inline image.
    pub image: Option<String>,
    /// Private or group.
    pub kind: MessageKind,
}

impl NewMessage {
    /// A message posted to a room.
    pub fn group(
        sender: impl Into<String>,
        room: impl Into<String>,
        body: impl Into<String>,
        image: Option<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: None,
            room: Some(room.into()),
            body: body.into(),
            image,
            kind: MessageKind::Group,
        }
    }

    /// A message addressed to a single user.
    pub fn private(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        body: impl Into<String>,
        image: Option<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: Some(receiver.into()),
            room: None,
            body: body.into(),
            image,
            kind: MessageKind::Private,
        }
    }
}
