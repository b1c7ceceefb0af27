//! Client and server event definitions.
//!
//! Every frame is an envelope `{"event": "<name>", "data": {...}}`. Field
//! names are part of the client contract and keep their camelCase spelling.
//! Signaling bodies are held as [`RawPayload`] so they leave exactly as they
//! arrived.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use validator::Validate;

use huddle_core::types::ConnectionId;

use crate::presence::view::PresenceEntry;

/// A JSON value kept as the exact text the client sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(Box<RawValue>);

impl RawPayload {
    /// Wrap a JSON document without re-encoding it.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        RawValue::from_string(json.to_owned()).map(Self)
    }

    /// The original JSON text.
    pub fn as_str(&self) -> &str {
        self.0.get()
    }
}

impl PartialEq for RawPayload {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Events sent by a client to the server.
///
/// Decoded by [`super::decode`], which reads the envelope first and then the
/// payload for the named event.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Ring another user.
    InitiateCall(InitiateCall),
    /// Enter a call room.
    Join(JoinRoom),
    /// Post to a room.
    ChatMessage(RoomChat),
    /// Message one user.
    PrivateChat(DirectChat),
    /// SDP offer for a peer connection.
    Offer(OfferForward),
    /// SDP answer for a peer connection.
    Answer(AnswerForward),
    /// ICE candidate for a peer connection.
    Ice(IceForward),
}

impl ClientEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitiateCall(_) => "initiate-call",
            Self::Join(_) => "join",
            Self::ChatMessage(_) => "chat-message",
            Self::PrivateChat(_) => "private-chat",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Ice(_) => "ice",
        }
    }

    /// Run field validation on the payload.
    pub fn validate_payload(&self) -> Result<(), validator::ValidationErrors> {
        match self {
            Self::InitiateCall(p) => p.validate(),
            Self::Join(p) => p.validate(),
            Self::ChatMessage(p) => p.validate(),
            Self::PrivateChat(p) => p.validate(),
            Self::Offer(_) | Self::Answer(_) | Self::Ice(_) => Ok(()),
        }
    }
}

/// `initiate-call` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct InitiateCall {
    /// Username being called.
    #[validate(length(min = 1, message = "Call target is required"))]
    pub target: String,
    /// Room both parties will join.
    #[validate(length(min = 1, message = "Call room is required"))]
    pub room: String,
    /// Call type chosen by the client (audio/video), forwarded as-is.
    #[serde(rename = "type", default)]
    pub call_type: Option<RawPayload>,
    /// Call mode chosen by the client, forwarded as-is.
    #[serde(rename = "callMode", default)]
    pub call_mode: Option<RawPayload>,
}

/// `join` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct JoinRoom {
    /// Room to join.
    #[validate(length(min = 1, message = "Room is required"))]
    pub room: String,
}

/// `chat-message` payload. Unknown fields are kept and relayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RoomChat {
    /// Target room.
    #[validate(length(min = 1, message = "Room is required"))]
    pub room: String,
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Any other fields the client attached.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `private-chat` payload. Unknown fields are kept and relayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DirectChat {
    /// Receiving username.
    #[validate(length(min = 1, message = "Recipient is required"))]
    pub to: String,
    /// Message text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Inline image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Any other fields the client attached.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `offer` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferForward {
    /// Target connection.
    pub to: ConnectionId,
    /// Opaque session description.
    pub offer: RawPayload,
}

/// `answer` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerForward {
    /// Target connection.
    pub to: ConnectionId,
    /// Opaque session description.
    pub answer: RawPayload,
}

/// `ice` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceForward {
    /// Target connection.
    pub to: ConnectionId,
    /// Opaque candidate.
    pub candidate: RawPayload,
}

/// Events sent by the server to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// The deduplicated online-user view.
    UpdateUserList(Vec<PresenceEntry>),
    /// Someone is calling.
    IncomingCall(IncomingCall),
    /// The call could not be placed.
    CallRejected(CallRejected),
    /// Another connection entered a room this connection is in.
    UserJoined(UserJoined),
    /// A room message.
    ChatMessage(Relayed<RoomChat>),
    /// A direct message (or the echo of one this connection sent).
    PrivateChat(Relayed<DirectChat>),
    /// A forwarded SDP offer.
    Offer(OfferRelay),
    /// A forwarded SDP answer.
    Answer(AnswerRelay),
    /// A forwarded ICE candidate.
    Ice(IceRelay),
}

impl ServerEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateUserList(_) => "update-user-list",
            Self::IncomingCall(_) => "incoming-call",
            Self::CallRejected(_) => "call-rejected",
            Self::UserJoined(_) => "user-joined",
            Self::ChatMessage(_) => "chat-message",
            Self::PrivateChat(_) => "private-chat",
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::Ice(_) => "ice",
        }
    }
}

/// `incoming-call` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomingCall {
    /// Caller's username.
    pub from: String,
    /// Room the caller proposes.
    pub room: String,
    /// Call type as sent by the caller; `null` when omitted.
    #[serde(rename = "type")]
    pub call_type: Option<RawPayload>,
    /// Call mode as sent by the caller; `null` when omitted.
    #[serde(rename = "callMode")]
    pub call_mode: Option<RawPayload>,
}

/// Sender name carried by rejections the server produces itself.
pub const SYSTEM_SENDER: &str = "System";

/// `call-rejected` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRejected {
    /// Always [`SYSTEM_SENDER`].
    pub from: String,
    /// Why the call failed.
    pub reason: String,
}

impl CallRejected {
    /// The target has no live connection.
    pub fn offline() -> Self {
        Self {
            from: SYSTEM_SENDER.to_string(),
            reason: "offline".to_string(),
        }
    }
}

/// `user-joined` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserJoined {
    /// Joiner's connection id.
    pub id: ConnectionId,
    /// Joiner's username.
    pub username: String,
}

/// A client payload relayed with the sender and a display timestamp added.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relayed<P> {
    /// Everything the client sent.
    #[serde(flatten)]
    pub payload: P,
    /// Sending username.
    pub sender: String,
    /// Wall-clock time at the relay, formatted for display.
    pub time: String,
}

/// Forwarded `offer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferRelay {
    /// Session description, unmodified.
    pub offer: RawPayload,
    /// Sender's connection id.
    pub from: ConnectionId,
    /// Sender's username.
    pub username: String,
}

/// Forwarded `answer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRelay {
    /// Session description, unmodified.
    pub answer: RawPayload,
    /// Sender's connection id.
    pub from: ConnectionId,
}

/// Forwarded `ice`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IceRelay {
    /// Candidate, unmodified.
    pub candidate: RawPayload,
    /// Sender's connection id.
    pub from: ConnectionId,
}
