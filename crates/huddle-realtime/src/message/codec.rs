//! Decoding of inbound text frames and encoding of outbound events.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use thiserror::Error;

use super::types::{ClientEvent, ServerEvent};

/// Keys the relay sets itself on chat events; client copies are discarded.
const RELAY_ASSIGNED_KEYS: [&str; 2] = ["sender", "time"];

/// Reasons an inbound frame is ignored.
#[derive(Debug, Error)]
pub enum InboundError {
    /// The frame is larger than the configured limit.
    #[error("Frame of {size} bytes exceeds the {max} byte limit")]
    TooLarge {
        /// Frame size.
        size: usize,
        /// Configured limit.
        max: usize,
    },
    /// The frame is blank.
    #[error("Empty frame")]
    Empty,
    /// Not an event envelope, or the payload does not fit the event.
    #[error("Malformed event: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The envelope names an event the server does not handle.
    #[error("Unknown event: {0}")]
    UnknownEvent(String),
    /// A required field is missing or blank.
    #[error("Invalid payload: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Decode one inbound text frame.
pub fn decode(raw: &str, max_bytes: usize) -> Result<ClientEvent, InboundError> {
    if raw.len() > max_bytes {
        return Err(InboundError::TooLarge {
            size: raw.len(),
            max: max_bytes,
        });
    }
    if raw.trim().is_empty() {
        return Err(InboundError::Empty);
    }

    let envelope: Envelope<'_> = serde_json::from_str(raw)?;
    let mut event = parse_payload(&envelope.event, envelope.data)?;
    event.validate_payload()?;

    match &mut event {
        ClientEvent::ChatMessage(chat) => {
            for key in RELAY_ASSIGNED_KEYS {
                chat.extra.remove(key);
            }
        }
        ClientEvent::PrivateChat(chat) => {
            for key in RELAY_ASSIGNED_KEYS {
                chat.extra.remove(key);
            }
        }
        _ => {}
    }

    Ok(event)
}

/// `{"event": ..., "data": ...}` with the payload left unparsed, so key order
/// in the envelope does not matter and signaling bodies keep their bytes.
#[derive(Deserialize)]
struct Envelope<'a> {
    event: String,
    #[serde(borrow)]
    data: &'a RawValue,
}

fn parse_payload(event: &str, data: &RawValue) -> Result<ClientEvent, InboundError> {
    fn payload<T: DeserializeOwned>(data: &RawValue) -> Result<T, InboundError> {
        Ok(serde_json::from_str(data.get())?)
    }

    Ok(match event {
        "initiate-call" => ClientEvent::InitiateCall(payload(data)?),
        "join" => ClientEvent::Join(payload(data)?),
        "chat-message" => ClientEvent::ChatMessage(payload(data)?),
        "private-chat" => ClientEvent::PrivateChat(payload(data)?),
        "offer" => ClientEvent::Offer(payload(data)?),
        "answer" => ClientEvent::Answer(payload(data)?),
        "ice" => ClientEvent::Ice(payload(data)?),
        other => return Err(InboundError::UnknownEvent(other.to_string())),
    })
}

/// Encode an outbound event as a JSON text frame.
pub fn encode(event: &ServerEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(event)
}
