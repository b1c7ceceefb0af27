//! Wire protocol: client and server events and their JSON framing.

pub mod codec;
pub mod types;

pub use codec::{InboundError, decode, encode};
pub use types::{ClientEvent, RawPayload, ServerEvent};
