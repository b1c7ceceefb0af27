//! # huddle-realtime
//!
//! Real-time engine for Huddle. Provides:
//!
//! - WebSocket connection handles with bounded outbound queues and heartbeat
//! - The presence registry (live connections, per-username routing, deduplicated online view)
//! - Room membership for broadcast scope
//! - The call signaling relay (call initiation, offer/answer/ICE forwarding)
//! - The chat relay (room and direct messages, fire-and-forget persistence)

pub mod chat;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod room;
pub mod server;
pub mod signaling;

pub use chat::relay::MessageRelay;
pub use connection::manager::ConnectionManager;
pub use presence::registry::PresenceRegistry;
pub use room::registry::RoomRegistry;
pub use server::RealtimeEngine;
pub use signaling::relay::SignalingRelay;
