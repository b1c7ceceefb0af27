//! HTTP and WebSocket handlers.

pub mod auth;
pub mod health;
pub mod messages;
pub mod presence;
pub mod ws;
