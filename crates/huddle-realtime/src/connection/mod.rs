//! Connection handles, credential checks, heartbeat, and lifecycle management.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod manager;

pub use authenticator::WsAuthenticator;
pub use handle::{ConnectionHandle, OutboundFrame};
pub use heartbeat::{HeartbeatConfig, run_heartbeat};
pub use manager::ConnectionManager;
