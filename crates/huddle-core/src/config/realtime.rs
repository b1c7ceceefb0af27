//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// What happens to a username's route when one of its connections closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteRelease {
    /// Drop the route only if it still points at the closing connection.
    #[default]
    OwnerOnly,
    /// Drop the route for the username whichever connection it points at.
    Unconditional,
}

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound queue capacity.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// WebSocket ping interval in seconds.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Seconds without a pong before a connection is considered dead.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Largest accepted inbound text frame, in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
    /// Route release policy applied on disconnect.
    #[serde(default)]
    pub route_release: RouteRelease,
    /// strftime pattern for the display timestamp stamped on relayed chat.
    #[serde(default = "default_time_format")]
    pub time_format: String,
    /// Maximum number of messages returned by history queries.
    #[serde(default = "default_history_limit")]
    pub history_limit: i64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_size: default_outbound_buffer(),
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            max_message_bytes: default_max_message_bytes(),
            route_release: RouteRelease::default(),
            time_format: default_time_format(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_outbound_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    30
}

fn default_ping_timeout() -> u64 {
    10
}

fn default_max_message_bytes() -> usize {
    // Image payloads travel inline, so leave room for a few megabytes.
    8 * 1024 * 1024
}

fn default_time_format() -> String {
    "%I:%M %p".to_string()
}

fn default_history_limit() -> i64 {
    100
}
