//! Ping/pong heartbeat for WebSocket keepalive.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use huddle_core::config::RealtimeConfig;

use super::handle::ConnectionHandle;

/// Heartbeat configuration
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Grace period after a missed pong before the connection is dead
    pub ping_timeout: Duration,
}

impl HeartbeatConfig {
    /// Build from the realtime configuration section.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds.max(1)),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }

    /// Longest silence tolerated before the connection is declared dead.
    pub fn max_silence(&self) -> Duration {
        self.ping_interval + self.ping_timeout
    }
}

/// Run heartbeat loop for a connection.
///
/// Sends periodic pings and marks the connection dead when nothing has been
/// heard from the peer for a full interval plus the timeout. Returns when the
/// connection is closed for any reason.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.ping_interval);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = handle.closed() => break,
            _ = interval.tick() => {}
        }

        if let Ok(silence) = handle.since_last_pong().to_std() {
            if silence > config.max_silence() {
                tracing::warn!(
                    conn_id = %handle.id,
                    username = %handle.username,
                    silence_ms = silence.as_millis() as u64,
                    "Connection heartbeat timeout"
                );
                handle.mark_dead();
                break;
            }
        }

        if !handle.ping() {
            tracing::debug!(conn_id = %handle.id, "Ping send failed, connection is gone");
            break;
        }
    }

    tracing::debug!(conn_id = %handle.id, "Heartbeat loop ended");
}
