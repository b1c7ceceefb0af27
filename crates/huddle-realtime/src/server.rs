//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tracing::info;

use huddle_auth::JwtDecoder;
use huddle_core::config::RealtimeConfig;
use huddle_core::traits::{MessageStore, UserDirectory};

use crate::chat::persistence::PersistenceSink;
use crate::chat::relay::MessageRelay;
use crate::connection::authenticator::WsAuthenticator;
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::manager::ConnectionManager;
use crate::metrics::RealtimeMetrics;
use crate::presence::registry::PresenceRegistry;
use crate::room::registry::RoomRegistry;
use crate::signaling::relay::SignalingRelay;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection lifecycle and event dispatch.
    pub connections: Arc<ConnectionManager>,
    /// Live sessions and routes.
    pub presence: Arc<PresenceRegistry>,
    /// Room membership.
    pub rooms: Arc<RoomRegistry>,
    /// Call signaling relay.
    pub signaling: Arc<SignalingRelay>,
    /// Chat relay.
    pub chat: Arc<MessageRelay>,
    /// Connect-time credential check.
    pub authenticator: WsAuthenticator,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Keepalive settings applied to every connection.
    heartbeat: HeartbeatConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(
        config: &RealtimeConfig,
        decoder: Arc<JwtDecoder>,
        messages: Arc<dyn MessageStore>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let presence = Arc::new(PresenceRegistry::new(config.route_release));
        let rooms = Arc::new(RoomRegistry::new());
        let signaling = Arc::new(SignalingRelay::new(presence.clone(), metrics.clone()));
        let chat = Arc::new(MessageRelay::new(
            presence.clone(),
            rooms.clone(),
            PersistenceSink::new(messages, metrics.clone()),
            &config.time_format,
        ));
        let connections = Arc::new(ConnectionManager::new(
            config,
            presence.clone(),
            rooms.clone(),
            signaling.clone(),
            chat.clone(),
            users,
            metrics.clone(),
        ));

        info!(route_release = ?config.route_release, "Real-time engine initialized");

        Self {
            connections,
            presence,
            rooms,
            signaling,
            chat,
            authenticator: WsAuthenticator::new(decoder),
            metrics,
            heartbeat: HeartbeatConfig::from_config(config),
        }
    }

    /// Keepalive settings for new connections.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        self.heartbeat.clone()
    }

    /// Closes every connection. Each one unregisters exactly once.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");
        let closed = self.connections.close_all();
        info!(closed, "Real-time engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use huddle_core::config::AuthConfig;
    use huddle_database::Stores;

    use super::*;
    use crate::test_support::{drain, identity};

    #[tokio::test]
    async fn test_engine_wires_presence_and_shutdown() {
        let stores = Stores::in_memory();
        let engine = RealtimeEngine::new(
            &RealtimeConfig::default(),
            Arc::new(JwtDecoder::new(&AuthConfig::default())),
            stores.messages,
            stores.users,
        );

        let (alice, mut rx) = engine.connections.open(identity(1, "alice")).await;
        assert_eq!(drain(&mut rx).len(), 1);
        assert_eq!(engine.presence.route_to("alice"), Some(alice.id));

        engine.shutdown();
        assert!(!alice.is_alive());
        assert_eq!(engine.presence.connection_count(), 0);
        assert_eq!(engine.metrics.snapshot().connections_active, 0);
    }
}
