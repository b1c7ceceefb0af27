//! Connection manager: handles connection lifecycle (open, close, event dispatch).

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use huddle_auth::VerifiedIdentity;
use huddle_core::config::RealtimeConfig;
use huddle_core::traits::UserDirectory;
use huddle_core::types::ConnectionId;

use crate::chat::relay::MessageRelay;
use crate::message::codec;
use crate::message::types::ClientEvent;
use crate::metrics::RealtimeMetrics;
use crate::presence::registry::PresenceRegistry;
use crate::room::registry::RoomRegistry;
use crate::signaling::relay::SignalingRelay;

use super::handle::{ConnectionHandle, OutboundFrame};

/// Manages all active WebSocket connections.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Presence registry.
    presence: Arc<PresenceRegistry>,
    /// Room membership.
    rooms: Arc<RoomRegistry>,
    /// Call signaling.
    signaling: Arc<SignalingRelay>,
    /// Chat relay.
    chat: Arc<MessageRelay>,
    /// Avatar lookup.
    users: Arc<dyn UserDirectory>,
    /// Metrics.
    metrics: Arc<RealtimeMetrics>,
    /// Per-connection outbound queue capacity.
    buffer_size: usize,
    /// Largest accepted inbound frame.
    max_message_bytes: usize,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: &RealtimeConfig,
        presence: Arc<PresenceRegistry>,
        rooms: Arc<RoomRegistry>,
        signaling: Arc<SignalingRelay>,
        chat: Arc<MessageRelay>,
        users: Arc<dyn UserDirectory>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            presence,
            rooms,
            signaling,
            chat,
            users,
            metrics,
            buffer_size: config.outbound_buffer_size,
            max_message_bytes: config.max_message_bytes,
        }
    }

    /// Registers a verified connection.
    ///
    /// Looks up the user's avatar, creates the handle, and records the
    /// session, which broadcasts the new online view. Returns the handle and
    /// the receiver the socket writer drains.
    pub async fn open(
        &self,
        identity: VerifiedIdentity,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundFrame>) {
        let avatar = match self.users.lookup_avatar(identity.user_id).await {
            Ok(avatar) => avatar,
            Err(e) => {
                warn!(
                    user_id = identity.user_id,
                    username = %identity.username,
                    error = %e,
                    "Avatar lookup failed, connecting without one"
                );
                None
            }
        };

        let (handle, rx) =
            ConnectionHandle::open(identity, self.buffer_size, self.metrics.clone());
        self.presence.register(handle.clone(), avatar);
        self.metrics.connection_opened();
        (handle, rx)
    }

    /// Tears down a connection.
    ///
    /// Safe to call from every close path; only the first call for a
    /// connection unregisters it. Returns whether this call did the work.
    pub fn close(&self, conn_id: &ConnectionId) -> bool {
        let Some(session) = self.presence.unregister(conn_id) else {
            return false;
        };

        let rooms = self.rooms.leave_all(*conn_id);
        session.handle.mark_dead();
        self.metrics.connection_closed();

        debug!(conn_id = %conn_id, rooms = rooms.len(), "Connection closed");
        true
    }

    /// Closes every live connection.
    pub fn close_all(&self) -> usize {
        let handles = self.presence.all_handles();
        let closed = handles.iter().filter(|h| self.close(&h.id)).count();
        info!(closed, "Closed all realtime connections");
        closed
    }

    /// Processes one inbound text frame from a client.
    ///
    /// Frames that do not decode are logged and dropped; the connection
    /// stays open.
    pub fn handle_inbound(&self, handle: &ConnectionHandle, raw: &str) {
        self.metrics.event_received();

        let event = match codec::decode(raw, self.max_message_bytes) {
            Ok(event) => event,
            Err(e) => {
                self.metrics.event_ignored();
                warn!(conn_id = %handle.id, error = %e, "Ignoring inbound frame");
                return;
            }
        };

        debug!(conn_id = %handle.id, event = event.name(), "Inbound event");

        match event {
            ClientEvent::InitiateCall(call) => self.signaling.initiate_call(handle, call),
            ClientEvent::Join(join) => self.chat.join(handle, join),
            ClientEvent::ChatMessage(chat) => {
                self.chat.broadcast_to_room(handle, chat);
            }
            ClientEvent::PrivateChat(chat) => {
                self.chat.send_direct(handle, chat);
            }
            ClientEvent::Offer(offer) => self.signaling.relay_offer(handle, offer),
            ClientEvent::Answer(answer) => self.signaling.relay_answer(handle, answer),
            ClientEvent::Ice(ice) => self.signaling.relay_ice(handle, ice),
        }
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.presence.connection_count()
    }
}
