//! Signaling relay: forwards call-setup handshakes between two connections.
//!
//! Payloads are opaque; the relay never inspects offer, answer, or candidate
//! bodies. After the initial call is routed by username, every forward is
//! addressed by connection id, and a forward to a connection that no longer
//! exists is dropped.

use std::sync::Arc;

use tracing::debug;

use huddle_core::types::ConnectionId;

use crate::connection::handle::ConnectionHandle;
use crate::message::types::{
    AnswerForward, AnswerRelay, CallRejected, IceForward, IceRelay, IncomingCall, InitiateCall,
    OfferForward, OfferRelay, ServerEvent,
};
use crate::metrics::RealtimeMetrics;
use crate::presence::registry::PresenceRegistry;

/// Routes call signaling between connections.
#[derive(Debug)]
pub struct SignalingRelay {
    presence: Arc<PresenceRegistry>,
    metrics: Arc<RealtimeMetrics>,
}

impl SignalingRelay {
    /// Creates a relay over the given registry.
    pub fn new(presence: Arc<PresenceRegistry>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self { presence, metrics }
    }

    /// Ring the target username's routed connection, or tell the caller the
    /// target is offline. Presence state is not touched.
    pub fn initiate_call(&self, from: &ConnectionHandle, call: InitiateCall) {
        let Some(target) = self.presence.resolve(&call.target) else {
            debug!(
                conn_id = %from.id,
                caller = %from.username,
                target = %call.target,
                "Call target offline"
            );
            self.metrics.call_rejected();
            from.send(ServerEvent::CallRejected(CallRejected::offline()));
            return;
        };

        debug!(
            conn_id = %from.id,
            caller = %from.username,
            target_conn = %target.id,
            room = %call.room,
            "Forwarding incoming call"
        );
        target.send(ServerEvent::IncomingCall(IncomingCall {
            from: from.username.clone(),
            room: call.room,
            call_type: call.call_type,
            call_mode: call.call_mode,
        }));
    }

    /// Forward an SDP offer, tagged with the sender's id and username.
    pub fn relay_offer(&self, from: &ConnectionHandle, forward: OfferForward) {
        self.forward(
            from,
            forward.to,
            ServerEvent::Offer(OfferRelay {
                offer: forward.offer,
                from: from.id,
                username: from.username.clone(),
            }),
        );
    }

    /// Forward an SDP answer, tagged with the sender's id.
    pub fn relay_answer(&self, from: &ConnectionHandle, forward: AnswerForward) {
        self.forward(
            from,
            forward.to,
            ServerEvent::Answer(AnswerRelay {
                answer: forward.answer,
                from: from.id,
            }),
        );
    }

    /// Forward an ICE candidate, tagged with the sender's id.
    pub fn relay_ice(&self, from: &ConnectionHandle, forward: IceForward) {
        self.forward(
            from,
            forward.to,
            ServerEvent::Ice(IceRelay {
                candidate: forward.candidate,
                from: from.id,
            }),
        );
    }

    fn forward(&self, from: &ConnectionHandle, to: ConnectionId, event: ServerEvent) {
        match self.presence.get(&to) {
            Some(target) => {
                target.send(event);
            }
            None => debug!(
                conn_id = %from.id,
                target_conn = %to,
                event = event.name(),
                "Signaling target gone, dropping"
            ),
        }
    }
}
