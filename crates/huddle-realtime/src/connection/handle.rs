//! Individual WebSocket connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use huddle_auth::VerifiedIdentity;
use huddle_core::types::{ConnectionId, UserId};

use crate::message::types::ServerEvent;
use crate::metrics::RealtimeMetrics;

/// A frame queued for the socket writer.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    /// An event to serialize as a text frame.
    Event(ServerEvent),
    /// A transport-level ping.
    Ping,
}

/// A handle to a single WebSocket connection.
///
/// Holds the bounded queue feeding the socket writer, plus the identity
/// verified when the connection was opened. The identity never changes for
/// the lifetime of the handle.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Verified numeric user id
    pub user_id: UserId,
    /// Verified username
    pub username: String,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound frames
    sender: mpsc::Sender<OutboundFrame>,
    /// Last pong (or any inbound frame) received
    last_pong: RwLock<DateTime<Utc>>,
    /// Whether the connection is still alive
    alive: AtomicBool,
    /// Cancelled once the connection is dead
    shutdown: CancellationToken,
    /// Delivery counters
    metrics: Arc<RealtimeMetrics>,
}

impl ConnectionHandle {
    /// Create a handle for a verified identity.
    ///
    /// Returns the handle and the receiving end of its outbound queue, which
    /// the socket writer drains.
    pub fn open(
        identity: VerifiedIdentity,
        buffer_size: usize,
        metrics: Arc<RealtimeMetrics>,
    ) -> (Arc<Self>, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        let now = Utc::now();
        let handle = Self {
            id: ConnectionId::new(),
            user_id: identity.user_id,
            username: identity.username,
            connected_at: now,
            sender: tx,
            last_pong: RwLock::new(now),
            alive: AtomicBool::new(true),
            shutdown: CancellationToken::new(),
            metrics,
        };
        (Arc::new(handle), rx)
    }

    /// Queue an event for this connection without waiting.
    ///
    /// A full queue drops the event; a closed queue marks the handle dead.
    pub fn send(&self, event: ServerEvent) -> bool {
        if !self.is_alive() {
            self.metrics.delivery(false);
            return false;
        }

        let delivered = match self.sender.try_send(OutboundFrame::Event(event)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(frame)) => {
                let name = match &frame {
                    OutboundFrame::Event(event) => event.name(),
                    OutboundFrame::Ping => "ping",
                };
                tracing::warn!(
                    conn_id = %self.id,
                    event = name,
                    "Connection send buffer full, dropping event"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        };
        self.metrics.delivery(delivered);
        delivered
    }

    /// Queue a transport ping. Returns false if the writer is gone.
    pub fn ping(&self) -> bool {
        match self.sender.try_send(OutboundFrame::Ping) {
            Ok(()) => true,
            // A backed-up queue still proves the writer is there.
            Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Record a pong response
    pub fn record_pong(&self) {
        *self.last_pong.write() = Utc::now();
    }

    /// Time elapsed since the last pong.
    pub fn since_last_pong(&self) -> chrono::Duration {
        Utc::now() - *self.last_pong.read()
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead and wake everything waiting on [`closed`](Self::closed).
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.shutdown.cancel();
    }

    /// Resolves once the connection has been marked dead.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::types::CallRejected;
    use crate::test_support::identity;

    fn open(buffer: usize) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundFrame>, Arc<RealtimeMetrics>) {
        let metrics = Arc::new(RealtimeMetrics::new());
        let (handle, rx) = ConnectionHandle::open(identity(1, "alice"), buffer, metrics.clone());
        (handle, rx, metrics)
    }

    fn rejected() -> ServerEvent {
        ServerEvent::CallRejected(CallRejected::offline())
    }

    #[test]
    fn test_send_queues_event() {
        let (handle, mut rx, metrics) = open(4);
        assert!(handle.send(rejected()));
        assert_eq!(rx.try_recv().unwrap(), OutboundFrame::Event(rejected()));
        assert_eq!(metrics.snapshot().events_delivered, 1);
    }

    #[test]
    fn test_full_queue_drops_but_stays_alive() {
        let (handle, _rx, metrics) = open(1);
        assert!(handle.send(rejected()));
        assert!(!handle.send(rejected()));
        assert!(handle.is_alive());
        assert_eq!(metrics.snapshot().events_dropped, 1);
    }

    #[test]
    fn test_closed_queue_marks_dead() {
        let (handle, rx, _) = open(4);
        drop(rx);
        assert!(!handle.send(rejected()));
        assert!(!handle.is_alive());
        assert!(!handle.send(rejected()));
    }

    #[tokio::test]
    async fn test_closed_resolves_after_mark_dead() {
        let (handle, _rx, _) = open(4);
        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.closed().await })
        };
        handle.mark_dead();
        waiter.await.unwrap();
    }

    #[test]
    fn test_record_pong_resets_elapsed() {
        let (handle, _rx, _) = open(4);
        *handle.last_pong.write() = Utc::now() - chrono::Duration::seconds(60);
        assert!(handle.since_last_pong() >= chrono::Duration::seconds(60));
        handle.record_pong();
        assert!(handle.since_last_pong() < chrono::Duration::seconds(5));
    }
}
