//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connections accepted since start
    connections_opened: AtomicU64,
    /// Connections currently registered
    connections_active: AtomicU64,
    /// Client events received (valid or not)
    events_received: AtomicU64,
    /// Client events dropped as malformed
    events_ignored: AtomicU64,
    /// Server events queued for delivery
    events_delivered: AtomicU64,
    /// Server events dropped (full queue or closed connection)
    events_dropped: AtomicU64,
    /// Call attempts rejected because the target was offline
    calls_rejected: AtomicU64,
    /// Chat messages durably stored
    messages_persisted: AtomicU64,
    /// Chat message writes that failed
    persist_failures: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        let _ = self
            .connections_active
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
    }

    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn event_ignored(&self) {
        self.events_ignored.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one outbound delivery attempt.
    pub fn delivery(&self, delivered: bool) {
        if delivered {
            self.events_delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.events_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn call_rejected(&self) {
        self.calls_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn message_persisted(&self) {
        self.messages_persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn persist_failed(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            events_received: self.events_received.load(Ordering::Relaxed),
            events_ignored: self.events_ignored.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
            calls_rejected: self.calls_rejected.load(Ordering::Relaxed),
            messages_persisted: self.messages_persisted.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections accepted since start
    pub connections_opened: u64,
    /// Connections currently registered
    pub connections_active: u64,
    /// Client events received
    pub events_received: u64,
    /// Client events dropped as malformed
    pub events_ignored: u64,
    /// Server events queued for delivery
    pub events_delivered: u64,
    /// Server events dropped
    pub events_dropped: u64,
    /// Call attempts rejected as offline
    pub calls_rejected: u64,
    /// Chat messages durably stored
    pub messages_persisted: u64,
    /// Chat message writes that failed
    pub persist_failures: u64,
}
