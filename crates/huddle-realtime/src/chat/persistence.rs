//! Fire-and-forget message persistence.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use huddle_core::traits::MessageStore;
use huddle_entity::message::NewMessage;

use crate::metrics::RealtimeMetrics;

/// Hands chat messages to the durable store without blocking the relay.
#[derive(Debug, Clone)]
pub struct PersistenceSink {
    store: Arc<dyn MessageStore>,
    metrics: Arc<RealtimeMetrics>,
}

impl PersistenceSink {
    /// Create a sink writing to `store`.
    pub fn new(store: Arc<dyn MessageStore>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self { store, metrics }
    }

    /// Spawn the write and return immediately.
    ///
    /// Failures are logged and counted, never retried. The returned handle
    /// only exists so callers that care (tests, shutdown) can wait for it.
    pub fn persist(&self, message: NewMessage) -> JoinHandle<()> {
        let store = self.store.clone();
        let metrics = self.metrics.clone();
        tokio::spawn(async move {
            let kind = message.kind;
            let sender = message.sender.clone();
            match store.append_message(message).await {
                Ok(stored) => {
                    metrics.message_persisted();
                    debug!(message_id = stored.id, kind = %kind, sender = %sender, "Message stored");
                }
                Err(e) => {
                    metrics.persist_failed();
                    warn!(kind = %kind, sender = %sender, error = %e, "Failed to store message");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use huddle_database::InMemoryMessageStore;

    use super::*;

    #[tokio::test]
    async fn test_persist_counts_success() {
        let store = Arc::new(InMemoryMessageStore::new());
        let metrics = Arc::new(RealtimeMetrics::new());
        let sink = PersistenceSink::new(store.clone(), metrics.clone());

        sink.persist(NewMessage::group("alice", "r1", "hi", None))
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(metrics.snapshot().messages_persisted, 1);
    }

    #[tokio::test]
    async fn test_persist_failure_is_swallowed() {
        let store = Arc::new(InMemoryMessageStore::new());
        store.set_unavailable(true);
        let metrics = Arc::new(RealtimeMetrics::new());
        let sink = PersistenceSink::new(store.clone(), metrics.clone());

        sink.persist(NewMessage::private("alice", "bob", "hi", None))
            .await
            .unwrap();

        assert!(store.is_empty());
        assert_eq!(metrics.snapshot().persist_failures, 1);
    }
}
