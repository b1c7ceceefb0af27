//! Revoked token ids.

use std::time::Duration;

use moka::future::Cache;
use uuid::Uuid;

/// Remembers revoked token ids until the tokens could no longer verify anyway.
#[derive(Debug, Clone)]
pub struct TokenBlocklist {
    revoked: Cache<Uuid, ()>,
}

impl TokenBlocklist {
    /// Entries expire after `retention`, which should cover the longest token lifetime.
    pub fn new(capacity: u64, retention: Duration) -> Self {
        Self {
            revoked: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(retention)
                .build(),
        }
    }

    /// Mark a token id as revoked.
    pub async fn revoke(&self, jti: Uuid) {
        self.revoked.insert(jti, ()).await;
        tracing::info!(jti = %jti, "Token revoked");
    }

    /// Whether a token id has been revoked.
    pub async fn is_revoked(&self, jti: &Uuid) -> bool {
        self.revoked.get(jti).await.is_some()
    }
}
