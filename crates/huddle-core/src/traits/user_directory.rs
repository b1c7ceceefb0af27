//! Read-only access to durable user attributes.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::UserId;

/// Lookup of durable user attributes captured at connection time.
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Return the user's avatar reference (URL or encoded image), if any.
    async fn lookup_avatar(&self, user_id: UserId) -> AppResult<Option<String>>;
}
