//! User profile as seen by the real-time core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The slice of a user account the presence layer reads.
///
/// Accounts are created and maintained by the registration service; this
/// crate only reads them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    /// Numeric user id.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Avatar reference (URL or encoded image).
    pub avatar: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
