//! Request DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters accepted by the history endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct HistoryQuery {
    /// Maximum number of messages to return (capped by configuration).
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: Option<i64>,
}

impl HistoryQuery {
    /// The limit to apply, never above `max`.
    pub fn effective_limit(&self, max: i64) -> i64 {
        self.limit.map_or(max, |l| l.min(max))
    }
}
