//! Durable message store consumed by the message relay and history handlers.

use async_trait::async_trait;

use huddle_entity::message::{ChatMessage, NewMessage};

use crate::result::AppResult;

/// Durable store for chat messages.
///
/// The relay only ever appends; reads back are served to history endpoints.
/// History is returned oldest first.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append a message, returning the stored record with its assigned id
    /// and timestamp.
    async fn append_message(&self, message: NewMessage) -> AppResult<ChatMessage>;

    /// The most recent private messages exchanged between two usernames,
    /// in either direction.
    async fn recent_direct_history(
        &self,
        user_a: &str,
        user_b: &str,
        limit: i64,
    ) -> AppResult<Vec<ChatMessage>>;

    /// The most recent group messages posted to a room.
    async fn recent_room_history(&self, room: &str, limit: i64) -> AppResult<Vec<ChatMessage>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
