//! Message repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use huddle_core::error::{AppError, ErrorKind};
use huddle_core::result::AppResult;
use huddle_core::traits::MessageStore;
use huddle_entity::message::{ChatMessage, MessageKind, NewMessage};

/// Repository for chat message writes and history reads.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn append_message(&self, message: NewMessage) -> AppResult<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO messages (sender, receiver, room, body, image, kind) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&message.sender)
        .bind(&message.receiver)
        .bind(&message.room)
        .bind(&message.body)
        .bind(&message.image)
        .bind(message.kind)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append message", e))
    }

    async fn recent_direct_history(
        &self,
        user_a: &str,
        user_b: &str,
        limit: i64,
    ) -> AppResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM ( \
                 SELECT * FROM messages \
                 WHERE kind = $1 \
                   AND ((sender = $2 AND receiver = $3) OR (sender = $3 AND receiver = $2)) \
                 ORDER BY created_at DESC, id DESC LIMIT $4 \
             ) recent ORDER BY created_at ASC, id ASC",
        )
        .bind(MessageKind::Private)
        .bind(user_a)
        .bind(user_b)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load direct history", e)
        })
    }

    async fn recent_room_history(&self, room: &str, limit: i64) -> AppResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM ( \
                 SELECT * FROM messages WHERE kind = $1 AND room = $2 \
                 ORDER BY created_at DESC, id DESC LIMIT $3 \
             ) recent ORDER BY created_at ASC, id ASC",
        )
        .bind(MessageKind::Group)
        .bind(room)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load room history", e))
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
