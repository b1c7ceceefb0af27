//! In-memory store implementations for tests and database-less runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use huddle_core::error::AppError;
use huddle_core::result::AppResult;
use huddle_core::traits::{MessageStore, UserDirectory};
use huddle_core::types::UserId;
use huddle_entity::message::{ChatMessage, MessageKind, NewMessage};

/// Message store keeping everything in a process-local vector.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: Mutex<Vec<ChatMessage>>,
    next_id: AtomicI64,
    unavailable: AtomicBool,
}

impl InMemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored messages.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Whether nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored message, oldest first.
    pub fn all(&self) -> Vec<ChatMessage> {
        self.messages.lock().clone()
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::database("Message store unavailable"));
        }
        Ok(())
    }

    fn tail(mut matching: Vec<ChatMessage>, limit: i64) -> Vec<ChatMessage> {
        let keep = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        if matching.len() > keep {
            matching.drain(..matching.len() - keep);
        }
        matching
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append_message(&self, message: NewMessage) -> AppResult<ChatMessage> {
        self.check_available()?;

        let stored = ChatMessage {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            sender: message.sender,
            receiver: message.receiver,
            room: message.room,
            body: message.body,
            image: message.image,
            kind: message.kind,
            created_at: Utc::now(),
        };
        self.messages.lock().push(stored.clone());
        Ok(stored)
    }

    async fn recent_direct_history(
        &self,
        user_a: &str,
        user_b: &str,
        limit: i64,
    ) -> AppResult<Vec<ChatMessage>> {
        self.check_available()?;

        let matching = self
            .messages
            .lock()
            .iter()
            .filter(|m| m.kind == MessageKind::Private)
            .filter(|m| {
                let receiver = m.receiver.as_deref().unwrap_or_default();
                (m.sender == user_a && receiver == user_b)
                    || (m.sender == user_b && receiver == user_a)
            })
            .cloned()
            .collect();
        Ok(Self::tail(matching, limit))
    }

    async fn recent_room_history(&self, room: &str, limit: i64) -> AppResult<Vec<ChatMessage>> {
        self.check_available()?;

        let matching = self
            .messages
            .lock()
            .iter()
            .filter(|m| m.kind == MessageKind::Group && m.room.as_deref() == Some(room))
            .cloned()
            .collect();
        Ok(Self::tail(matching, limit))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}

/// User directory backed by a map of user id to avatar.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    avatars: RwLock<HashMap<UserId, String>>,
}

impl InMemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an avatar for a user.
    pub fn set_avatar(&self, user_id: UserId, avatar: impl Into<String>) {
        self.avatars.write().insert(user_id, avatar.into());
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn lookup_avatar(&self, user_id: UserId) -> AppResult<Option<String>> {
        Ok(self.avatars.read().get(&user_id).cloned())
    }
}
