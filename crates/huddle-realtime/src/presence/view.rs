//! The deduplicated "who is online" view.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use huddle_core::types::{ConnectionId, UserId};

use super::registry::Session;

/// One online user as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    /// Connection id of the representative session.
    pub id: ConnectionId,
    /// Username.
    pub username: String,
    /// Numeric user id.
    pub user_id: UserId,
    /// Avatar captured when the representative session connected.
    pub avatar: Option<String>,
    /// True if any of the user's sessions is in a call room.
    pub is_busy: bool,
}

impl PresenceEntry {
    fn from_session(session: &Session) -> Self {
        Self {
            id: session.handle.id,
            username: session.handle.username.clone(),
            user_id: session.handle.user_id,
            avatar: session.avatar.clone(),
            is_busy: session.is_busy,
        }
    }
}

/// Merge sessions into one entry per username, ordered by username.
///
/// The routed session represents its username when present; otherwise the
/// first session seen does.
pub fn deduplicate<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    routes: &HashMap<String, ConnectionId>,
) -> Vec<PresenceEntry> {
    let mut merged: BTreeMap<&str, PresenceEntry> = BTreeMap::new();

    for session in sessions {
        let username = session.handle.username.as_str();
        match merged.get_mut(username) {
            None => {
                merged.insert(username, PresenceEntry::from_session(session));
            }
            Some(entry) => {
                let busy = entry.is_busy || session.is_busy;
                if routes.get(username) == Some(&session.handle.id) {
                    *entry = PresenceEntry::from_session(session);
                }
                entry.is_busy = busy;
            }
        }
    }

    merged.into_values().collect()
}
