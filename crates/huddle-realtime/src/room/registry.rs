//! Room registry: manages room membership in both directions.

use std::collections::HashSet;

use dashmap::DashMap;

use huddle_core::types::ConnectionId;

/// Registry of ephemeral rooms.
///
/// Rooms exist only while they have members.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Room name → member connections.
    rooms: DashMap<String, HashSet<ConnectionId>>,
    /// Connection → rooms it is in (reverse index).
    memberships: DashMap<ConnectionId, HashSet<String>>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a room. Returns false if it was already a member.
    pub fn join(&self, room: &str, conn_id: ConnectionId) -> bool {
        let added = self
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn_id);
        self.memberships
            .entry(conn_id)
            .or_default()
            .insert(room.to_string());
        added
    }

    /// Removes a connection from one room.
    pub fn leave(&self, room: &str, conn_id: ConnectionId) {
        self.remove_member(room, conn_id);
        if let Some(mut rooms) = self.memberships.get_mut(&conn_id) {
            rooms.remove(room);
            if rooms.is_empty() {
                drop(rooms);
                self.memberships.remove(&conn_id);
            }
        }
    }

    /// Removes a connection from every room, returning the rooms it left.
    pub fn leave_all(&self, conn_id: ConnectionId) -> Vec<String> {
        let rooms: Vec<String> = self
            .memberships
            .remove(&conn_id)
            .map(|(_, rooms)| rooms.into_iter().collect())
            .unwrap_or_default();
        for room in &rooms {
            self.remove_member(room, conn_id);
        }
        rooms
    }

    /// Current members of a room.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a connection is in a room.
    pub fn is_member(&self, room: &str, conn_id: ConnectionId) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|m| m.contains(&conn_id))
    }

    /// Rooms a connection is in.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> Vec<String> {
        self.memberships
            .get(&conn_id)
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of members in a room.
    pub fn member_count(&self, room: &str) -> usize {
        self.rooms.get(room).map(|m| m.len()).unwrap_or(0)
    }

    /// Number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn remove_member(&self, room: &str, conn_id: ConnectionId) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(&conn_id);
            if members.is_empty() {
                drop(members);
                self.rooms.remove_if(room, |_, m| m.is_empty());
            }
        }
    }
}
