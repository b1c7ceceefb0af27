//! Presence registry: the authoritative map of live connections.
//!
//! Both mappings live behind one mutex so register, unregister, and
//! mark-busy are atomic with respect to each other. Every mutation that
//! changes the online view delivers `update-user-list` to all connections
//! before the lock is released, so each connection observes snapshots in
//! mutation order.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use huddle_core::config::RouteRelease;
use huddle_core::types::ConnectionId;

use crate::connection::handle::ConnectionHandle;
use crate::message::types::ServerEvent;

use super::view::{PresenceEntry, deduplicate};

/// Server-side state of one live connection.
#[derive(Debug, Clone)]
pub struct Session {
    /// The connection this session belongs to.
    pub handle: Arc<ConnectionHandle>,
    /// Avatar looked up once at connect time.
    pub avatar: Option<String>,
    /// Set once the session joins a call room.
    pub is_busy: bool,
    /// Last room joined. Never cleared while the session lives.
    pub current_room: Option<String>,
}

#[derive(Debug, Default)]
struct RegistryState {
    sessions_by_id: HashMap<ConnectionId, Session>,
    /// Username → most recently registered connection.
    latest_by_username: HashMap<String, ConnectionId>,
}

impl RegistryState {
    fn view(&self) -> Vec<PresenceEntry> {
        deduplicate(self.sessions_by_id.values(), &self.latest_by_username)
    }

    fn broadcast_view(&self) {
        let view = self.view();
        for session in self.sessions_by_id.values() {
            session
                .handle
                .send(ServerEvent::UpdateUserList(view.clone()));
        }
    }
}

/// Registry of live sessions and per-username routes.
#[derive(Debug)]
pub struct PresenceRegistry {
    state: Mutex<RegistryState>,
    route_release: RouteRelease,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new(route_release: RouteRelease) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            route_release,
        }
    }

    /// Record a new session and make it the route for its username.
    pub fn register(&self, handle: Arc<ConnectionHandle>, avatar: Option<String>) {
        let conn_id = handle.id;
        let username = handle.username.clone();

        let mut state = self.state.lock();
        let superseded = state.latest_by_username.insert(username.clone(), conn_id);
        state.sessions_by_id.insert(
            conn_id,
            Session {
                handle,
                avatar,
                is_busy: false,
                current_room: None,
            },
        );
        state.broadcast_view();
        let sessions = state.sessions_by_id.len();
        drop(state);

        info!(
            conn_id = %conn_id,
            username = %username,
            superseded = ?superseded,
            sessions,
            "Session registered"
        );
    }

    /// Remove a session and release its username route per policy.
    ///
    /// Returns the removed session, or `None` if it was already gone (in
    /// which case nothing is broadcast).
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<Session> {
        let mut state = self.state.lock();
        let session = state.sessions_by_id.remove(conn_id)?;
        let username = session.handle.username.as_str();

        let released = match self.route_release {
            RouteRelease::OwnerOnly => {
                if state.latest_by_username.get(username) == Some(conn_id) {
                    state.latest_by_username.remove(username);
                    true
                } else {
                    false
                }
            }
            RouteRelease::Unconditional => state.latest_by_username.remove(username).is_some(),
        };
        state.broadcast_view();
        drop(state);

        info!(
            conn_id = %conn_id,
            username = %session.handle.username,
            route_released = released,
            "Session unregistered"
        );
        Some(session)
    }

    /// Flag a session as in a call and remember its room.
    ///
    /// Returns false (and changes nothing) if the connection is not live.
    pub fn mark_busy(&self, conn_id: &ConnectionId, room: &str) -> bool {
        let mut state = self.state.lock();
        let Some(session) = state.sessions_by_id.get_mut(conn_id) else {
            debug!(conn_id = %conn_id, "mark_busy on unknown connection");
            return false;
        };
        session.is_busy = true;
        session.current_room = Some(room.to_string());
        state.broadcast_view();
        true
    }

    /// Deduplicated online view, one entry per username.
    pub fn snapshot(&self) -> Vec<PresenceEntry> {
        self.state.lock().view()
    }

    /// The connection currently routed for a username.
    pub fn route_to(&self, username: &str) -> Option<ConnectionId> {
        self.state.lock().latest_by_username.get(username).copied()
    }

    /// The handle currently routed for a username.
    pub fn resolve(&self, username: &str) -> Option<Arc<ConnectionHandle>> {
        let state = self.state.lock();
        let conn_id = state.latest_by_username.get(username)?;
        state
            .sessions_by_id
            .get(conn_id)
            .map(|s| s.handle.clone())
    }

    /// The handle for a live connection.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.state
            .lock()
            .sessions_by_id
            .get(conn_id)
            .map(|s| s.handle.clone())
    }

    /// A copy of a live session's state.
    pub fn session(&self, conn_id: &ConnectionId) -> Option<Session> {
        self.state.lock().sessions_by_id.get(conn_id).cloned()
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.state.lock().sessions_by_id.len()
    }

    /// Number of distinct usernames online.
    pub fn user_count(&self) -> usize {
        let state = self.state.lock();
        let mut names: Vec<&str> = state
            .sessions_by_id
            .values()
            .map(|s| s.handle.username.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names.len()
    }

    /// Every live handle.
    pub fn all_handles(&self) -> Vec<Arc<ConnectionHandle>> {
        self.state
            .lock()
            .sessions_by_id
            .values()
            .map(|s| s.handle.clone())
            .collect()
    }
}
