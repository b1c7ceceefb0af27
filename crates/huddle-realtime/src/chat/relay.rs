//! Message relay: persists chat and forwards it to live recipients.

use std::sync::Arc;

use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use huddle_entity::message::NewMessage;

use crate::connection::handle::ConnectionHandle;
use crate::message::types::{DirectChat, JoinRoom, Relayed, RoomChat, ServerEvent, UserJoined};
use crate::presence::registry::PresenceRegistry;
use crate::room::registry::RoomRegistry;

use super::persistence::PersistenceSink;

/// Display format used when the configured one does not parse.
const FALLBACK_TIME_FORMAT: &str = "%I:%M %p";

/// Relays room and direct chat.
#[derive(Debug)]
pub struct MessageRelay {
    presence: Arc<PresenceRegistry>,
    rooms: Arc<RoomRegistry>,
    sink: PersistenceSink,
    time_format: String,
}

impl MessageRelay {
    /// Creates a relay. `time_format` is a strftime pattern for the display
    /// timestamp added to every relayed message.
    pub fn new(
        presence: Arc<PresenceRegistry>,
        rooms: Arc<RoomRegistry>,
        sink: PersistenceSink,
        time_format: &str,
    ) -> Self {
        let time_format = if StrftimeItems::new(time_format).any(|i| matches!(i, Item::Error)) {
            warn!(
                time_format,
                fallback = FALLBACK_TIME_FORMAT,
                "Invalid chat time format, using fallback"
            );
            FALLBACK_TIME_FORMAT.to_string()
        } else {
            time_format.to_string()
        };

        Self {
            presence,
            rooms,
            sink,
            time_format,
        }
    }

    /// Put a connection in a room, mark it busy, and tell the other members.
    pub fn join(&self, from: &ConnectionHandle, join: JoinRoom) {
        let room = join.room;
        self.rooms.join(&room, from.id);

        if !self.presence.mark_busy(&from.id, &room) {
            // Closed while joining; undo so the room does not hold a dead member.
            self.rooms.leave(&room, from.id);
            return;
        }

        debug!(conn_id = %from.id, username = %from.username, room = %room, "Joined room");
        let joined = ServerEvent::UserJoined(UserJoined {
            id: from.id,
            username: from.username.clone(),
        });
        self.deliver_to_room(&room, from, &joined);
    }

    /// Persist a room message and forward it to every other room member.
    pub fn broadcast_to_room(&self, from: &ConnectionHandle, chat: RoomChat) -> JoinHandle<()> {
        let write = self.sink.persist(NewMessage::group(
            from.username.as_str(),
            chat.room.as_str(),
            chat.text.clone().unwrap_or_default(),
            chat.image.clone(),
        ));

        let room = chat.room.clone();
        let event = ServerEvent::ChatMessage(Relayed {
            payload: chat,
            sender: from.username.clone(),
            time: self.display_time(),
        });
        self.deliver_to_room(&room, from, &event);
        write
    }

    /// Persist a direct message, forward it to the recipient's routed
    /// connection if there is one, and echo it to the sender.
    pub fn send_direct(&self, from: &ConnectionHandle, chat: DirectChat) -> JoinHandle<()> {
        let write = self.sink.persist(NewMessage::private(
            from.username.as_str(),
            chat.to.as_str(),
            chat.text.clone().unwrap_or_default(),
            chat.image.clone(),
        ));

        let recipient = self.presence.resolve(&chat.to);
        let event = ServerEvent::PrivateChat(Relayed {
            payload: chat,
            sender: from.username.clone(),
            time: self.display_time(),
        });

        match recipient {
            Some(target) if target.id != from.id => {
                target.send(event.clone());
            }
            Some(_) => {}
            None => debug!(
                conn_id = %from.id,
                username = %from.username,
                "Direct message recipient offline, stored only"
            ),
        }
        from.send(event);
        write
    }

    fn deliver_to_room(&self, room: &str, from: &ConnectionHandle, event: &ServerEvent) {
        for member in self.rooms.members(room) {
            if member == from.id {
                continue;
            }
            if let Some(target) = self.presence.get(&member) {
                target.send(event.clone());
            }
        }
    }

    fn display_time(&self) -> String {
        Local::now().format(&self.time_format).to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use huddle_core::config::RouteRelease;
    use huddle_database::InMemoryMessageStore;
    use huddle_entity::message::MessageKind;

    use super::*;
    use crate::metrics::RealtimeMetrics;
    use crate::test_support::{drain, handle};

    struct Fixture {
        presence: Arc<PresenceRegistry>,
        rooms: Arc<RoomRegistry>,
        store: Arc<InMemoryMessageStore>,
        relay: MessageRelay,
    }

    fn fixture() -> Fixture {
        let presence = Arc::new(PresenceRegistry::new(RouteRelease::OwnerOnly));
        let rooms = Arc::new(RoomRegistry::new());
        let store = Arc::new(InMemoryMessageStore::new());
        let sink = PersistenceSink::new(store.clone(), Arc::new(RealtimeMetrics::new()));
        let relay = MessageRelay::new(presence.clone(), rooms.clone(), sink, "%H:%M");
        Fixture {
            presence,
            rooms,
            store,
            relay,
        }
    }

    fn room_chat(text: &str) -> RoomChat {
        RoomChat {
            room: "r1".into(),
            text: Some(text.into()),
            image: None,
            extra: Map::new(),
        }
    }

    fn direct(to: &str, text: &str) -> DirectChat {
        DirectChat {
            to: to.into(),
            text: Some(text.into()),
            image: None,
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn test_room_chat_reaches_others_not_sender() {
        let f = fixture();
        let (a, mut rx_a) = handle(1, "alice");
        let (b, mut rx_b) = handle(2, "bob");
        f.presence.register(a.clone(), None);
        f.presence.register(b.clone(), None);
        f.relay.join(&a, JoinRoom { room: "r1".into() });
        f.relay.join(&b, JoinRoom { room: "r1".into() });
        drain(&mut rx_a);
        drain(&mut rx_b);

        f.relay.broadcast_to_room(&a, room_chat("hi")).await.unwrap();

        assert!(drain(&mut rx_a).is_empty());
        match drain(&mut rx_b).as_slice() {
            [ServerEvent::ChatMessage(msg)] => {
                assert_eq!(msg.sender, "alice");
                assert_eq!(msg.payload.text.as_deref(), Some("hi"));
                assert_eq!(msg.time.len(), 5);
            }
            other => panic!("unexpected events {other:?}"),
        }

        let stored = f.store.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, MessageKind::Group);
        assert_eq!(stored[0].room.as_deref(), Some("r1"));
        assert_eq!(stored[0].sender, "alice");
    }

    #[tokio::test]
    async fn test_join_marks_busy_and_notifies_room() {
        let f = fixture();
        let (a, mut rx_a) = handle(1, "alice");
        let (b, mut rx_b) = handle(2, "bob");
        f.presence.register(a.clone(), None);
        f.presence.register(b.clone(), None);
        f.relay.join(&a, JoinRoom { room: "r1".into() });
        drain(&mut rx_a);
        drain(&mut rx_b);

        f.relay.join(&b, JoinRoom { room: "r1".into() });

        let to_a = drain(&mut rx_a);
        assert!(to_a.contains(&ServerEvent::UserJoined(UserJoined {
            id: b.id,
            username: "bob".into(),
        })));
        assert!(!drain(&mut rx_b)
            .iter()
            .any(|e| matches!(e, ServerEvent::UserJoined(_))));
        assert!(f.presence.snapshot().iter().all(|e| e.is_busy));
    }

    #[tokio::test]
    async fn test_join_after_close_leaves_no_member() {
        let f = fixture();
        let (a, _rx) = handle(1, "alice");

        f.relay.join(&a, JoinRoom { room: "r1".into() });

        assert_eq!(f.rooms.member_count("r1"), 0);
    }

    #[tokio::test]
    async fn test_direct_message_forwarded_and_echoed() {
        let f = fixture();
        let (a, mut rx_a) = handle(1, "alice");
        let (b, mut rx_b) = handle(2, "bob");
        f.presence.register(a.clone(), None);
        f.presence.register(b.clone(), None);
        drain(&mut rx_a);
        drain(&mut rx_b);

        let mut chat = direct("bob", "psst");
        chat.extra.insert("clientId".into(), json!("m-1"));
        f.relay.send_direct(&a, chat).await.unwrap();

        let to_b = drain(&mut rx_b);
        let to_a = drain(&mut rx_a);
        assert_eq!(to_b.len(), 1);
        assert_eq!(to_a, to_b);
        match &to_b[0] {
            ServerEvent::PrivateChat(msg) => {
                assert_eq!(msg.sender, "alice");
                assert_eq!(msg.payload.extra.get("clientId"), Some(&json!("m-1")));
            }
            other => panic!("unexpected event {other:?}"),
        }

        let stored = f.store.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].kind, MessageKind::Private);
        assert_eq!(stored[0].receiver.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_direct_message_to_offline_user_is_stored_and_echoed() {
        let f = fixture();
        let (a, mut rx_a) = handle(1, "alice");
        f.presence.register(a.clone(), None);
        drain(&mut rx_a);

        f.relay.send_direct(&a, direct("carol", "later")).await.unwrap();

        assert_eq!(drain(&mut rx_a).len(), 1);
        assert_eq!(f.store.len(), 1);
    }

    #[tokio::test]
    async fn test_direct_message_to_self_echoed_once() {
        let f = fixture();
        let (a, mut rx_a) = handle(1, "alice");
        f.presence.register(a.clone(), None);
        drain(&mut rx_a);

        f.relay.send_direct(&a, direct("alice", "note")).await.unwrap();

        assert_eq!(drain(&mut rx_a).len(), 1);
    }

    #[tokio::test]
    async fn test_direct_message_relayed_when_store_down() {
        let f = fixture();
        f.store.set_unavailable(true);
        let (a, mut rx_a) = handle(1, "alice");
        let (b, mut rx_b) = handle(2, "bob");
        f.presence.register(a.clone(), None);
        f.presence.register(b.clone(), None);
        drain(&mut rx_a);
        drain(&mut rx_b);

        f.relay.send_direct(&a, direct("bob", "still here")).await.unwrap();

        assert_eq!(drain(&mut rx_b).len(), 1);
        assert_eq!(drain(&mut rx_a).len(), 1);
    }

    #[test]
    fn test_invalid_time_format_falls_back() {
        let presence = Arc::new(PresenceRegistry::new(RouteRelease::OwnerOnly));
        let store = Arc::new(InMemoryMessageStore::new());
        let sink = PersistenceSink::new(store, Arc::new(RealtimeMetrics::new()));
        let relay = MessageRelay::new(presence, Arc::new(RoomRegistry::new()), sink, "%Q%");
        assert_eq!(relay.time_format, FALLBACK_TIME_FORMAT);
    }
}
