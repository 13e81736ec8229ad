use chrono::{Duration, Utc};

use crate::{
    models::{ConnectionId, RoomId, WireMessage},
    registry::{RoomRegistry, encode},
};

impl RoomRegistry {
    /// Removes `connection_id` from its room and tells the remaining
    /// participant. The room is deleted once nobody is left.
    ///
    /// Returns the room the connection was in, if any.
    pub async fn leave(&self, connection_id: ConnectionId) -> Option<RoomId> {
        let mut inner = self.inner.lock().await;

        let room_id = inner.memberships.remove(&connection_id)?;
        let Some(room) = inner.rooms.get(&room_id).cloned() else {
            return Some(room_id);
        };

        let mut room = room.lock().await;
        room.remove_participant(connection_id);

        if room.is_empty() {
            room.closed = true;
            inner.rooms.remove(&room_id);
            tracing::info!("Room {} is empty and was deleted", room_id);
        } else if let Some(peer) = room.peer_of(connection_id) {
            tracing::info!("Connection {} left room {}", connection_id, room_id);
            if let Some(frame) = encode(&WireMessage::PeerLeft) {
                peer.alive = peer.connection.send(frame);
            }
        }

        Some(room_id)
    }

    /// Deletes rooms that were registered but never occupied within `max_age`.
    pub async fn reap_idle(&self, max_age: Duration) -> usize {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();

        let mut stale = Vec::new();
        for (room_id, room) in inner.rooms.iter() {
            let room = room.lock().await;
            if room.is_empty() && now.signed_duration_since(room.created_at) > max_age {
                stale.push(room_id.clone());
            }
        }

        for room_id in &stale {
            if let Some(room) = inner.rooms.remove(room_id) {
                room.lock().await.closed = true;
                tracing::debug!("Reaped idle room {}", room_id);
            }
        }

        stale.len()
    }
}
