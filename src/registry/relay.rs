use crate::{
    models::{ConnectionId, RoomId},
    registry::RoomRegistry,
};

impl RoomRegistry {
    /// Forwards `message` verbatim to the other participant of `room_id`.
    ///
    /// Best effort: returns false and drops the frame when there is no peer or
    /// its writer has gone away. The sender is not told.
    pub async fn relay(&self, room_id: &RoomId, sender: ConnectionId, message: String) -> bool {
        let room = match self.inner.lock().await.rooms.get(room_id) {
            Some(room) => room.clone(),
            None => {
                tracing::debug!("Dropping frame for missing room {}", room_id);
                return false;
            }
        };

        let mut room = room.lock().await;

        if !room
            .participants
            .iter()
            .any(|p| p.connection.id == sender)
        {
            tracing::warn!(
                "Connection {} tried to relay into room {} without a seat",
                sender,
                room_id
            );
            return false;
        }

        match room.peer_of(sender) {
            Some(peer) => {
                let delivered = peer.connection.send(message);
                peer.alive = delivered;
                if !delivered {
                    tracing::debug!("Peer {} in room {} is gone", peer.connection.id, room_id);
                }
                delivered
            }
            None => {
                tracing::debug!("No peer in room {}, frame dropped", room_id);
                false
            }
        }
    }
}
