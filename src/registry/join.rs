use crate::{
    errors::AppError,
    models::{ConnectionHandle, GameKind, Role, RoomId, WireMessage},
    registry::{RoomRegistry, encode},
};

impl RoomRegistry {
    /// Seats `connection` as the second mover of an existing room.
    ///
    /// The joiner receives `room_joined`. When the host is already seated both
    /// sides also receive `peer_joined`. Everything is queued while the room is
    /// still locked so no relayed frame can overtake it.
    pub async fn join(
        &self,
        room_id: &RoomId,
        game: GameKind,
        connection: ConnectionHandle,
    ) -> Result<Role, AppError> {
        let mut inner = self.inner.lock().await;

        if let Some(current) = inner.memberships.get(&connection.id) {
            return Err(AppError::AlreadyInRoom(current.to_string()));
        }

        let room = inner
            .rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| AppError::RoomNotFound(room_id.to_string()))?;
        let mut room = room.lock().await;

        if room.closed {
            return Err(AppError::RoomNotFound(room_id.to_string()));
        }
        if room.is_full() || room.holds(Role::SecondMover) {
            tracing::warn!("Join rejected, room {} is full", room_id);
            return Err(AppError::RoomFull(room_id.to_string()));
        }
        if room.game != game {
            return Err(AppError::GameMismatch {
                room: room_id.to_string(),
                expected: room.game.to_string(),
                requested: game.to_string(),
            });
        }

        let role = Role::SecondMover;
        room.seat(connection.clone(), role);
        inner.memberships.insert(connection.id, room_id.clone());

        tracing::info!(
            "Connection {} joined room {} as {}",
            connection.id,
            room_id,
            role
        );

        if let Some(frame) = encode(&WireMessage::RoomJoined { role }) {
            connection.send(frame);
        }
        if let Some(peer) = room.peer_of(connection.id) {
            if let Some(frame) = encode(&WireMessage::PeerJoined) {
                peer.alive = peer.connection.send(frame.clone());
                connection.send(frame);
            }
        }

        Ok(role)
    }
}
