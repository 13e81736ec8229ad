use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    errors::AppError,
    models::{ConnectionHandle, GameKind, Role, Room, RoomId, WireMessage},
    registry::{RoomRegistry, encode},
};

/// Generated tokens tried before `create_room` gives up.
pub const MAX_CREATE_ATTEMPTS: usize = 8;

impl RoomRegistry {
    /// Registers an empty room under a caller-chosen id.
    pub async fn register_room(&self, room_id: RoomId, game: GameKind) -> Result<(), AppError> {
        let mut inner = self.inner.lock().await;

        if inner.rooms.contains_key(&room_id) {
            return Err(AppError::DuplicateRoom(room_id.to_string()));
        }

        tracing::info!("Registered {} room {}", game, room_id);
        inner.rooms.insert(
            room_id.clone(),
            Arc::new(Mutex::new(Room::new(room_id, game))),
        );
        Ok(())
    }

    /// Registers an empty room under a freshly generated id, retrying on collisions.
    pub async fn create_room(&self, game: GameKind) -> Result<RoomId, AppError> {
        for attempt in 1..=MAX_CREATE_ATTEMPTS {
            let room_id = RoomId::generate();
            match self.register_room(room_id.clone(), game).await {
                Ok(()) => return Ok(room_id),
                Err(AppError::DuplicateRoom(id)) => {
                    tracing::debug!("Room id {} collided (attempt {})", id, attempt);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::error!(
            "Could not find a free room id after {} attempts",
            MAX_CREATE_ATTEMPTS
        );
        Err(AppError::InternalError)
    }

    /// Seats `connection` as the first mover of `room_id`.
    ///
    /// The room is registered on the spot if it does not exist; an empty room
    /// reserved earlier is claimed. Fails with `DuplicateRoom` once the room has
    /// a host. The `room_created` acknowledgement, and `peer_joined` to both
    /// sides when a joiner is already waiting, are queued before the room lock
    /// is released.
    pub async fn host(
        &self,
        room_id: RoomId,
        game: GameKind,
        connection: ConnectionHandle,
    ) -> Result<Role, AppError> {
        let mut inner = self.inner.lock().await;

        if let Some(current) = inner.memberships.get(&connection.id) {
            return Err(AppError::AlreadyInRoom(current.to_string()));
        }

        let room = inner
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Room::new(room_id.clone(), game))))
            .clone();
        let mut room = room.lock().await;

        if room.game != game {
            return Err(AppError::GameMismatch {
                room: room_id.to_string(),
                expected: room.game.to_string(),
                requested: game.to_string(),
            });
        }
        if room.holds(Role::FirstMover) {
            return Err(AppError::DuplicateRoom(room_id.to_string()));
        }
        if !room.seat(connection.clone(), Role::FirstMover) {
            return Err(AppError::RoomFull(room_id.to_string()));
        }

        inner.memberships.insert(connection.id, room_id.clone());
        tracing::info!("Connection {} hosts room {}", connection.id, room_id);

        if let Some(frame) = encode(&WireMessage::RoomCreated {
            room_id: Some(room_id.clone()),
        }) {
            connection.send(frame);
        }
        if let Some(peer) = room.peer_of(connection.id) {
            if let Some(frame) = encode(&WireMessage::PeerJoined) {
                peer.alive = peer.connection.send(frame.clone());
                connection.send(frame);
            }
        }

        Ok(Role::FirstMover)
    }
}
