use chrono::{DateTime, Utc};
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    errors::AppError,
    models::{GameKind, Role},
};

pub const ROOM_ID_MAX_LEN: usize = 16;
pub const GENERATED_ROOM_ID_LEN: usize = 6;

const ROOM_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Short alphanumeric token players exchange out-of-band.
///
/// Parsing is case-insensitive: ids are stored upper-cased, so `abc123` and
/// `ABC123` name the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    pub fn generate() -> Self {
        let mut rng = rng();
        let token = (0..GENERATED_ROOM_ID_LEN)
            .map(|_| ROOM_ID_ALPHABET[rng.random_range(0..ROOM_ID_ALPHABET.len())] as char)
            .collect();
        RoomId(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RoomId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.len() > ROOM_ID_MAX_LEN
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(AppError::InvalidRoomId(s.to_string()));
        }
        Ok(RoomId(trimmed.to_ascii_uppercase()))
    }
}

impl TryFrom<String> for RoomId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoomId> for String {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub type ConnectionId = Uuid;

/// Outbound side of one relay connection. Frames pushed here are written to the
/// socket by the connection's writer task.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    sender: mpsc::UnboundedSender<String>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: mpsc::UnboundedSender<String>) -> Self {
        Self { id, sender }
    }

    /// Queues a frame for the socket. Returns false once the writer is gone.
    pub fn send(&self, frame: String) -> bool {
        self.sender.send(frame).is_ok()
    }

    pub fn is_alive(&self) -> bool {
        !self.sender.is_closed()
    }
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub connection: ConnectionHandle,
    pub role: Role,
    pub alive: bool,
}

#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub game: GameKind,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<Participant>,
    /// Set once the room has been removed from the registry; late joiners that
    /// still hold the handle must treat it as gone.
    pub closed: bool,
}

impl Room {
    pub fn new(id: RoomId, game: GameKind) -> Self {
        Self {
            id,
            game,
            created_at: Utc::now(),
            participants: Vec::with_capacity(2),
            closed: false,
        }
    }

    pub fn seat(&mut self, connection: ConnectionHandle, role: Role) -> bool {
        if self.is_full() || self.holds(role) {
            return false;
        }
        self.participants.push(Participant {
            connection,
            role,
            alive: true,
        });
        true
    }

    pub fn holds(&self, role: Role) -> bool {
        self.participants.iter().any(|p| p.role == role)
    }

    pub fn remove_participant(&mut self, connection_id: ConnectionId) -> Option<Participant> {
        let index = self
            .participants
            .iter()
            .position(|p| p.connection.id == connection_id)?;
        Some(self.participants.remove(index))
    }

    pub fn peer_of(&mut self, connection_id: ConnectionId) -> Option<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.connection.id != connection_id)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= 2
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            room_id: self.id.clone(),
            game: self.game,
            participants: self.participant_count(),
            connected: self
                .participants
                .iter()
                .filter(|p| p.alive && p.connection.is_alive())
                .count(),
            roles: self.participants.iter().map(|p| p.role).collect(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub game: GameKind,
    pub participants: usize,
    /// Seated participants whose socket writer is still running.
    pub connected: usize,
    pub roles: Vec<Role>,
    pub created_at: DateTime<Utc>,
}
