use serde::{Deserialize, Serialize};

use crate::{
    games::{Move, Square},
    models::{GameKind, Role, RoomId},
};

/// Every frame exchanged between a client and the relay.
///
/// The set is closed: a frame whose `type` is not listed here fails to parse
/// and is rejected instead of being ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    #[serde(rename_all = "camelCase")]
    Create {
        room_id: RoomId,
        #[serde(default)]
        game: GameKind,
    },
    #[serde(rename_all = "camelCase")]
    Join {
        room_id: RoomId,
        #[serde(default)]
        game: GameKind,
    },
    Leave,
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
    },
    RoomJoined {
        role: Role,
    },
    #[serde(alias = "player_joined")]
    PeerJoined,
    PeerLeft,
    Move {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pos: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<Square>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<Square>,
        player: Role,
    },
    Reset {
        role: Role,
    },
    Chat {
        sender: Role,
        message: String,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<ErrorCode>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    RoomNotFound,
    RoomFull,
    DuplicateRoom,
    GameMismatch,
    AlreadyInRoom,
    InvalidRoomId,
    BadMessage,
    Internal,
}

impl WireMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            WireMessage::Create { .. } => "create",
            WireMessage::Join { .. } => "join",
            WireMessage::Leave => "leave",
            WireMessage::RoomCreated { .. } => "room_created",
            WireMessage::RoomJoined { .. } => "room_joined",
            WireMessage::PeerJoined => "peer_joined",
            WireMessage::PeerLeft => "peer_left",
            WireMessage::Move { .. } => "move",
            WireMessage::Reset { .. } => "reset",
            WireMessage::Chat { .. } => "chat",
            WireMessage::Error { .. } => "error",
        }
    }

    /// Kinds one client addresses to the other; the relay forwards these verbatim.
    pub fn is_peer_traffic(&self) -> bool {
        matches!(
            self,
            WireMessage::Move { .. } | WireMessage::Reset { .. } | WireMessage::Chat { .. }
        )
    }

    pub fn for_move(mv: &Move, player: Role) -> Self {
        match *mv {
            Move::Place { pos } => WireMessage::Move {
                pos: Some(pos),
                from: None,
                to: None,
                player,
            },
            Move::Shift { from, to } => WireMessage::Move {
                pos: None,
                from: Some(from),
                to: Some(to),
                player,
            },
        }
    }

    /// Extracts the move carried by a `move` frame, if its payload is well formed.
    pub fn as_move(&self) -> Option<(Move, Role)> {
        match self {
            WireMessage::Move {
                pos: Some(pos),
                from: None,
                to: None,
                player,
            } => Some((Move::Place { pos: *pos }, *player)),
            WireMessage::Move {
                pos: None,
                from: Some(from),
                to: Some(to),
                player,
            } => Some((
                Move::Shift {
                    from: *from,
                    to: *to,
                },
                *player,
            )),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
