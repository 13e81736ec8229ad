use axum::http::StatusCode;
use thiserror::Error;

use crate::models::{ErrorCode, WireMessage};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Room {0} not found")]
    RoomNotFound(String),

    #[error("Room {0} is full")]
    RoomFull(String),

    #[error("Room {0} already exists")]
    DuplicateRoom(String),

    #[error("Room {room} hosts {expected}, not {requested}")]
    GameMismatch {
        room: String,
        expected: String,
        requested: String,
    },

    #[error("Connection is already seated in room {0}")]
    AlreadyInRoom(String),

    #[error("Invalid room id: {0}")]
    InvalidRoomId(String),

    #[error("Bad message: {0}")]
    BadMessage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error")]
    InternalError,
}

impl AppError {
    pub fn to_response(&self) -> (StatusCode, String) {
        match self {
            AppError::RoomNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::RoomFull(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::DuplicateRoom(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::GameMismatch { .. } => (StatusCode::CONFLICT, self.to_string()),
            AppError::AlreadyInRoom(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::InvalidRoomId(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::BadMessage(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected server error".into(),
            ),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::RoomNotFound(_) => ErrorCode::RoomNotFound,
            AppError::RoomFull(_) => ErrorCode::RoomFull,
            AppError::DuplicateRoom(_) => ErrorCode::DuplicateRoom,
            AppError::GameMismatch { .. } => ErrorCode::GameMismatch,
            AppError::AlreadyInRoom(_) => ErrorCode::AlreadyInRoom,
            AppError::InvalidRoomId(_) => ErrorCode::InvalidRoomId,
            AppError::BadMessage(_) => ErrorCode::BadMessage,
            AppError::Config(_)
            | AppError::Io(_)
            | AppError::InternalError => ErrorCode::Internal,
        }
    }

    /// The `error` frame a relay sends back to the requesting connection.
    pub fn to_wire(&self) -> WireMessage {
        WireMessage::Error {
            message: self.to_string(),
            code: Some(self.code()),
        }
    }
}

/// Rejections produced by the game state machines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Game is already over")]
    GameOver,

    #[error("It is not this side's turn")]
    NotYourTurn,

    #[error("Cell {0} is already occupied")]
    Occupied(usize),

    #[error("Position is off the board")]
    OutOfBounds,

    #[error("Move shape does not fit this game")]
    WrongMoveKind,

    #[error("Illegal move: {0}")]
    IllegalMove(String),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Not this client's turn to act")]
    TurnViolation,

    #[error("Illegal move: {0}")]
    IllegalMove(GameError),

    #[error("Session is not connected to a peer")]
    NotConnected,

    #[error("Chat message exceeds {max} characters")]
    ChatTooLong { max: usize },

    #[error("Chat message is empty")]
    EmptyChat,

    #[error("Unknown or malformed message: {0}")]
    UnknownMessage(String),

    #[error("Transport closed")]
    TransportClosed,

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Timed out connecting to {0}")]
    ConnectTimeout(String),
}

impl From<GameError> for SessionError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::GameOver | GameError::NotYourTurn | GameError::Occupied(_) => {
                SessionError::TurnViolation
            }
            other => SessionError::IllegalMove(other),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for SessionError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => SessionError::TransportClosed,
            other => SessionError::TransportError(other.to_string()),
        }
    }
}
