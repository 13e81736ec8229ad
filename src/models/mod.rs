pub mod game;
pub mod message;
pub mod role;
pub mod room;

pub use game::GameKind;
pub use message::{ErrorCode, WireMessage};
pub use role::Role;
pub use room::{ConnectionHandle, ConnectionId, Participant, Room, RoomId, RoomSummary};
