use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::GameKind;

/// Seat a participant holds for the lifetime of a room.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "X", alias = "red")]
    FirstMover,
    #[serde(alias = "O", alias = "black")]
    SecondMover,
}

impl Role {
    pub fn opponent(self) -> Role {
        match self {
            Role::FirstMover => Role::SecondMover,
            Role::SecondMover => Role::FirstMover,
        }
    }

    /// Marker the given game draws for this role.
    pub fn marker(self, game: GameKind) -> &'static str {
        match (game, self) {
            (GameKind::Tictactoe, Role::FirstMover) => "X",
            (GameKind::Tictactoe, Role::SecondMover) => "O",
            (GameKind::Chess, Role::FirstMover) => "red",
            (GameKind::Chess, Role::SecondMover) => "black",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::FirstMover => write!(f, "first_mover"),
            Role::SecondMover => write!(f, "second_mover"),
        }
    }
}
