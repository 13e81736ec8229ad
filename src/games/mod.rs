pub mod ai;
pub mod tictactoe;
pub mod xiangqi;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    errors::GameError,
    models::{GameKind, Role},
};

pub use xiangqi::{Piece, PieceKind};

/// Board coordinate for the chess variant, row-major from red's back rank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn from_index(index: usize) -> Self {
        Self {
            row: (index / xiangqi::COLS) as u8,
            col: (index % xiangqi::COLS) as u8,
        }
    }

    pub fn index(&self) -> usize {
        self.row as usize * xiangqi::COLS + self.col as usize
    }

    pub fn on_board(&self) -> bool {
        (self.row as usize) < xiangqi::ROWS && (self.col as usize) < xiangqi::COLS
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Move {
    Place { pos: usize },
    Shift { from: Square, to: Square },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Occupant {
    Mark { role: Role },
    Piece { piece: Piece },
}

impl Occupant {
    pub fn owner(&self) -> Role {
        match self {
            Occupant::Mark { role } => *role,
            Occupant::Piece { piece } => piece.role,
        }
    }

    pub fn piece(&self) -> Option<Piece> {
        match self {
            Occupant::Piece { piece } => Some(*piece),
            Occupant::Mark { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "winner", rename_all = "snake_case")]
pub enum Status {
    InProgress,
    Won(Role),
    Drawn,
}

/// One mirror of a game. Only [`GameState::apply`] and
/// [`GameState::apply_in_place`] change it after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub kind: GameKind,
    pub cells: Vec<Option<Occupant>>,
    pub current_turn: Role,
    pub status: Status,
    pub move_count: usize,
}

impl GameState {
    pub fn new(kind: GameKind) -> Self {
        let cells = match kind {
            GameKind::Tictactoe => vec![None; kind.cell_count()],
            GameKind::Chess => xiangqi::initial_cells(),
        };

        Self {
            kind,
            cells,
            current_turn: Role::FirstMover,
            status: Status::InProgress,
            move_count: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = GameState::new(self.kind);
    }

    pub fn is_terminal(&self) -> bool {
        self.status != Status::InProgress
    }

    pub fn cell(&self, index: usize) -> Option<&Occupant> {
        self.cells.get(index).and_then(|c| c.as_ref())
    }

    /// Pure transition: returns the successor state and leaves `self` untouched.
    pub fn apply(&self, mv: Move, acting: Role) -> Result<GameState, GameError> {
        let mut next = self.clone();
        next.apply_in_place(mv, acting)?;
        Ok(next)
    }

    /// Applies `mv` for `acting`. On error the state is unchanged.
    pub fn apply_in_place(&mut self, mv: Move, acting: Role) -> Result<(), GameError> {
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }
        if acting != self.current_turn {
            return Err(GameError::NotYourTurn);
        }

        match self.kind {
            GameKind::Tictactoe => tictactoe::apply(self, mv, acting)?,
            GameKind::Chess => xiangqi::apply(self, mv, acting)?,
        }

        self.move_count += 1;
        Ok(())
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cols = match self.kind {
            GameKind::Tictactoe => tictactoe::SIDE,
            GameKind::Chess => xiangqi::COLS,
        };

        for row in self.cells.chunks(cols) {
            let line: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    None => ".".to_string(),
                    Some(Occupant::Mark { role }) => role.marker(self.kind).to_string(),
                    Some(Occupant::Piece { piece }) => piece.symbol().to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }

        match self.status {
            Status::InProgress => write!(f, "{} to move", self.current_turn.marker(self.kind)),
            Status::Won(role) => write!(f, "{} wins", role.marker(self.kind)),
            Status::Drawn => write!(f, "draw"),
        }
    }
}
