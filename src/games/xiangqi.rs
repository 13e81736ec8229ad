use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    errors::GameError,
    games::{GameState, Move, Occupant, Square, Status},
    models::Role,
};

pub const ROWS: usize = 10;
pub const COLS: usize = 9;
pub const CELLS: usize = ROWS * COLS;

/// Last row on red's side of the river; black's side starts one row later.
const RED_RIVERBANK: u8 = 4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PieceKind {
    #[serde(rename = "king", alias = "general")]
    General,
    #[serde(rename = "guard", alias = "advisor")]
    Advisor,
    #[serde(rename = "bishop", alias = "elephant")]
    Elephant,
    #[serde(rename = "knight", alias = "horse")]
    Horse,
    #[serde(rename = "rook", alias = "chariot")]
    Chariot,
    Cannon,
    #[serde(rename = "pawn", alias = "soldier")]
    Soldier,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceKind::General => "general",
            PieceKind::Advisor => "advisor",
            PieceKind::Elephant => "elephant",
            PieceKind::Horse => "horse",
            PieceKind::Chariot => "chariot",
            PieceKind::Cannon => "cannon",
            PieceKind::Soldier => "soldier",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Piece {
    #[serde(rename = "type")]
    pub kind: PieceKind,
    #[serde(rename = "player")]
    pub role: Role,
}

impl Piece {
    pub fn new(kind: PieceKind, role: Role) -> Self {
        Self { kind, role }
    }

    /// Upper case for red, lower case for black.
    pub fn symbol(&self) -> char {
        let c = match self.kind {
            PieceKind::General => 'k',
            PieceKind::Advisor => 'a',
            PieceKind::Elephant => 'e',
            PieceKind::Horse => 'h',
            PieceKind::Chariot => 'r',
            PieceKind::Cannon => 'c',
            PieceKind::Soldier => 'p',
        };
        match self.role {
            Role::FirstMover => c.to_ascii_uppercase(),
            Role::SecondMover => c,
        }
    }
}

type Cells = [Option<Occupant>];

/// Opening position: red on rows 0-3, black mirrored on rows 6-9.
pub fn initial_cells() -> Vec<Option<Occupant>> {
    use PieceKind::*;

    let mut cells = vec![None; CELLS];
    let back_rank = [
        Chariot, Horse, Elephant, Advisor, General, Advisor, Elephant, Horse, Chariot,
    ];

    for (role, back, cannons, soldiers) in [
        (Role::FirstMover, 0u8, 2u8, 3u8),
        (Role::SecondMover, 9u8, 7u8, 6u8),
    ] {
        let mut put = |row: u8, col: u8, kind: PieceKind| {
            cells[Square::new(row, col).index()] = Some(Occupant::Piece {
                piece: Piece::new(kind, role),
            });
        };

        for (col, kind) in back_rank.iter().enumerate() {
            put(back, col as u8, *kind);
        }
        put(cannons, 1, Cannon);
        put(cannons, 7, Cannon);
        for col in [0, 2, 4, 6, 8] {
            put(soldiers, col, Soldier);
        }
    }

    cells
}

pub fn apply(state: &mut GameState, mv: Move, acting: Role) -> Result<(), GameError> {
    let Move::Shift { from, to } = mv else {
        return Err(GameError::WrongMoveKind);
    };

    check_move(&state.cells, from, to, acting)?;

    let captured = make_move(&mut state.cells, from, to);
    if let Some(piece) = captured.and_then(|o| o.piece()) {
        tracing::debug!("{} captured {} at {:?}", acting, piece.kind, to);
    }

    if has_legal_move(&state.cells, acting.opponent()) {
        state.current_turn = acting.opponent();
    } else {
        state.status = Status::Won(acting);
    }

    Ok(())
}

/// Full legality check for `acting` moving the piece on `from` to `to`.
pub fn check_move(cells: &Cells, from: Square, to: Square, acting: Role) -> Result<(), GameError> {
    if !from.on_board() || !to.on_board() {
        return Err(GameError::OutOfBounds);
    }
    if from == to {
        return Err(GameError::IllegalMove("piece must leave its square".into()));
    }

    let piece = piece_at(cells, from)
        .ok_or_else(|| GameError::IllegalMove("no piece on the origin square".into()))?;
    if piece.role != acting {
        return Err(GameError::IllegalMove(
            "piece belongs to the opponent".into(),
        ));
    }
    if owner_at(cells, to) == Some(acting) {
        return Err(GameError::IllegalMove("cannot capture an own piece".into()));
    }
    if !can_reach(cells, piece, from, to) {
        return Err(GameError::IllegalMove(format!(
            "{} cannot move from {:?} to {:?}",
            piece.kind, from, to
        )));
    }

    let mut next = cells.to_vec();
    make_move(&mut next, from, to);
    if in_check(&next, acting) {
        return Err(GameError::IllegalMove(
            "move leaves the general exposed".into(),
        ));
    }

    Ok(())
}

/// Every legal `(from, to)` pair for `role`.
pub fn legal_moves(cells: &Cells, role: Role) -> Vec<(Square, Square)> {
    let mut moves = Vec::new();
    for from in own_squares(cells, role) {
        for index in 0..CELLS {
            let to = Square::from_index(index);
            if check_move(cells, from, to, role).is_ok() {
                moves.push((from, to));
            }
        }
    }
    moves
}

pub fn has_legal_move(cells: &Cells, role: Role) -> bool {
    own_squares(cells, role).into_iter().any(|from| {
        (0..CELLS).any(|index| check_move(cells, from, Square::from_index(index), role).is_ok())
    })
}

/// True when `role`'s general is attacked, or faces the other general on an
/// open file. A missing general counts as checked.
pub fn in_check(cells: &Cells, role: Role) -> bool {
    let Some(general) = find_general(cells, role) else {
        return true;
    };

    if let Some(other) = find_general(cells, role.opponent()) {
        if other.col == general.col && count_between(cells, general, other) == 0 {
            return true;
        }
    }

    own_squares(cells, role.opponent()).into_iter().any(|from| {
        piece_at(cells, from).is_some_and(|piece| can_reach(cells, piece, from, general))
    })
}

fn piece_at(cells: &Cells, square: Square) -> Option<Piece> {
    cells[square.index()].and_then(|o| o.piece())
}

fn owner_at(cells: &Cells, square: Square) -> Option<Role> {
    cells[square.index()].map(|o| o.owner())
}

fn own_squares(cells: &Cells, role: Role) -> Vec<Square> {
    (0..CELLS)
        .filter(|&i| cells[i].is_some_and(|o| o.owner() == role))
        .map(Square::from_index)
        .collect()
}

fn find_general(cells: &Cells, role: Role) -> Option<Square> {
    (0..CELLS)
        .find(|&i| {
            cells[i].and_then(|o| o.piece()) == Some(Piece::new(PieceKind::General, role))
        })
        .map(Square::from_index)
}

fn make_move(cells: &mut [Option<Occupant>], from: Square, to: Square) -> Option<Occupant> {
    let moving = cells[from.index()].take();
    std::mem::replace(&mut cells[to.index()], moving)
}

fn in_palace(square: Square, role: Role) -> bool {
    let rows = match role {
        Role::FirstMover => 0..=2,
        Role::SecondMover => 7..=9,
    };
    rows.contains(&square.row) && (3..=5).contains(&square.col)
}

fn on_own_side(square: Square, role: Role) -> bool {
    match role {
        Role::FirstMover => square.row <= RED_RIVERBANK,
        Role::SecondMover => square.row > RED_RIVERBANK,
    }
}

/// Pieces strictly between two squares on one rank or file.
fn count_between(cells: &Cells, a: Square, b: Square) -> usize {
    if a.row == b.row {
        let (lo, hi) = (a.col.min(b.col), a.col.max(b.col));
        (lo + 1..hi)
            .filter(|&col| cells[Square::new(a.row, col).index()].is_some())
            .count()
    } else if a.col == b.col {
        let (lo, hi) = (a.row.min(b.row), a.row.max(b.row));
        (lo + 1..hi)
            .filter(|&row| cells[Square::new(row, a.col).index()].is_some())
            .count()
    } else {
        usize::MAX
    }
}

/// Movement geometry and blocking for `piece`. Own-piece captures and check
/// are handled by [`check_move`].
fn can_reach(cells: &Cells, piece: Piece, from: Square, to: Square) -> bool {
    let dr = to.row as i32 - from.row as i32;
    let dc = to.col as i32 - from.col as i32;
    let occupied = |row: i32, col: i32| cells[Square::new(row as u8, col as u8).index()].is_some();

    match piece.kind {
        PieceKind::General => dr.abs() + dc.abs() == 1 && in_palace(to, piece.role),
        PieceKind::Advisor => dr.abs() == 1 && dc.abs() == 1 && in_palace(to, piece.role),
        PieceKind::Elephant => {
            dr.abs() == 2
                && dc.abs() == 2
                && on_own_side(to, piece.role)
                && !occupied(from.row as i32 + dr / 2, from.col as i32 + dc / 2)
        }
        PieceKind::Horse => match (dr.abs(), dc.abs()) {
            (2, 1) => !occupied(from.row as i32 + dr / 2, from.col as i32),
            (1, 2) => !occupied(from.row as i32, from.col as i32 + dc / 2),
            _ => false,
        },
        PieceKind::Chariot => count_between(cells, from, to) == 0,
        PieceKind::Cannon => {
            let screens = count_between(cells, from, to);
            if owner_at(cells, to).is_some() {
                screens == 1
            } else {
                screens == 0
            }
        }
        PieceKind::Soldier => {
            let forward = match piece.role {
                Role::FirstMover => 1,
                Role::SecondMover => -1,
            };
            let crossed = !on_own_side(from, piece.role);
            (dr == forward && dc == 0) || (crossed && dr == 0 && dc.abs() == 1)
        }
    }
}
