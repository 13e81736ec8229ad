use crate::{
    errors::GameError,
    games::{GameState, Move, Occupant, Status},
    models::Role,
};

pub const SIDE: usize = 3;
pub const CELLS: usize = SIDE * SIDE;

pub const CENTER: usize = 4;
pub const CORNERS: [usize; 4] = [0, 2, 6, 8];
pub const EDGES: [usize; 4] = [1, 3, 5, 7];

/// Rows, then columns, then the two diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

pub fn apply(state: &mut GameState, mv: Move, acting: Role) -> Result<(), GameError> {
    let Move::Place { pos } = mv else {
        return Err(GameError::WrongMoveKind);
    };

    if pos >= CELLS {
        return Err(GameError::OutOfBounds);
    }
    if state.cells[pos].is_some() {
        return Err(GameError::Occupied(pos));
    }

    state.cells[pos] = Some(Occupant::Mark { role: acting });

    if has_line(&state.cells, acting) {
        state.status = Status::Won(acting);
    } else if is_full(&state.cells) {
        state.status = Status::Drawn;
    } else {
        state.current_turn = acting.opponent();
    }

    Ok(())
}

pub fn owner(cells: &[Option<Occupant>], index: usize) -> Option<Role> {
    cells.get(index).copied().flatten().map(|o| o.owner())
}

pub fn has_line(cells: &[Option<Occupant>], role: Role) -> bool {
    LINES
        .iter()
        .any(|line| line.iter().all(|&i| owner(cells, i) == Some(role)))
}

pub fn is_full(cells: &[Option<Occupant>]) -> bool {
    cells.iter().all(Option::is_some)
}
