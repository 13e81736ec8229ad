use rand::{Rng, seq::IndexedRandom};

use crate::{
    games::{
        GameState, Occupant,
        tictactoe::{CENTER, CORNERS, EDGES, LINES, owner},
    },
    models::{GameKind, Role},
};

/// Picks the tic-tac-toe cell the computer opponent plays.
///
/// Priority: finish an own line, block the opponent's line, take the centre,
/// then a random free corner, then a random free edge. Returns `None` when the
/// game is over or is not tic-tac-toe.
pub fn choose_move<R: Rng + ?Sized>(state: &GameState, ai: Role, rng: &mut R) -> Option<usize> {
    if state.kind != GameKind::Tictactoe || state.is_terminal() {
        return None;
    }

    let cells = &state.cells;

    if let Some(pos) = find_completion(cells, ai) {
        return Some(pos);
    }
    if let Some(pos) = find_completion(cells, ai.opponent()) {
        return Some(pos);
    }
    if cells[CENTER].is_none() {
        return Some(CENTER);
    }

    let free = |candidates: &[usize]| -> Vec<usize> {
        candidates
            .iter()
            .copied()
            .filter(|&i| cells[i].is_none())
            .collect()
    };

    if let Some(&corner) = free(&CORNERS).choose(rng) {
        return Some(corner);
    }
    free(&EDGES).choose(rng).copied()
}

/// First empty cell that would complete a line of `role`, scanning lines in order.
pub fn find_completion(cells: &[Option<Occupant>], role: Role) -> Option<usize> {
    LINES.iter().find_map(|line| {
        let owned = line
            .iter()
            .filter(|&&i| owner(cells, i) == Some(role))
            .count();
        let empty: Vec<usize> = line
            .iter()
            .copied()
            .filter(|&i| cells[i].is_none())
            .collect();

        if owned == 2 && empty.len() == 1 {
            Some(empty[0])
        } else {
            None
        }
    })
}
