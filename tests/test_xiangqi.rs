use duel_relay::{
    errors::GameError,
    games::{
        GameState, Move, Occupant, Piece, PieceKind, Square, Status,
        xiangqi::{self, CELLS},
    },
    models::{GameKind, Role},
};

const RED: Role = Role::FirstMover;
const BLACK: Role = Role::SecondMover;

fn shift(from: (u8, u8), to: (u8, u8)) -> Move {
    Move::Shift {
        from: Square::new(from.0, from.1),
        to: Square::new(to.0, to.1),
    }
}

fn piece_on(state: &GameState, row: u8, col: u8) -> Option<Piece> {
    state
        .cell(Square::new(row, col).index())
        .and_then(|o| o.piece())
}

/// Empty board with only the listed pieces.
fn position(turn: Role, pieces: &[(u8, u8, PieceKind, Role)]) -> GameState {
    let mut state = GameState::new(GameKind::Chess);
    state.cells = vec![None; CELLS];
    state.current_turn = turn;
    for &(row, col, kind, role) in pieces {
        state.cells[Square::new(row, col).index()] = Some(Occupant::Piece {
            piece: Piece::new(kind, role),
        });
    }
    state
}

fn assert_illegal(state: &GameState, mv: Move, role: Role) {
    match state.apply(mv, role) {
        Err(GameError::IllegalMove(_)) => {}
        other => panic!("expected IllegalMove for {mv:?}, got {other:?}"),
    }
}

#[test]
fn test_opening_position() {
    let state = GameState::new(GameKind::Chess);
    assert_eq!(state.cells.len(), 90);
    assert_eq!(state.current_turn, RED);

    assert_eq!(
        piece_on(&state, 0, 4),
        Some(Piece::new(PieceKind::General, RED))
    );
    assert_eq!(
        piece_on(&state, 9, 4),
        Some(Piece::new(PieceKind::General, BLACK))
    );
    assert_eq!(
        piece_on(&state, 2, 1),
        Some(Piece::new(PieceKind::Cannon, RED))
    );
    assert_eq!(
        piece_on(&state, 6, 8),
        Some(Piece::new(PieceKind::Soldier, BLACK))
    );
    assert_eq!(state.cells.iter().filter(|c| c.is_some()).count(), 32);

    // red has 44 legal opening moves in xiangqi
    assert_eq!(xiangqi::legal_moves(&state.cells, RED).len(), 44);
}

#[test]
fn test_horse_moves_and_blocked_leg() {
    let state = GameState::new(GameKind::Chess);

    let next = state.apply(shift((0, 1), (2, 2)), RED).unwrap();
    assert_eq!(
        piece_on(&next, 2, 2),
        Some(Piece::new(PieceKind::Horse, RED))
    );
    assert!(piece_on(&next, 0, 1).is_none());
    assert_eq!(next.current_turn, BLACK);

    // the elephant on (0, 2) blocks the sideways leg
    assert_illegal(&state, shift((0, 1), (1, 3)), RED);
}

#[test]
fn test_chariot_slides_until_blocked() {
    let state = GameState::new(GameKind::Chess);
    assert!(state.apply(shift((0, 0), (2, 0)), RED).is_ok());
    assert_illegal(&state, shift((0, 0), (4, 0)), RED);
    assert_illegal(&state, shift((0, 0), (1, 1)), RED);
}

#[test]
fn test_cannon_needs_exactly_one_screen_to_capture() {
    let state = GameState::new(GameKind::Chess);

    // over the black cannon onto the black horse
    let next = state.apply(shift((2, 1), (9, 1)), RED).unwrap();
    assert_eq!(
        piece_on(&next, 9, 1),
        Some(Piece::new(PieceKind::Cannon, RED))
    );

    // no screen: cannot capture the black cannon directly
    assert_illegal(&state, shift((2, 1), (7, 1)), RED);
    // plain moves need a clear path
    assert!(state.apply(shift((2, 1), (6, 1)), RED).is_ok());
}

#[test]
fn test_soldier_moves_forward_and_sideways_after_river() {
    let state = GameState::new(GameKind::Chess);
    assert!(state.apply(shift((3, 0), (4, 0)), RED).is_ok());
    assert_illegal(&state, shift((3, 0), (3, 1)), RED);
    assert_illegal(&state, shift((3, 0), (2, 0)), RED);

    let crossed = position(
        RED,
        &[
            (0, 4, PieceKind::General, RED),
            (9, 3, PieceKind::General, BLACK),
            (5, 0, PieceKind::Soldier, RED),
        ],
    );
    assert!(crossed.apply(shift((5, 0), (5, 1)), RED).is_ok());
    assert!(crossed.apply(shift((5, 0), (6, 0)), RED).is_ok());
    assert_illegal(&crossed, shift((5, 0), (4, 0)), RED);
}

#[test]
fn test_black_soldier_moves_down_the_board() {
    let state = GameState::new(GameKind::Chess)
        .apply(shift((3, 0), (4, 0)), RED)
        .unwrap();
    assert!(state.apply(shift((6, 0), (5, 0)), BLACK).is_ok());
    assert_illegal(&state, shift((6, 0), (7, 0)), BLACK);
}

#[test]
fn test_elephant_stays_home_and_respects_eye() {
    let state = position(
        RED,
        &[
            (0, 4, PieceKind::General, RED),
            (9, 3, PieceKind::General, BLACK),
            (4, 2, PieceKind::Elephant, RED),
            (2, 2, PieceKind::Elephant, RED),
            (1, 1, PieceKind::Soldier, BLACK),
        ],
    );
    // crossing the river
    assert_illegal(&state, shift((4, 2), (6, 4)), RED);
    // eye at (1, 1) is blocked
    assert_illegal(&state, shift((2, 2), (0, 0)), RED);
    assert!(state.apply(shift((2, 2), (0, 4)), RED).is_err());
    assert!(state.apply(shift((2, 2), (4, 4)), RED).is_ok());
}

#[test]
fn test_general_and_advisor_stay_in_palace() {
    let state = position(
        RED,
        &[
            (0, 3, PieceKind::General, RED),
            (9, 5, PieceKind::General, BLACK),
            (0, 5, PieceKind::Advisor, RED),
        ],
    );
    assert!(state.apply(shift((0, 3), (1, 3)), RED).is_ok());
    assert_illegal(&state, shift((0, 3), (0, 2)), RED);
    assert_illegal(&state, shift((0, 3), (1, 4)), RED);
    assert!(state.apply(shift((0, 5), (1, 4)), RED).is_ok());
    assert_illegal(&state, shift((0, 5), (1, 6)), RED);
}

#[test]
fn test_generals_may_not_face_each_other() {
    let state = position(
        RED,
        &[
            (0, 4, PieceKind::General, RED),
            (9, 3, PieceKind::General, BLACK),
        ],
    );
    assert_illegal(&state, shift((0, 4), (0, 3)), RED);
    assert!(state.apply(shift((0, 4), (1, 4)), RED).is_ok());
}

#[test]
fn test_pinned_piece_cannot_expose_general() {
    let state = position(
        RED,
        &[
            (0, 4, PieceKind::General, RED),
            (1, 4, PieceKind::Chariot, RED),
            (5, 4, PieceKind::Chariot, BLACK),
            (9, 3, PieceKind::General, BLACK),
        ],
    );
    assert_illegal(&state, shift((1, 4), (1, 0)), RED);
    assert!(state.apply(shift((1, 4), (5, 4)), RED).is_ok());
}

#[test]
fn test_own_capture_and_foreign_piece_are_rejected() {
    let state = GameState::new(GameKind::Chess);
    assert_illegal(&state, shift((0, 0), (0, 1)), RED);
    assert_illegal(&state, shift((9, 0), (8, 0)), RED);
    assert_illegal(&state, shift((4, 4), (5, 4)), RED);
}

#[test]
fn test_bad_coordinates_and_move_shape() {
    let state = GameState::new(GameKind::Chess);
    assert_eq!(
        state.apply(shift((0, 0), (10, 0)), RED),
        Err(GameError::OutOfBounds)
    );
    assert_eq!(
        state.apply(Move::Place { pos: 4 }, RED),
        Err(GameError::WrongMoveKind)
    );
    assert_eq!(
        state.apply(shift((6, 0), (5, 0)), BLACK),
        Err(GameError::NotYourTurn)
    );
}

#[test]
fn test_checkmate_ends_the_game() {
    let state = position(
        RED,
        &[
            (0, 3, PieceKind::General, RED),
            (8, 0, PieceKind::Chariot, RED),
            (6, 8, PieceKind::Chariot, RED),
            (9, 4, PieceKind::General, BLACK),
        ],
    );

    let mated = state.apply(shift((6, 8), (9, 8)), RED).unwrap();
    assert!(xiangqi::in_check(&mated.cells, BLACK));
    assert!(!xiangqi::has_legal_move(&mated.cells, BLACK));
    assert_eq!(mated.status, Status::Won(RED));

    assert_eq!(
        mated.apply(shift((9, 4), (8, 4)), BLACK),
        Err(GameError::GameOver)
    );
}

#[test]
fn test_stalemate_also_loses() {
    // the chariot takes rank 8 and the open file keeps the general off column 4
    let state = position(
        RED,
        &[
            (0, 4, PieceKind::General, RED),
            (7, 0, PieceKind::Chariot, RED),
            (9, 3, PieceKind::General, BLACK),
        ],
    );

    let next = state.apply(shift((7, 0), (8, 0)), RED).unwrap();
    assert!(!xiangqi::in_check(&next.cells, BLACK));
    assert!(xiangqi::legal_moves(&next.cells, BLACK).is_empty());
    assert_eq!(next.status, Status::Won(RED));
}

#[test]
fn test_display_uses_piece_symbols() {
    let state = GameState::new(GameKind::Chess);
    let text = state.to_string();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("R H E A K A E H R"));
    assert_eq!(text.lines().nth(9), Some("r h e a k a e h r"));
    assert!(text.ends_with("red to move"));
}
