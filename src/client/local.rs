use rand::{Rng, rng};

use crate::{
    errors::GameError,
    games::{GameState, Move, ai},
    models::{GameKind, Role},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalMode {
    /// Both sides play on this device and take turns.
    Hotseat,
    /// The human plays first; the computer answers as the second mover.
    VersusAi,
}

/// A game played without a relay.
#[derive(Debug, Clone)]
pub struct LocalMatch {
    mode: LocalMode,
    state: GameState,
}

impl LocalMatch {
    /// Computer play only exists for tic-tac-toe; other games fall back to
    /// hotseat.
    pub fn new(kind: GameKind, mode: LocalMode) -> Self {
        let mode = if kind == GameKind::Tictactoe {
            mode
        } else {
            LocalMode::Hotseat
        };

        Self {
            mode,
            state: GameState::new(kind),
        }
    }

    pub fn mode(&self) -> LocalMode {
        self.mode
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Plays `mv` for whoever is to move. In [`LocalMode::VersusAi`] the
    /// computer replies straight away; its cell is returned.
    pub fn play(&mut self, mv: Move) -> Result<Option<usize>, GameError> {
        self.play_with(mv, &mut rng())
    }

    pub fn play_with<R: Rng + ?Sized>(
        &mut self,
        mv: Move,
        rng: &mut R,
    ) -> Result<Option<usize>, GameError> {
        let acting = self.state.current_turn;
        if self.mode == LocalMode::VersusAi && acting != Role::FirstMover {
            return Err(GameError::NotYourTurn);
        }

        self.state.apply_in_place(mv, acting)?;

        if self.mode != LocalMode::VersusAi {
            return Ok(None);
        }

        let Some(pos) = ai::choose_move(&self.state, Role::SecondMover, rng) else {
            return Ok(None);
        };
        self.state
            .apply_in_place(Move::Place { pos }, Role::SecondMover)?;
        tracing::debug!("Computer played cell {}", pos);
        Ok(Some(pos))
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}
