use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum GameKind {
    #[default]
    #[serde(rename = "ooxx", alias = "tictactoe")]
    Tictactoe,
    #[serde(rename = "chess", alias = "xiangqi")]
    Chess,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Tictactoe => "ooxx",
            GameKind::Chess => "chess",
        }
    }

    pub fn cell_count(&self) -> usize {
        match self {
            GameKind::Tictactoe => 9,
            GameKind::Chess => 90,
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ooxx" | "tictactoe" => Ok(GameKind::Tictactoe),
            "chess" | "xiangqi" => Ok(GameKind::Chess),
            other => Err(AppError::BadMessage(format!("Unknown game kind: {other}"))),
        }
    }
}
