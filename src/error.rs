//! Error types for building a game from settings.

use thiserror::Error;

use crate::palette::Color;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("a game needs at least one round")]
    NoRounds,

    #[error("the palette is empty")]
    EmptyPalette,

    #[error("color {0} appears more than once in the palette")]
    DuplicateColor(Color),

    #[error("{schedule} lists {len} entries but the game has {rounds} rounds")]
    ScheduleTooShort {
        schedule: &'static str,
        len: usize,
        rounds: usize,
    },

    #[error("pattern length for round {round} is zero")]
    EmptyPattern { round: usize },

    #[error("time limit for round {round} is zero")]
    ZeroTimeLimit { round: usize },

    #[error("{0} code is empty")]
    EmptyCode(&'static str),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
