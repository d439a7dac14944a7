use thiserror::Error;

use crate::types::Coord;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("coordinates ({0}, {1}) are outside the board")]
    OutOfBounds(Coord, Coord),
    #[error("mines have not been placed yet")]
    MinesNotPlaced,
    #[error("match already ended, no new moves are accepted")]
    MatchEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
