#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use field::*;
pub use render::*;
pub use types::*;

mod board;
mod error;
mod field;
mod render;
mod types;

/// Static shape of a board: dimensions, mine budget, and the flood-fill switch.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: Coord,
    pub height: Coord,
    pub mines: CellCount,
    #[serde(default)]
    pub uncover_neighbors: bool,
}

impl BoardConfig {
    pub const fn new_unchecked(width: Coord, height: Coord, mines: CellCount) -> Self {
        Self {
            width,
            height,
            mines,
            uncover_neighbors: false,
        }
    }

    /// Clamps dimensions to at least one cell and `mines` so that one cell always
    /// stays mine-free for the first-uncover exclusion. Zero mines is legal.
    pub fn new(width: Coord, height: Coord, mines: CellCount) -> Self {
        let width = width.clamp(1, Coord::MAX);
        let height = height.clamp(1, Coord::MAX);
        let mines = mines.min(mult(width, height) - 1);
        Self::new_unchecked(width, height, mines)
    }

    pub fn square(x: Coord, mines: CellCount) -> Self {
        Self::new(x, x, mines)
    }

    pub const fn with_uncover_neighbors(mut self, enabled: bool) -> Self {
        self.uncover_neighbors = enabled;
        self
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.width, self.height)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new(9, 9, 10)
    }
}

/// Outcome of an uncover request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UncoverOutcome {
    NoChange,
    Uncovered,
    MineRevealed,
    Completed,
}

impl UncoverOutcome {
    /// Whether this outcome changed any field state.
    pub const fn has_update(self) -> bool {
        use UncoverOutcome::*;
        match self {
            NoChange => false,
            Uncovered => true,
            MineRevealed => true,
            Completed => true,
        }
    }
}

/// Outcome of a flag-toggle request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FlagOutcome {
    NoChange,
    Flagged,
    Unflagged,
}

impl FlagOutcome {
    /// Whether this outcome changed any field state.
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Flagged => true,
            Self::Unflagged => true,
        }
    }
}
