use serde::{Deserialize, Serialize};

use crate::*;

/// Pure data projection of one field for an external renderer. A mine is only
/// ever shown once it has been uncovered.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellView {
    Covered,
    Flagged,
    Uncovered(u8),
    MineRevealed,
}

/// Presentation sink the board projects onto. The board never renders anything
/// itself; implementors materialize the views however they like.
pub trait Surface {
    fn set_cell(&mut self, pos: Coord2, view: CellView);
}

/// Static structural layout of the play area, independent of mine and
/// visibility state. A one-time export for world/template generation.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapLayout {
    pub size: Coord2,
    pub spawn: (f64, f64),
}

impl Board {
    pub fn cell_view(&self, pos: Coord2) -> Result<CellView> {
        Ok(view_of(self.field(pos)?))
    }

    /// Projects every field's current state onto `surface`. Callable repeatedly;
    /// a pure function of the board state.
    pub fn build(&self, surface: &mut impl Surface) {
        for pos in coords(self.size()) {
            surface.set_cell(pos, view_of(&self.grid[pos.to_nd_index()]));
        }
    }

    pub fn build_map(&self) -> MapLayout {
        let size = self.size();
        MapLayout {
            size,
            spawn: (f64::from(size.0) / 2.0, f64::from(size.1) / 2.0),
        }
    }
}

fn view_of(field: &Field) -> CellView {
    match field.visibility() {
        FieldVisibility::Covered => CellView::Covered,
        FieldVisibility::Flagged => CellView::Flagged,
        FieldVisibility::Uncovered if field.is_mine() => CellView::MineRevealed,
        FieldVisibility::Uncovered => CellView::Uncovered(field.adjacent_mines()),
    }
}
