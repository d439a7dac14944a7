use serde::{Deserialize, Serialize};

/// Cover state of a single field as the player sees it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldVisibility {
    Covered,
    Flagged,
    Uncovered,
}

impl Default for FieldVisibility {
    fn default() -> Self {
        Self::Covered
    }
}

/// One grid cell: mine flag, cover state, and the stored neighbor-mine count.
///
/// The setters are unconditional; callers validate with [`Field::can_transition_to`]
/// before mutating. The mine flag and adjacency count are written exactly once,
/// during placement, and are meaningless before it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    mine: bool,
    visibility: FieldVisibility,
    adjacent_mines: u8,
}

impl Field {
    pub const fn visibility(self) -> FieldVisibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: FieldVisibility) {
        self.visibility = visibility;
    }

    /// Forward-only visibility rule: covered and flagged toggle into each other,
    /// both may become uncovered, and nothing ever leaves uncovered.
    pub const fn can_transition_to(self, visibility: FieldVisibility) -> bool {
        use FieldVisibility::*;
        match (self.visibility, visibility) {
            (Uncovered, _) => false,
            (Covered, Flagged) | (Flagged, Covered) => true,
            (Covered, Uncovered) | (Flagged, Uncovered) => true,
            (Covered, Covered) | (Flagged, Flagged) => false,
        }
    }

    pub const fn is_mine(self) -> bool {
        self.mine
    }

    pub fn set_mine(&mut self, mine: bool) {
        self.mine = mine;
    }

    pub const fn adjacent_mines(self) -> u8 {
        self.adjacent_mines
    }

    pub fn set_adjacent_mines(&mut self, count: u8) {
        self.adjacent_mines = count;
    }
}
