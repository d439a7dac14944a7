use alloc::collections::{BTreeSet, VecDeque};
use alloc::vec::Vec;
use ndarray::Array2;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Per-match lifecycle of a board. `Uninitialized` doubles as the not-yet-placed
/// latch: the one-shot transition to `Active` is mine placement. `Completed` and
/// `Failed` are terminal; the board never leaves them on its own or otherwise.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoardState {
    Uninitialized,
    Active,
    Completed,
    Failed,
}

impl BoardState {
    pub const fn mines_placed(self) -> bool {
        !matches!(self, Self::Uninitialized)
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

/// The full grid plus mine-placement and completion logic.
///
/// Mines are placed lazily by [`Board::place_mines`] on the first uncover, so the
/// triggering cell can be excluded and the first click is never a mine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    config: BoardConfig,
    pub(crate) grid: Array2<Field>,
    state: BoardState,
    uncovered_count: CellCount,
    flagged_count: CellCount,
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            grid: Array2::default((config.width, config.height).to_nd_index()),
            state: Default::default(),
            uncovered_count: 0,
            flagged_count: 0,
        }
    }

    /// Builds a board with a known mine layout, skipping random placement.
    /// Intended for fixtures and deterministic replays; the configured mine
    /// budget is replaced by the actual layout count.
    pub fn with_mines(config: BoardConfig, mine_coords: &[Coord2]) -> Result<Self> {
        let mut board = Self::new(config);

        for &pos in mine_coords {
            let pos = board.validate(pos)?;
            board.grid[pos.to_nd_index()].set_mine(true);
        }

        board.config.mines = board.count_mines();
        board.store_adjacency();
        board.state = BoardState::Active;
        Ok(board)
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn size(&self) -> Coord2 {
        (self.config.width, self.config.height)
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Mines minus placed flags, clamped at zero for display. Over-flagging is
    /// legal and simply exhausts the shown count.
    pub fn remaining_flags(&self) -> CellCount {
        self.config.mines.saturating_sub(self.flagged_count)
    }

    pub fn is_valid_pos(&self, x: Coord, y: Coord) -> bool {
        x < self.config.width && y < self.config.height
    }

    pub fn field(&self, pos: Coord2) -> Result<&Field> {
        let pos = self.validate(pos)?;
        Ok(&self.grid[pos.to_nd_index()])
    }

    /// True when every non-mine field is uncovered; flags on mines do not matter.
    pub fn is_completed(&self) -> bool {
        self.uncovered_count == self.safe_cell_count()
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.config.total_cells() - self.config.mines
    }

    /// One-shot randomized placement, triggered by the first uncover anywhere.
    /// Picks the configured number of distinct cells uniformly from everything
    /// except `exclude`, then stores every field's neighbor-mine count. Calling
    /// again after placement is a no-op.
    pub fn place_mines(&mut self, exclude: Coord2, rng: &mut impl Rng) -> Result<()> {
        let exclude = self.validate(exclude)?;
        if self.state.mines_placed() {
            return Ok(());
        }

        let candidates: Vec<Coord2> = coords(self.size()).filter(|&pos| pos != exclude).collect();
        let requested = usize::from(self.config.mines);
        let placing = requested.min(candidates.len());
        if placing < requested {
            log::warn!("board only fits {placing} mines, requested {requested}");
        }

        for &pos in candidates.choose_multiple(rng, placing) {
            self.grid[pos.to_nd_index()].set_mine(true);
        }

        self.config.mines = self.count_mines();
        self.store_adjacency();
        self.state = BoardState::Active;
        log::debug!(
            "placed {} mines, first uncover protected at {:?}",
            self.config.mines,
            exclude
        );
        Ok(())
    }

    /// Uncovers a covered field. Flagged and already-uncovered fields are
    /// no-ops. A mine is reported back for the caller to count as a mistake; a
    /// safe zero-count field starts the flood fill when the configuration
    /// enables it. Reports completion once every safe field is uncovered.
    pub fn uncover(&mut self, pos: Coord2) -> Result<UncoverOutcome> {
        let pos = self.validate(pos)?;
        self.check_not_terminal()?;
        if !self.state.mines_placed() {
            return Err(GameError::MinesNotPlaced);
        }

        let field = self.grid[pos.to_nd_index()];
        match field.visibility() {
            FieldVisibility::Uncovered | FieldVisibility::Flagged => Ok(UncoverOutcome::NoChange),
            FieldVisibility::Covered if field.is_mine() => {
                debug_assert!(field.can_transition_to(FieldVisibility::Uncovered));
                self.grid[pos.to_nd_index()].set_visibility(FieldVisibility::Uncovered);
                log::debug!("mine revealed at {:?}", pos);
                Ok(UncoverOutcome::MineRevealed)
            }
            FieldVisibility::Covered => Ok(self.uncover_safe(pos)),
        }
    }

    /// Worklist flood fill: pop a position, uncover it if still covered, and
    /// push its covered neighbors only when the popped field's count is zero and
    /// neighbor uncovering is enabled. Flagged fields are never pushed, so the
    /// player's flag decisions survive the fill. The visited set is defensive;
    /// the covered-only filter already guarantees termination.
    fn uncover_safe(&mut self, start: Coord2) -> UncoverOutcome {
        let size = self.size();
        let mut visited = BTreeSet::new();
        let mut worklist = VecDeque::from([start]);

        while let Some(pos) = worklist.pop_front() {
            if !visited.insert(pos) {
                continue;
            }

            let field = self.grid[pos.to_nd_index()];
            if field.visibility() != FieldVisibility::Covered {
                continue;
            }

            debug_assert!(field.can_transition_to(FieldVisibility::Uncovered));
            self.grid[pos.to_nd_index()].set_visibility(FieldVisibility::Uncovered);
            self.uncovered_count += 1;
            log::trace!("uncovered {:?}, adjacent mines: {}", pos, field.adjacent_mines());

            if field.adjacent_mines() == 0 && self.config.uncover_neighbors {
                worklist.extend(
                    neighbors(pos, size)
                        .filter(|&n| {
                            self.grid[n.to_nd_index()].visibility() == FieldVisibility::Covered
                        })
                        .filter(|n| !visited.contains(n)),
                );
            }
        }

        if self.is_completed() {
            self.state = BoardState::Completed;
            UncoverOutcome::Completed
        } else {
            UncoverOutcome::Uncovered
        }
    }

    /// Toggles covered/flagged; uncovered fields are a no-op. Legal before
    /// placement, since flags never read mine data.
    pub fn toggle_flag(&mut self, pos: Coord2) -> Result<FlagOutcome> {
        use FieldVisibility::*;

        let pos = self.validate(pos)?;
        self.check_not_terminal()?;

        let field = &mut self.grid[pos.to_nd_index()];
        let target = match field.visibility() {
            Covered => Flagged,
            Flagged => Covered,
            Uncovered => return Ok(FlagOutcome::NoChange),
        };
        debug_assert!(field.can_transition_to(target));
        field.set_visibility(target);

        Ok(match target {
            Flagged => {
                self.flagged_count += 1;
                FlagOutcome::Flagged
            }
            _ => {
                self.flagged_count -= 1;
                FlagOutcome::Unflagged
            }
        })
    }

    /// Caller-driven terminal transition once the mistake threshold is reached.
    pub fn mark_failed(&mut self) {
        if !self.state.is_terminal() {
            self.state = BoardState::Failed;
        }
    }

    pub(crate) fn validate(&self, (x, y): Coord2) -> Result<Coord2> {
        if self.is_valid_pos(x, y) {
            Ok((x, y))
        } else {
            Err(GameError::OutOfBounds(x, y))
        }
    }

    fn check_not_terminal(&self) -> Result<()> {
        if self.state.is_terminal() {
            Err(GameError::MatchEnded)
        } else {
            Ok(())
        }
    }

    fn count_mines(&self) -> CellCount {
        self.grid
            .iter()
            .filter(|field| field.is_mine())
            .count()
            .try_into()
            .unwrap()
    }

    fn store_adjacency(&mut self) {
        let size = self.size();
        for pos in coords(size) {
            let count = neighbors(pos, size)
                .filter(|&n| self.grid[n.to_nd_index()].is_mine())
                .count();
            self.grid[pos.to_nd_index()].set_adjacent_mines(count.try_into().unwrap());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;

    fn board(size: Coord2, mines: &[Coord2]) -> Board {
        Board::with_mines(BoardConfig::new(size.0, size.1, mines.len() as CellCount), mines)
            .unwrap()
    }

    fn flooding_board(size: Coord2, mines: &[Coord2]) -> Board {
        let config = BoardConfig::new(size.0, size.1, mines.len() as CellCount)
            .with_uncover_neighbors(true);
        Board::with_mines(config, mines).unwrap()
    }

    #[test]
    fn out_of_bounds_positions_are_rejected() {
        let board = Board::new(BoardConfig::square(3, 1));

        assert!(board.is_valid_pos(2, 2));
        assert!(!board.is_valid_pos(3, 0));
        assert_eq!(board.field((0, 3)).unwrap_err(), GameError::OutOfBounds(0, 3));
    }

    #[test]
    fn uncover_before_placement_is_rejected() {
        let mut board = Board::new(BoardConfig::square(3, 1));

        assert_eq!(board.uncover((1, 1)).unwrap_err(), GameError::MinesNotPlaced);
    }

    #[test]
    fn flagging_is_legal_before_placement() {
        let mut board = Board::new(BoardConfig::square(3, 1));

        assert_eq!(board.toggle_flag((1, 1)).unwrap(), FlagOutcome::Flagged);
        assert_eq!(board.state(), BoardState::Uninitialized);
    }

    #[test]
    fn placement_sets_exact_mine_count_and_spares_the_excluded_cell() {
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut board = Board::new(BoardConfig::square(4, 5));

            board.place_mines((1, 2), &mut rng).unwrap();

            let mines = board.grid.iter().filter(|field| field.is_mine()).count();
            assert_eq!(mines, 5);
            assert!(!board.field((1, 2)).unwrap().is_mine());
            assert_eq!(board.state(), BoardState::Active);
        }
    }

    #[test]
    fn placement_is_idempotent() {
        let mut board = Board::new(BoardConfig::square(4, 5));
        board.place_mines((0, 0), &mut SmallRng::seed_from_u64(1)).unwrap();
        let placed = board.clone();

        // different rng, different exclusion: still a no-op
        board.place_mines((3, 3), &mut SmallRng::seed_from_u64(2)).unwrap();

        assert_eq!(board, placed);
    }

    #[test]
    fn adjacency_counts_match_the_neighborhood() {
        let board = board((3, 3), &[(0, 0), (2, 1)]);

        assert_eq!(board.field((1, 0)).unwrap().adjacent_mines(), 2);
        assert_eq!(board.field((1, 1)).unwrap().adjacent_mines(), 2);
        assert_eq!(board.field((0, 1)).unwrap().adjacent_mines(), 1);
        assert_eq!(board.field((2, 0)).unwrap().adjacent_mines(), 1);
        assert_eq!(board.field((2, 2)).unwrap().adjacent_mines(), 1);
        assert_eq!(board.field((0, 2)).unwrap().adjacent_mines(), 0);
        // a mine's own count only reflects other mines
        assert_eq!(board.field((0, 0)).unwrap().adjacent_mines(), 0);
    }

    #[test]
    fn center_first_uncover_on_3x3_with_one_mine_always_counts_one() {
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut board = Board::new(BoardConfig::square(3, 1));

            board.place_mines((1, 1), &mut rng).unwrap();

            let center = board.field((1, 1)).unwrap();
            assert!(!center.is_mine());
            assert_eq!(center.adjacent_mines(), 1);
        }
    }

    #[test]
    fn uncovering_a_mine_reports_it_and_leaves_the_board_active() {
        let mut board = board((2, 2), &[(0, 0)]);

        assert_eq!(board.uncover((0, 0)).unwrap(), UncoverOutcome::MineRevealed);
        assert_eq!(
            board.field((0, 0)).unwrap().visibility(),
            FieldVisibility::Uncovered
        );
        // the mistake decision belongs to the caller
        assert_eq!(board.state(), BoardState::Active);
    }

    #[test]
    fn mark_failed_ends_the_match() {
        let mut board = board((2, 2), &[(0, 0)]);
        board.uncover((0, 0)).unwrap();

        board.mark_failed();

        assert_eq!(board.state(), BoardState::Failed);
        assert_eq!(board.uncover((1, 1)).unwrap_err(), GameError::MatchEnded);
        assert_eq!(board.toggle_flag((1, 1)).unwrap_err(), GameError::MatchEnded);
    }

    #[test]
    fn flood_fill_uncovers_the_zero_region_and_its_border() {
        let mut board = flooding_board((3, 3), &[(2, 2)]);

        assert_eq!(board.uncover((0, 0)).unwrap(), UncoverOutcome::Completed);
        assert_eq!(
            board.field((1, 1)).unwrap().visibility(),
            FieldVisibility::Uncovered
        );
        assert_eq!(board.field((1, 1)).unwrap().adjacent_mines(), 1);
        assert_eq!(
            board.field((2, 2)).unwrap().visibility(),
            FieldVisibility::Covered
        );
    }

    #[test]
    fn flood_fill_leaves_flagged_fields_untouched() {
        let mut board = flooding_board((3, 3), &[(2, 2)]);
        board.toggle_flag((0, 1)).unwrap();

        assert_eq!(board.uncover((0, 0)).unwrap(), UncoverOutcome::Uncovered);
        assert_eq!(
            board.field((0, 1)).unwrap().visibility(),
            FieldVisibility::Flagged
        );
        assert!(!board.is_completed());

        // unflagging and uncovering the skipped field finishes the board
        board.toggle_flag((0, 1)).unwrap();
        assert_eq!(board.uncover((0, 1)).unwrap(), UncoverOutcome::Completed);
    }

    #[test]
    fn uncover_without_the_neighbors_flag_reveals_a_single_field() {
        let mut board = board((3, 3), &[(2, 2)]);

        assert_eq!(board.uncover((0, 0)).unwrap(), UncoverOutcome::Uncovered);

        let uncovered = board
            .grid
            .iter()
            .filter(|field| field.visibility() == FieldVisibility::Uncovered)
            .count();
        assert_eq!(uncovered, 1);
    }

    #[test]
    fn uncovering_flagged_or_uncovered_fields_changes_nothing() {
        let mut board = board((2, 2), &[(1, 1)]);
        board.toggle_flag((0, 1)).unwrap();
        board.uncover((0, 0)).unwrap();

        assert_eq!(board.uncover((0, 1)).unwrap(), UncoverOutcome::NoChange);
        assert_eq!(board.uncover((0, 0)).unwrap(), UncoverOutcome::NoChange);
    }

    #[test]
    fn completion_ignores_flags_on_mines() {
        let mut board = board((2, 2), &[(1, 1)]);

        assert_eq!(board.uncover((0, 0)).unwrap(), UncoverOutcome::Uncovered);
        assert_eq!(board.uncover((1, 0)).unwrap(), UncoverOutcome::Uncovered);
        assert_eq!(board.uncover((0, 1)).unwrap(), UncoverOutcome::Completed);
        assert_eq!(board.state(), BoardState::Completed);
        assert!(board.is_completed());
    }

    #[test]
    fn flag_accounting_clamps_at_zero() {
        let mut board = board((3, 3), &[(0, 0)]);
        assert_eq!(board.remaining_flags(), 1);

        board.toggle_flag((1, 1)).unwrap();
        assert_eq!(board.remaining_flags(), 0);

        // over-flagging is allowed, the display just stays at zero
        board.toggle_flag((2, 2)).unwrap();
        assert_eq!(board.flagged_count(), 2);
        assert_eq!(board.remaining_flags(), 0);

        board.toggle_flag((1, 1)).unwrap();
        assert_eq!(board.remaining_flags(), 0);
        board.toggle_flag((2, 2)).unwrap();
        assert_eq!(board.remaining_flags(), 1);
    }

    #[test]
    fn flagging_an_uncovered_field_is_a_no_op() {
        let mut board = board((2, 2), &[(1, 1)]);
        board.uncover((0, 0)).unwrap();

        assert_eq!(board.toggle_flag((0, 0)).unwrap(), FlagOutcome::NoChange);
        assert_eq!(board.flagged_count(), 0);
    }

    #[test]
    fn zero_mine_board_completes_in_a_single_uncover() {
        let config = BoardConfig::new(5, 5, 0).with_uncover_neighbors(true);
        let mut board = Board::new(config);
        board.place_mines((2, 2), &mut SmallRng::seed_from_u64(0)).unwrap();

        assert_eq!(board.uncover((2, 2)).unwrap(), UncoverOutcome::Completed);
        assert!(board
            .grid
            .iter()
            .all(|field| field.visibility() == FieldVisibility::Uncovered));
    }

    #[test]
    fn config_clamps_mines_below_the_cell_count() {
        let config = BoardConfig::new(2, 2, 9);
        assert_eq!(config.mines, 3);

        let mut board = Board::new(config);
        board.place_mines((0, 0), &mut SmallRng::seed_from_u64(0)).unwrap();
        assert_eq!(board.mine_count(), 3);
        assert!(!board.field((0, 0)).unwrap().is_mine());
    }
}
