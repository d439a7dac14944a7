use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

use withersweeper_core::{
    Board, BoardState, CellCount, Coord, Coord2, Result, UncoverOutcome,
};

use crate::MatchConfig;

/// Identity of the player an action is attributed to.
pub type ActorId = Uuid;

/// The two request types the host framework dispatches into a match.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Uncover { x: Coord, y: Coord, actor: ActorId },
    ToggleFlag { x: Coord, y: Coord, actor: ActorId },
}

/// Outbound events returned from [`GameSession::handle`]. The caller decides
/// what to do with them (chat messages, closing the game world, item updates).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    MineRevealed { actor: ActorId, mistakes: u32 },
    BoardFailed { mistakes: u32 },
    BoardCompleted { elapsed_secs: u32 },
    FlagsChanged { remaining: CellCount },
}

pub type Events = SmallVec<[Event; 2]>;

/// The original deployment ticks twenty times per second.
const TICKS_PER_SECOND: u32 = 20;

/// One match instance: the board, the mistake counter, and elapsed time.
///
/// Mines are placed lazily on the first uncover action, excluding the uncovered
/// cell, so the first click is never a mine.
#[derive(Clone, Debug)]
pub struct GameSession {
    config: MatchConfig,
    board: Board,
    rng: SmallRng,
    mistakes: u32,
    ticks: u32,
}

impl GameSession {
    pub fn new(config: MatchConfig, seed: u64) -> Self {
        let board = Board::new(config.board);
        Self {
            config,
            board,
            rng: SmallRng::seed_from_u64(seed),
            mistakes: 0,
            ticks: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn flag_icon(&self) -> &str {
        &self.config.flag_icon
    }

    /// Advances match time by one host tick. Stops counting once the board
    /// reaches a terminal state.
    pub fn tick(&mut self) {
        if !self.board.state().is_terminal() {
            self.ticks += 1;
        }
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.ticks / TICKS_PER_SECOND
    }

    pub fn handle(&mut self, action: Action) -> Result<Events> {
        match action {
            Action::Uncover { x, y, actor } => self.handle_uncover((x, y), actor),
            Action::ToggleFlag { x, y, actor } => self.handle_toggle_flag((x, y), actor),
        }
    }

    fn handle_uncover(&mut self, pos: Coord2, actor: ActorId) -> Result<Events> {
        if matches!(self.board.state(), BoardState::Uninitialized) {
            self.board.place_mines(pos, &mut self.rng)?;
        }

        let mut events = Events::new();
        match self.board.uncover(pos)? {
            UncoverOutcome::MineRevealed => {
                self.mistakes += 1;
                log::info!(
                    "actor {actor} revealed a mine, mistake {} of {}",
                    self.mistakes,
                    self.config.max_mistakes
                );
                events.push(Event::MineRevealed {
                    actor,
                    mistakes: self.mistakes,
                });

                if self.mistakes >= self.config.max_mistakes {
                    self.board.mark_failed();
                    events.push(Event::BoardFailed {
                        mistakes: self.mistakes,
                    });
                }
            }
            UncoverOutcome::Completed => {
                log::info!("board completed in {} seconds", self.elapsed_secs());
                events.push(Event::BoardCompleted {
                    elapsed_secs: self.elapsed_secs(),
                });
            }
            UncoverOutcome::Uncovered | UncoverOutcome::NoChange => {}
        }
        Ok(events)
    }

    fn handle_toggle_flag(&mut self, pos: Coord2, actor: ActorId) -> Result<Events> {
        let mut events = Events::new();
        if self.board.toggle_flag(pos)?.has_update() {
            log::debug!("actor {actor} toggled a flag at {pos:?}");
            events.push(Event::FlagsChanged {
                remaining: self.board.remaining_flags(),
            });
        }
        Ok(events)
    }
}
