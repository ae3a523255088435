//! Replay engine
//!
//! Rebuilds a finished game from its initial board and move log, twice,
//! with a pause in between. The host polls `advance` (every frame, or at
//! the time reported by `next_wake_ms`). Every start or cancel bumps the
//! epoch, so wake-ups scheduled before it are ignored.

use thiserror::Error;

use super::board::Board;
use super::recorder::MoveRecord;
use crate::consts::{REPLAY_MOVE_DELAY_MS, REPLAY_PASS_PAUSE_MS};
use crate::events::PuzzleEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPhase {
    Idle,
    ReplayingFirstPass,
    PausedBetweenPasses,
    ReplayingSecondPass,
    Done,
}

impl ReplayPhase {
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            ReplayPhase::ReplayingFirstPass | ReplayPhase::PausedBetweenPasses | ReplayPhase::ReplayingSecondPass
        )
    }
}

/// Identifies the replay a host-scheduled wake-up belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayToken(u64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("recorded move {index} is not legal on the replayed board")]
    IllegalMove { index: usize },
    #[error("move log is empty")]
    Empty,
    #[error("the game is not finished yet")]
    NotFinished,
}

/// Apply a whole log to a copy of the initial board
pub fn replay_all(initial: &Board, moves: &[MoveRecord]) -> Result<Board, ReplayError> {
    let mut board = initial.clone();
    for (index, record) in moves.iter().enumerate() {
        apply(&mut board, record).ok_or(ReplayError::IllegalMove { index })?;
    }
    Ok(board)
}

/// Re-apply one record; `None` if it no longer matches the board
fn apply(board: &mut Board, record: &MoveRecord) -> Option<()> {
    if board.tile(record.from)? != record.tile || board.blank_index() != record.to {
        return None;
    }
    board.try_move(record.from).map(|_| ())
}

#[derive(Debug, Clone)]
pub struct ReplayEngine {
    phase: ReplayPhase,
    epoch: u64,
    initial: Option<Board>,
    moves: Vec<MoveRecord>,
    index: usize,
    next_due_ms: f64,
    move_delay_ms: f64,
    pass_pause_ms: f64,
}

impl Default for ReplayEngine {
    fn default() -> Self {
        Self::new(REPLAY_MOVE_DELAY_MS, REPLAY_PASS_PAUSE_MS)
    }
}

impl ReplayEngine {
    pub fn new(move_delay_ms: f64, pass_pause_ms: f64) -> Self {
        Self {
            phase: ReplayPhase::Idle,
            epoch: 0,
            initial: None,
            moves: Vec::new(),
            index: 0,
            next_due_ms: 0.0,
            move_delay_ms,
            pass_pause_ms,
        }
    }

    pub fn phase(&self) -> ReplayPhase {
        self.phase
    }

    pub fn token(&self) -> ReplayToken {
        ReplayToken(self.epoch)
    }

    pub fn is_current(&self, token: ReplayToken) -> bool {
        token.0 == self.epoch
    }

    /// When the next step is due, while a replay is running
    pub fn next_wake_ms(&self) -> Option<f64> {
        self.phase.is_running().then_some(self.next_due_ms)
    }

    /// Reset `board` to `initial` and begin the first pass
    pub fn start(
        &mut self,
        initial: &Board,
        moves: &[MoveRecord],
        board: &mut Board,
        now_ms: f64,
    ) -> Result<ReplayToken, ReplayError> {
        if moves.is_empty() {
            return Err(ReplayError::Empty);
        }
        self.epoch += 1;
        *board = initial.clone();
        self.initial = Some(initial.clone());
        self.moves = moves.to_vec();
        self.index = 0;
        self.phase = ReplayPhase::ReplayingFirstPass;
        self.next_due_ms = now_ms + self.move_delay_ms;
        log::info!("Replay started: {} moves", self.moves.len());
        Ok(self.token())
    }

    /// Handle a host-scheduled wake-up; stale tokens do nothing
    pub fn wake(&mut self, token: ReplayToken, board: &mut Board, now_ms: f64) -> Vec<PuzzleEvent> {
        if !self.is_current(token) {
            log::debug!("Ignoring stale replay wake-up");
            return Vec::new();
        }
        self.advance(board, now_ms)
    }

    /// Apply every step that is due by `now_ms`
    pub fn advance(&mut self, board: &mut Board, now_ms: f64) -> Vec<PuzzleEvent> {
        let mut events = Vec::new();
        while self.phase.is_running() && now_ms >= self.next_due_ms {
            match self.phase {
                ReplayPhase::ReplayingFirstPass | ReplayPhase::ReplayingSecondPass => {
                    let pass = if self.phase == ReplayPhase::ReplayingFirstPass { 1 } else { 2 };
                    let applied = self.moves.get(self.index).and_then(|record| apply(board, record));
                    if applied.is_none() {
                        log::warn!("Replay diverged at move {}, stopping", self.index);
                        if let Some(event) = self.cancel(board) {
                            events.push(event);
                        }
                        break;
                    }
                    events.push(PuzzleEvent::ReplayStep {
                        pass,
                        index: self.index,
                    });
                    self.index += 1;

                    if self.index < self.moves.len() {
                        self.next_due_ms += self.move_delay_ms;
                    } else if pass == 1 {
                        self.phase = ReplayPhase::PausedBetweenPasses;
                        self.next_due_ms += self.pass_pause_ms;
                    } else {
                        self.phase = ReplayPhase::Done;
                        events.push(PuzzleEvent::ReplayComplete);
                        log::info!("Replay complete");
                    }
                }
                ReplayPhase::PausedBetweenPasses => {
                    if let Some(initial) = &self.initial {
                        *board = initial.clone();
                    }
                    self.index = 0;
                    self.phase = ReplayPhase::ReplayingSecondPass;
                    self.next_due_ms += self.move_delay_ms;
                }
                ReplayPhase::Idle | ReplayPhase::Done => break,
            }
        }
        events
    }

    /// Stop any running replay and leave the board solved
    pub fn cancel(&mut self, board: &mut Board) -> Option<PuzzleEvent> {
        let was_running = self.phase.is_running();
        self.epoch += 1;
        self.phase = ReplayPhase::Idle;
        self.index = 0;
        self.initial = None;
        self.moves.clear();
        board.solve();
        if was_running {
            log::info!("Replay cancelled");
            Some(PuzzleEvent::ReplayCancelled)
        } else {
            None
        }
    }
}
