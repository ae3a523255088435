//! Sliding puzzle engine
//!
//! One engine for every board size (the shipped variants are 3×3 and 4×4).
//! Boards are dealt solvable and unsolved; moves are logged so a finished
//! game can be replayed.

pub mod board;
pub mod recorder;
pub mod replay;
pub mod session;
pub mod stats;

pub use board::{Board, BoardError, Slide};
pub use recorder::{MoveLog, MoveRecord};
pub use replay::{ReplayEngine, ReplayError, ReplayPhase, ReplayToken, replay_all};
pub use session::{PuzzleGame, PuzzleSession};
pub use stats::{DailyStats, UploadedImages};
