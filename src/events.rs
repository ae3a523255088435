//! Fire-and-forget notifications for the presentation layer
//!
//! The cores push events while committing a tick or a move; the host drains
//! them to play sounds, show confetti or open modals. Nothing in the cores
//! reads them back.

use serde::{Deserialize, Serialize};

use crate::profile::Achievement;
use crate::scroller::state::{ComboKind, PowerUpKind};

/// Scroller notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A run started
    RunStarted,
    /// The player died; carries the frozen results
    Death {
        /// Where the player was when the run ended (already clamped)
        y: f32,
        /// Survival time in seconds
        survival_secs: f32,
        /// Multiplier-adjusted final score
        final_score: f32,
        /// Final score beat the stored high score
        new_record: bool,
        message: String,
    },
    CoinCollected {
        gained: u32,
        coin_score: u32,
    },
    PowerUpCollected(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    JarCollected,
    ImmunityEnded,
    /// Coin score hit a multiple of five
    Combo {
        multiplier: f32,
        chain: u32,
    },
    ComboEffectStarted {
        kind: ComboKind,
        level: u32,
    },
    NearMiss,
    AchievementUnlocked(Achievement),
}

/// Puzzle notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PuzzleEvent {
    /// A tile slid into the blank
    TileMoved {
        tile: u16,
        from: usize,
        to: usize,
    },
    /// The board reached the solved permutation
    Won {
        moves: u32,
        elapsed_secs: f64,
    },
    /// Replay applied a recorded move
    ReplayStep {
        pass: u8,
        index: usize,
    },
    ReplayComplete,
    ReplayCancelled,
}
