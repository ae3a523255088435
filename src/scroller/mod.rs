//! Scroll or Die simulation
//!
//! Frame-driven: `tick` advances a run by one display refresh, scaled to a
//! 60 Hz reference. All randomness comes from the seeded RNG in `GameState`,
//! so a run is reproducible from its seed and inputs.

pub mod collision;
pub mod difficulty;
pub mod effects;
pub mod particles;
pub mod physics;
pub mod session;
pub mod spawner;
pub mod state;
pub mod tick;

pub use difficulty::{Difficulty, difficulty_at};
pub use session::ScrollerGame;
pub use state::{GamePhase, GameState};
pub use tick::{TickInput, handle_scroll, tick};
