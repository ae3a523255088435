//! Scrolly Arcade - game cores for the Scrolly mini-games
//!
//! Core modules:
//! - `scroller`: Scroll or Die simulation (physics, spawning, collisions, combos)
//! - `puzzle`: Sliding puzzle engine (solvable shuffles, moves, replay)
//! - `persistence`: Key/value storage port (LocalStorage on web)
//! - `profile`: High score, coins, achievements, daily challenge, streak
//! - `settings`: Player preferences
//! - `audio`: Sound effect port (Web Audio on web)

pub mod audio;
pub mod events;
pub mod persistence;
pub mod profile;
pub mod puzzle;
pub mod scroller;
pub mod settings;

pub use events::{GameEvent, PuzzleEvent};
pub use persistence::{MemoryStorage, Storage, StorageError};
pub use profile::Profile;
pub use settings::{DifficultyMode, Settings};

/// Game configuration constants
pub mod consts {
    /// Reference frame duration (60 Hz) used to normalize frame time
    pub const REFERENCE_FRAME_MS: f64 = 16.67;
    /// Frame-time scale cap to absorb frame spikes
    pub const MAX_FRAME_SCALE: f32 = 2.0;

    /// Player physics
    pub const GRAVITY: f32 = 0.06;
    pub const FRICTION: f32 = 0.88;
    pub const MAX_VELOCITY: f32 = 5.0;
    pub const SCROLL_SENSITIVITY: f32 = 1.2;
    pub const WHEEL_FORCE: f32 = 0.08;
    pub const TOUCH_FORCE: f32 = 0.12;

    /// Playfield (percent of the screen)
    pub const PLAYER_X: f32 = 15.0;
    pub const PLAYER_START_Y: f32 = 50.0;
    pub const PLAYER_WIDTH: f32 = 4.0;
    pub const PLAYER_HALF_HEIGHT: f32 = 2.0;
    pub const PLAYER_RADIUS: f32 = 2.5;
    pub const MIN_Y: f32 = 5.0;
    pub const MAX_Y: f32 = 95.0;

    /// Obstacles
    pub const BASE_OBSTACLE_SPEED: f32 = 1.5;
    pub const OBSTACLE_HALF_WIDTH: f32 = 3.0;
    pub const GAP_SIZE: f32 = 28.0;
    pub const WIDE_GAP_SIZE: f32 = GAP_SIZE + 5.0;
    pub const OBSTACLE_SPAWN_X: f32 = 105.0;
    pub const COLLECTIBLE_SPAWN_X: f32 = 110.0;
    /// Entities at or left of this are retired
    pub const DESPAWN_X: f32 = -10.0;
    pub const COIN_COMPANION_CHANCE: f64 = 0.6;

    /// Pickups
    pub const COIN_PICKUP_RADIUS: f32 = 4.5;
    pub const POWER_UP_PICKUP_RADIUS: f32 = 6.0;
    pub const JAR_PICKUP_DX: f32 = 4.0;
    pub const JAR_PICKUP_DY: f32 = 6.0;
    pub const MAGNET_RANGE: f32 = 30.0;
    pub const MAGNET_PULL: f32 = 0.15;
    pub const NEAR_MISS_MARGIN: f32 = 3.0;

    /// Timers (milliseconds)
    pub const IMMUNITY_DURATION_MS: f64 = 5000.0;
    pub const POWER_UP_DURATION_MS: f64 = 5000.0;
    pub const COMBO_EFFECT_DURATION_MS: f64 = 5000.0;
    pub const JAR_INTERVAL_MS: (f64, f64) = (8000.0, 14000.0);
    pub const METEOR_INTERVAL_MS: (f64, f64) = (10000.0, 18000.0);
    pub const POWER_UP_MIN_INTERVAL_MS: f64 = 10000.0;
    pub const POWER_UP_SPAWN_CHANCE: f64 = 0.25;

    /// Meteors are retired once outside (-20, 120) on either axis
    pub const METEOR_BOUNDS: (f32, f32) = (-20.0, 120.0);

    /// Combo
    pub const COINS_PER_COMBO: u32 = 5;
    pub const COMBO_STEP: f32 = 0.2;
    pub const MAX_COMBO_MULTIPLIER: f32 = 3.0;

    /// Particles
    pub const MAX_TRAIL_PARTICLES: usize = 21;
    pub const TRAIL_SPAWN_CHANCE: f32 = 0.28;
    pub const DEATH_PARTICLES: usize = 20;

    /// Puzzle replay pacing
    pub const REPLAY_MOVE_DELAY_MS: f64 = 350.0;
    pub const REPLAY_PASS_PAUSE_MS: f64 = 1500.0;
}

/// Days since the Unix epoch for a millisecond timestamp
#[inline]
pub fn day_index(now_ms: f64) -> i64 {
    (now_ms / 86_400_000.0).floor() as i64
}

/// Euclidean distance between two points on the playfield
#[inline]
pub fn distance(ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = ax - bx;
    let dy = ay - by;
    (dx * dx + dy * dy).sqrt()
}
