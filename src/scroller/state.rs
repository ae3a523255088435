//! Game state and core simulation types
//!
//! Everything a run mutates lives in `GameState`. A fresh run is always
//! built by `GameState::new`, so `reset` cannot leak fields between runs.

use glam::Vec2;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::ComboState;
use super::effects::{Immunity, PowerUpTimers};
use super::spawner::SpawnClock;
use crate::consts::*;
use crate::events::GameEvent;
use crate::settings::DifficultyMode;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first input
    Start,
    /// Active gameplay
    Playing,
    /// Run ended, results frozen
    Dead,
}

/// The player's orb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Vertical position (0-100, percent of screen height)
    pub y: f32,
    pub velocity: f32,
    /// 0-1 "scrolling too hard" meter, decays every tick
    pub danger: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            y: PLAYER_START_Y,
            velocity: 0.0,
            danger: 0.0,
        }
    }
}

/// Obstacle geometry, fixed at spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObstacleShape {
    /// Single gap of standard height
    Bar { gap_y: f32, gap_height: f32 },
    /// Wider gap
    Gap { gap_y: f32, gap_height: f32 },
    /// Walls intruding from the top and bottom
    Double { top_height: f32, bottom_y: f32 },
}

impl ObstacleShape {
    /// Vertical band the player must stay inside: (top, bottom)
    pub fn safe_band(&self) -> (f32, f32) {
        match *self {
            ObstacleShape::Bar { gap_y, gap_height } | ObstacleShape::Gap { gap_y, gap_height } => {
                (gap_y - gap_height / 2.0, gap_y + gap_height / 2.0)
            }
            ObstacleShape::Double {
                top_height,
                bottom_y,
            } => (top_height, bottom_y),
        }
    }

    /// Where a companion coin is centered
    pub fn gap_center(&self) -> f32 {
        match *self {
            ObstacleShape::Bar { gap_y, .. } | ObstacleShape::Gap { gap_y, .. } => gap_y,
            ObstacleShape::Double { .. } => 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub shape: ObstacleShape,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub collected: bool,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    Magnet,
    SlowMo,
    Double,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Shield,
        PowerUpKind::Magnet,
        PowerUpKind::SlowMo,
        PowerUpKind::Double,
    ];

    #[inline]
    pub fn index(&self) -> usize {
        match self {
            PowerUpKind::Shield => 0,
            PowerUpKind::Magnet => 1,
            PowerUpKind::SlowMo => 2,
            PowerUpKind::Double => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub kind: PowerUpKind,
    pub collected: bool,
}

/// Immunity jar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jar {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// A meteor drifting across the screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meteor {
    pub id: u32,
    pub pos: Vec2,
    /// Percent per reference frame
    pub vel: Vec2,
    /// Diameter (percent)
    pub size: f32,
    /// Degrees
    pub rot: f32,
    pub vrot: f32,
}

/// Combo effect flavours, cycled by chain length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboKind {
    Speed,
    Shield,
    Magnet,
}

/// What spawned a particle (presentation picks the color)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParticleKind {
    Death,
    Coin,
    Jar,
    PowerUp(PowerUpKind),
    Trail { shielded: bool },
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
    pub kind: ParticleKind,
}

/// Frozen results of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub survival_secs: f32,
    pub final_score: f32,
    pub new_record: bool,
    pub message: String,
}

/// Complete run state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub mode: DifficultyMode,
    /// Wall-clock start of the run (ms)
    pub run_started_ms: f64,
    /// Timestamp of the previous tick, for frame scaling
    pub last_frame_ms: Option<f64>,
    /// Timestamp of the previous scroll input
    pub last_input_ms: f64,
    /// Survival time in seconds
    pub score: f32,
    /// 2 while score-double is active
    pub score_multiplier: f32,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub coins: Vec<Coin>,
    pub power_ups: Vec<PowerUp>,
    pub jars: Vec<Jar>,
    pub meteors: Vec<Meteor>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub trail: Vec<Particle>,
    pub immunity: Immunity,
    pub effects: PowerUpTimers,
    pub combo: ComboState,
    pub near_misses: u32,
    /// Power-up kinds picked up this run
    pub power_ups_used: [bool; 4],
    pub spawn: SpawnClock,
    pub outcome: Option<RunOutcome>,
    /// Pending notifications for the host
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new run in the Start phase
    pub fn new(seed: u64, mode: DifficultyMode) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Start,
            mode,
            run_started_ms: 0.0,
            last_frame_ms: None,
            last_input_ms: 0.0,
            score: 0.0,
            score_multiplier: 1.0,
            player: Player::default(),
            obstacles: Vec::new(),
            coins: Vec::new(),
            power_ups: Vec::new(),
            jars: Vec::new(),
            meteors: Vec::new(),
            particles: Vec::new(),
            trail: Vec::new(),
            immunity: Immunity::default(),
            effects: PowerUpTimers::default(),
            combo: ComboState::default(),
            near_misses: 0,
            power_ups_used: [false; 4],
            spawn: SpawnClock::default(),
            outcome: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Start → Playing (no-op in any other phase)
    pub fn start_run(&mut self, now_ms: f64) -> bool {
        if self.phase != GamePhase::Start {
            return false;
        }
        self.phase = GamePhase::Playing;
        self.run_started_ms = now_ms;
        self.last_frame_ms = None;
        self.last_input_ms = now_ms;
        self.spawn = SpawnClock::starting_at(now_ms, &mut self.rng);
        self.events.push(GameEvent::RunStarted);
        log::info!("Run started (seed {}, {})", self.seed, self.mode.as_str());
        true
    }

    /// Back to Start with every per-run field cleared
    pub fn reset(&mut self) {
        let seed = self.rng.next_u64();
        *self = Self::new(seed, self.mode);
    }

    /// Multiplier-adjusted score
    pub fn final_score(&self) -> f32 {
        self.score * self.score_multiplier
    }

    pub fn is_immune(&self) -> bool {
        self.immunity.is_active()
    }

    pub fn power_up_kinds_used(&self) -> usize {
        self.power_ups_used.iter().filter(|used| **used).count()
    }

    /// Take pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_band() {
        let bar = ObstacleShape::Bar {
            gap_y: 50.0,
            gap_height: GAP_SIZE,
        };
        assert_eq!(bar.safe_band(), (36.0, 64.0));
        let trap = ObstacleShape::Double {
            top_height: 20.0,
            bottom_y: 80.0,
        };
        assert_eq!(trap.safe_band(), (20.0, 80.0));
        assert_eq!(trap.gap_center(), 50.0);
    }

    #[test]
    fn test_start_run_once() {
        let mut state = GameState::new(7, DifficultyMode::Medium);
        assert!(state.start_run(1000.0));
        assert!(!state.start_run(2000.0));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.run_started_ms, 1000.0);
        assert_eq!(state.drain_events(), vec![GameEvent::RunStarted]);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_reset_clears_run() {
        let mut state = GameState::new(7, DifficultyMode::Hard);
        state.start_run(0.0);
        state.score = 12.0;
        state.score_multiplier = 2.0;
        state.player.y = 80.0;
        state.near_misses = 3;
        state.power_ups_used[1] = true;
        state.combo.coin_score = 10;
        let id = state.next_entity_id();
        state.jars.push(Jar { id, x: 50.0, y: 50.0 });

        state.reset();

        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.mode, DifficultyMode::Hard);
        assert_eq!(state.score, 0.0);
        assert_eq!(state.score_multiplier, 1.0);
        assert_eq!(state.player.y, PLAYER_START_Y);
        assert_eq!(state.near_misses, 0);
        assert_eq!(state.power_up_kinds_used(), 0);
        assert_eq!(state.combo.coin_score, 0);
        assert!(state.jars.is_empty());
        assert_eq!(state.next_entity_id(), 1);
    }
}
