//! Difficulty curve and combo state machine

use serde::{Deserialize, Serialize};

use super::state::ComboKind;
use crate::consts::*;

/// One step of the difficulty ladder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    /// Entity speed multiplier
    pub speed: f32,
    /// Obstacle spawn interval (ms)
    pub spawn_rate_ms: f64,
    pub label: &'static str,
}

const LADDER: [(f32, Difficulty); 4] = [
    (
        5.0,
        Difficulty {
            speed: 1.0,
            spawn_rate_ms: 2000.0,
            label: "Chill",
        },
    ),
    (
        15.0,
        Difficulty {
            speed: 1.3,
            spawn_rate_ms: 1500.0,
            label: "Focus",
        },
    ),
    (
        25.0,
        Difficulty {
            speed: 1.7,
            spawn_rate_ms: 1200.0,
            label: "Panic",
        },
    ),
    (
        f32::INFINITY,
        Difficulty {
            speed: 2.2,
            spawn_rate_ms: 900.0,
            label: "Chaos",
        },
    ),
];

/// Difficulty for a survival time in seconds
pub fn difficulty_at(elapsed_secs: f32) -> Difficulty {
    LADDER
        .iter()
        .find(|(until, _)| elapsed_secs < *until)
        .map(|(_, d)| *d)
        .unwrap_or(LADDER[LADDER.len() - 1].1)
}

/// Horizontal distance entities travel this tick
#[inline]
pub fn scroll_speed(difficulty: &Difficulty, mode_factor: f32, dt: f32) -> f32 {
    BASE_OBSTACLE_SPEED * difficulty.speed * mode_factor * dt
}

/// Combo multiplier for a coin score: +0.2 per five coins, capped at 3x
#[inline]
pub fn combo_multiplier(coin_score: u32) -> f32 {
    (1.0 + (coin_score / COINS_PER_COMBO) as f32 * COMBO_STEP).min(MAX_COMBO_MULTIPLIER)
}

/// A timed combo effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComboEffect {
    pub kind: ComboKind,
    pub level: u32,
    pub ends_at_ms: f64,
}

/// What a coin pickup did to the combo
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboTrigger {
    pub multiplier: f32,
    pub chain: u32,
    pub effect: Option<ComboEffect>,
}

/// Coin score, combo chain and the active combo effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    /// Coins collected this run (score-double counts two per coin)
    pub coin_score: u32,
    pub chain: u32,
    pub multiplier: f32,
    pub effect: Option<ComboEffect>,
}

impl Default for ComboState {
    fn default() -> Self {
        Self {
            coin_score: 0,
            chain: 0,
            multiplier: 1.0,
            effect: None,
        }
    }
}

impl ComboState {
    /// Add collected coins; fires when the score lands on a multiple of five
    pub fn add_coins(&mut self, gained: u32, now_ms: f64) -> Option<ComboTrigger> {
        self.coin_score += gained;
        if self.coin_score == 0 || self.coin_score % COINS_PER_COMBO != 0 {
            return None;
        }

        let previous_chain = self.chain;
        self.multiplier = combo_multiplier(self.coin_score);
        self.chain += 1;

        let effect = (previous_chain >= 3).then(|| {
            const CYCLE: [ComboKind; 3] = [ComboKind::Speed, ComboKind::Shield, ComboKind::Magnet];
            ComboEffect {
                kind: CYCLE[(previous_chain % 3) as usize],
                level: (previous_chain / 3).min(3),
                ends_at_ms: now_ms + COMBO_EFFECT_DURATION_MS,
            }
        });
        if effect.is_some() {
            self.effect = effect;
        }

        Some(ComboTrigger {
            multiplier: self.multiplier,
            chain: self.chain,
            effect,
        })
    }

    /// Drop the combo effect once its deadline passes
    pub fn expire(&mut self, now_ms: f64) {
        if self.effect.is_some_and(|e| now_ms >= e.ends_at_ms) {
            self.effect = None;
        }
    }
}
