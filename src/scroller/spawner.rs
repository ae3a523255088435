//! Time-gated entity spawner
//!
//! Each entity class keeps its own "last spawn" timestamp. Obstacles follow
//! the difficulty ladder; jars and meteors use a fixed interval with jitter
//! rolled once per spawn; power-ups roll a chance every tick once their
//! minimum interval has passed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::state::{Coin, GameState, Jar, Meteor, Obstacle, ObstacleShape, PowerUp, PowerUpKind};
use crate::consts::*;

/// Spawn timestamps for every entity class
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnClock {
    pub last_obstacle_ms: f64,
    pub last_jar_ms: f64,
    pub jar_interval_ms: f64,
    pub last_meteor_ms: f64,
    pub meteor_interval_ms: f64,
    pub last_power_up_ms: f64,
}

impl SpawnClock {
    /// All counters start at the beginning of the run
    pub fn starting_at<R: Rng>(now_ms: f64, rng: &mut R) -> Self {
        Self {
            last_obstacle_ms: now_ms,
            last_jar_ms: now_ms,
            jar_interval_ms: roll_interval(rng, JAR_INTERVAL_MS),
            last_meteor_ms: now_ms,
            meteor_interval_ms: roll_interval(rng, METEOR_INTERVAL_MS),
            last_power_up_ms: now_ms,
        }
    }
}

fn roll_interval<R: Rng>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    rng.random_range(min..max)
}

/// Obstacle spawn interval after the difficulty-mode adjustment
#[inline]
pub fn obstacle_interval_ms(difficulty: &Difficulty, mode_factor: f32) -> f64 {
    difficulty.spawn_rate_ms / f64::from(mode_factor)
}

/// Random obstacle shape with its gap geometry
pub fn random_shape<R: Rng>(rng: &mut R) -> ObstacleShape {
    match rng.random_range(0..3) {
        0 => ObstacleShape::Bar {
            gap_y: rng.random_range(20.0..80.0),
            gap_height: GAP_SIZE,
        },
        1 => ObstacleShape::Gap {
            gap_y: rng.random_range(25.0..75.0),
            gap_height: WIDE_GAP_SIZE,
        },
        _ => ObstacleShape::Double {
            top_height: rng.random_range(15.0..35.0),
            bottom_y: rng.random_range(65.0..85.0),
        },
    }
}

/// Coin near the centre of a gap
pub fn coin_for_gap<R: Rng>(rng: &mut R, id: u32, gap_y: f32) -> Coin {
    Coin {
        id,
        x: COLLECTIBLE_SPAWN_X,
        y: gap_y + rng.random_range(-7.5..7.5),
        collected: false,
    }
}

pub fn random_power_up<R: Rng>(rng: &mut R, id: u32) -> PowerUp {
    let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
    PowerUp {
        id,
        x: COLLECTIBLE_SPAWN_X,
        y: rng.random_range(20.0..80.0),
        kind,
        collected: false,
    }
}

pub fn random_jar<R: Rng>(rng: &mut R, id: u32) -> Jar {
    Jar {
        id,
        x: OBSTACLE_SPAWN_X,
        y: rng.random_range(10.0..90.0),
    }
}

/// Entry point and heading cone (start, span in degrees) for a screen edge
///
/// Edges are numbered top, right, bottom, left. `along` is the position
/// along that edge.
fn meteor_entry(edge: u32, along: f32) -> (Vec2, f32, f32) {
    match edge {
        0 => (Vec2::new(along, -8.0), 20.0, 120.0),
        1 => (Vec2::new(110.0, along), 110.0, 140.0),
        2 => (Vec2::new(along, 110.0), 200.0, 140.0),
        _ => (Vec2::new(-8.0, along), -70.0, 140.0),
    }
}

/// Meteor entering from a random edge, heading roughly inward
pub fn random_meteor<R: Rng>(rng: &mut R, id: u32) -> Meteor {
    let edge = rng.random_range(0..4u32);
    let along: f32 = rng.random_range(-10.0..110.0);
    let (pos, heading_start, heading_span) = meteor_entry(edge, along);
    let heading = (heading_start + rng.random_range(0.0..heading_span)).to_radians();
    let speed: f32 = rng.random_range(0.6..1.8);

    Meteor {
        id,
        pos,
        vel: Vec2::new(heading.cos(), heading.sin()) * speed,
        size: rng.random_range(3.0..8.0),
        rot: rng.random_range(0.0..360.0),
        vrot: rng.random_range(-3.0..3.0),
    }
}

/// Run every spawn timer for this tick
pub fn spawn_entities(state: &mut GameState, now_ms: f64, difficulty: &Difficulty) {
    let mode_factor = state.mode.factor();

    if now_ms - state.spawn.last_obstacle_ms > obstacle_interval_ms(difficulty, mode_factor) {
        let id = state.next_entity_id();
        let shape = random_shape(&mut state.rng);
        state.obstacles.push(Obstacle {
            id,
            x: OBSTACLE_SPAWN_X,
            shape,
        });
        if state.rng.random_bool(COIN_COMPANION_CHANCE) {
            let coin_id = state.next_entity_id();
            let coin = coin_for_gap(&mut state.rng, coin_id, shape.gap_center());
            state.coins.push(coin);
        }
        state.spawn.last_obstacle_ms = now_ms;
        log::debug!("Spawned obstacle {id}: {shape:?}");
    }

    if now_ms - state.spawn.last_jar_ms > state.spawn.jar_interval_ms {
        let id = state.next_entity_id();
        let jar = random_jar(&mut state.rng, id);
        state.jars.push(jar);
        state.spawn.last_jar_ms = now_ms;
        state.spawn.jar_interval_ms = roll_interval(&mut state.rng, JAR_INTERVAL_MS);
        log::debug!("Spawned jar {id}");
    }

    if now_ms - state.spawn.last_meteor_ms > state.spawn.meteor_interval_ms {
        let id = state.next_entity_id();
        let meteor = random_meteor(&mut state.rng, id);
        state.meteors.push(meteor);
        state.spawn.last_meteor_ms = now_ms;
        state.spawn.meteor_interval_ms = roll_interval(&mut state.rng, METEOR_INTERVAL_MS);
        log::debug!("Spawned meteor {id}");
    }

    if now_ms - state.spawn.last_power_up_ms > POWER_UP_MIN_INTERVAL_MS
        && state.rng.random_bool(POWER_UP_SPAWN_CHANCE)
    {
        let id = state.next_entity_id();
        let power_up = random_power_up(&mut state.rng, id);
        log::debug!("Spawned power-up {id}: {:?}", power_up.kind);
        state.power_ups.push(power_up);
        state.spawn.last_power_up_ms = now_ms;
    }
}
