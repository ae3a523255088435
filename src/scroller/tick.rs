//! Frame tick
//!
//! Advances a run by one display frame. Every sub-step reads the state
//! committed by the previous one, in a fixed order:
//! expiry, physics, spawn, movement, pickups, collisions, death.

use glam::Vec2;
use rand::Rng;

use super::collision;
use super::difficulty::{difficulty_at, scroll_speed};
use super::particles;
use super::physics::{self, Step};
use super::spawner;
use super::state::{GamePhase, GameState, ParticleKind, PowerUpKind, RunOutcome};
use crate::consts::*;
use crate::distance;
use crate::events::GameEvent;

const DEATH_MESSAGES: [&str; 8] = [
    "You scrolled too hard.",
    "The feed consumed you.",
    "Doom scrolled.",
    "Scroll addiction: fatal.",
    "Your thumb betrayed you.",
    "Scrolled into the void.",
    "Infinite feed reached.",
    "Better luck next scroll!",
];

/// Per-frame inputs from the host
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Wall-clock timestamp of this frame (ms)
    pub now_ms: f64,
    /// Stored high score, to flag a new record at death
    pub high_score: f32,
}

/// Advance a run by one frame (no-op outside `Playing`)
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let now = input.now_ms;
    let dt = physics::frame_scale(state.last_frame_ms, now);
    state.last_frame_ms = Some(now);

    let elapsed_secs = ((now - state.run_started_ms) / 1000.0).max(0.0) as f32;
    state.score = elapsed_secs;

    // Expiry
    refresh_timers(state, now);
    state.player.danger = (state.player.danger - 0.02 * dt).max(0.0);

    // Physics
    state.player.velocity = physics::integrate_velocity(state.player.velocity, dt);
    let out_of_bounds = match physics::integrate_position(state.player.y, state.player.velocity, dt) {
        Step::InBounds(y) => {
            state.player.y = y;
            false
        }
        Step::OutOfBounds { clamped } => {
            state.player.y = clamped;
            true
        }
    };
    let y = state.player.y;
    particles::emit_trail(state, y, dt);

    // Spawn
    let difficulty = difficulty_at(elapsed_secs);
    spawner::spawn_entities(state, now, &difficulty);

    // Movement
    let speed = scroll_speed(&difficulty, state.mode.factor(), dt);
    move_entities(state, speed, dt);

    // Pickups
    collect_coins(state, now);
    collect_jars(state, now);
    collect_power_ups(state, now);

    // Collisions
    let immune = state.is_immune();
    let hit = collision::check_obstacles(y, &state.obstacles, immune)
        || collision::check_meteors(y, &state.meteors, immune);

    if out_of_bounds || hit {
        die(state, input.high_score);
    }
}

/// Recompute every deadline-based timer
///
/// Runs at the top of each tick; the HUD can also call it between frames.
pub fn refresh_timers(state: &mut GameState, now_ms: f64) {
    if state.immunity.update(now_ms) {
        state.events.push(GameEvent::ImmunityEnded);
    }
    for kind in state.effects.expire(now_ms) {
        if kind == PowerUpKind::Double {
            state.score_multiplier = 1.0;
        }
        state.events.push(GameEvent::PowerUpExpired(kind));
    }
    state.combo.expire(now_ms);
}

/// Apply a scroll/drag/swipe input
///
/// The first input of a run only starts it. Returns false when the input
/// was ignored.
pub fn handle_scroll(state: &mut GameState, delta: f32, is_touch: bool, now_ms: f64) -> bool {
    match state.phase {
        GamePhase::Start => state.start_run(now_ms),
        GamePhase::Dead => false,
        GamePhase::Playing => {
            let danger = physics::input_danger(delta, now_ms - state.last_input_ms, is_touch);
            state.player.danger = (state.player.danger + danger).min(1.0);
            state.player.velocity = physics::scroll_impulse(state.player.velocity, delta, is_touch);
            state.last_input_ms = now_ms;
            true
        }
    }
}

fn move_entities(state: &mut GameState, speed: f32, dt: f32) {
    let y = state.player.y;

    for obstacle in state.obstacles.iter_mut() {
        let old_x = obstacle.x;
        obstacle.x -= speed;
        if collision::passed_player(old_x, obstacle.x) && collision::is_near_miss(y, &obstacle.shape) {
            state.near_misses += 1;
            state.events.push(GameEvent::NearMiss);
        }
    }
    state.obstacles.retain(|o| o.x > DESPAWN_X);

    for jar in state.jars.iter_mut() {
        jar.x -= speed;
    }
    state.jars.retain(|j| j.x > DESPAWN_X);

    for power_up in state.power_ups.iter_mut() {
        power_up.x -= speed;
    }
    state.power_ups.retain(|p| p.x > DESPAWN_X && !p.collected);

    let magnet = state.effects.is_active(PowerUpKind::Magnet);
    for coin in state.coins.iter_mut() {
        let (dx, dy) = (PLAYER_X - coin.x, y - coin.y);
        let pulled = magnet && distance(PLAYER_X, y, coin.x, coin.y) < MAGNET_RANGE;
        coin.x -= speed;
        if pulled {
            coin.x += dx * MAGNET_PULL * dt;
            coin.y += dy * MAGNET_PULL * dt;
        }
    }
    state.coins.retain(|c| c.x > DESPAWN_X && !c.collected);

    let (lo, hi) = METEOR_BOUNDS;
    for meteor in state.meteors.iter_mut() {
        meteor.pos += meteor.vel * dt;
        meteor.rot = (meteor.rot + meteor.vrot * dt) % 360.0;
    }
    state
        .meteors
        .retain(|m| m.pos.x > lo && m.pos.x < hi && m.pos.y > lo && m.pos.y < hi);
}

fn collect_coins(state: &mut GameState, now_ms: f64) {
    let y = state.player.y;
    let gained_each = if state.effects.is_active(PowerUpKind::Double) { 2 } else { 1 };

    let mut picked = Vec::new();
    for coin in state.coins.iter_mut() {
        if !coin.collected && collision::reaches_coin(y, coin) {
            coin.collected = true;
            picked.push(coin.y);
        }
    }
    state.coins.retain(|c| !c.collected);

    for coin_y in picked {
        if let Some(trigger) = state.combo.add_coins(gained_each, now_ms) {
            state.events.push(GameEvent::Combo {
                multiplier: trigger.multiplier,
                chain: trigger.chain,
            });
            if let Some(effect) = trigger.effect {
                state.events.push(GameEvent::ComboEffectStarted {
                    kind: effect.kind,
                    level: effect.level,
                });
            }
        }
        state.events.push(GameEvent::CoinCollected {
            gained: gained_each,
            coin_score: state.combo.coin_score,
        });
        particles::burst(
            &mut state.rng,
            &mut state.particles,
            Vec2::new(PLAYER_X, coin_y),
            ParticleKind::Coin,
            8,
            2.0,
        );
    }
}

fn collect_jars(state: &mut GameState, now_ms: f64) {
    let y = state.player.y;
    let (reached, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut state.jars)
        .into_iter()
        .partition(|jar| collision::reaches_jar(y, jar));
    state.jars = remaining;

    for jar in reached {
        state.immunity.activate(now_ms);
        state.events.push(GameEvent::JarCollected);
        particles::burst(
            &mut state.rng,
            &mut state.particles,
            Vec2::new(jar.x, jar.y),
            ParticleKind::Jar,
            12,
            6.0,
        );
        log::debug!("Jar {} collected, immune until +5s", jar.id);
    }
}

fn collect_power_ups(state: &mut GameState, now_ms: f64) {
    let y = state.player.y;
    let mut picked = Vec::new();
    for power_up in state.power_ups.iter_mut() {
        if !power_up.collected && collision::reaches_power_up(y, power_up) {
            power_up.collected = true;
            picked.push((power_up.kind, Vec2::new(power_up.x, power_up.y)));
        }
    }
    state.power_ups.retain(|p| !p.collected);

    for (kind, pos) in picked {
        state.power_ups_used[kind.index()] = true;
        state.effects.activate(kind, now_ms);
        if kind == PowerUpKind::Double {
            state.score_multiplier = 2.0;
        }
        state.events.push(GameEvent::PowerUpCollected(kind));
        particles::burst(
            &mut state.rng,
            &mut state.particles,
            pos,
            ParticleKind::PowerUp(kind),
            12,
            8.0,
        );
        log::debug!("Power-up collected: {kind:?}");
    }
}

/// Playing → Dead, exactly once
fn die(state: &mut GameState, high_score: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.phase = GamePhase::Dead;

    let y = state.player.y;
    let final_score = state.final_score();
    let new_record = final_score > high_score;
    let message = DEATH_MESSAGES[state.rng.random_range(0..DEATH_MESSAGES.len())].to_string();
    particles::death_burst(state, y);

    log::info!(
        "Run over after {:.1}s (final {final_score:.1}{})",
        state.score,
        if new_record { ", new record" } else { "" }
    );

    state.outcome = Some(RunOutcome {
        survival_secs: state.score,
        final_score,
        new_record,
        message: message.clone(),
    });
    state.events.push(GameEvent::Death {
        y,
        survival_secs: state.score,
        final_score,
        new_record,
        message,
    });
}
