//! Cosmetic particles
//!
//! Bursts and the player trail never affect gameplay. They decay on their
//! own fixed interval, independent of the frame tick.

use glam::Vec2;
use rand::Rng;

use super::state::{GameState, Particle, ParticleKind, PowerUpKind};
use crate::consts::*;

/// Spawn `count` particles at a point with velocity spread `±spread/2`
pub fn burst<R: Rng>(
    rng: &mut R,
    particles: &mut Vec<Particle>,
    pos: Vec2,
    kind: ParticleKind,
    count: usize,
    spread: f32,
) {
    particles.extend((0..count).map(|_| Particle {
        pos,
        vel: Vec2::new(
            (rng.random::<f32>() - 0.5) * spread,
            (rng.random::<f32>() - 0.5) * spread,
        ),
        life: 1.0,
        size: rng.random_range(2.0..6.0),
        kind,
    }));
}

/// Replace all particles with the death burst
pub fn death_burst(state: &mut GameState, y: f32) {
    state.particles.clear();
    let pos = Vec2::new(PLAYER_X, y);
    for _ in 0..DEATH_PARTICLES {
        let vel = Vec2::new(
            (state.rng.random::<f32>() - 0.5) * 8.0,
            (state.rng.random::<f32>() - 0.5) * 8.0,
        );
        state.particles.push(Particle {
            pos,
            vel,
            life: 1.0,
            size: 3.0,
            kind: ParticleKind::Death,
        });
    }
}

/// Maybe drop a trail particle behind the player, keeping the newest few
pub fn emit_trail(state: &mut GameState, y: f32, dt: f32) {
    if state.rng.random::<f32>() >= TRAIL_SPAWN_CHANCE * dt {
        return;
    }
    let shielded = state.effects.is_active(PowerUpKind::Shield);
    let vy = (state.rng.random::<f32>() - 0.5) * 0.5;
    state.trail.push(Particle {
        pos: Vec2::new(PLAYER_X, y),
        vel: Vec2::new(-0.5, vy),
        life: 0.6,
        size: 3.0,
        kind: ParticleKind::Trail { shielded },
    });
    if state.trail.len() > MAX_TRAIL_PARTICLES {
        let excess = state.trail.len() - MAX_TRAIL_PARTICLES;
        state.trail.drain(..excess);
    }
}

/// One decay step for bursts and the trail (the host runs this every 30 ms)
pub fn decay_particles(state: &mut GameState) {
    for p in state.particles.iter_mut() {
        p.pos += p.vel;
        p.life -= 0.05;
    }
    state.particles.retain(|p| p.life > 0.0);

    // Trail only drifts horizontally
    for p in state.trail.iter_mut() {
        p.pos.x += p.vel.x;
        p.life -= 0.08;
    }
    state.trail.retain(|p| p.life > 0.0);
}
