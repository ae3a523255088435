//! Property-based tests for the scroller core.
//!
//! Random frame timings and scroll inputs, checked against the physics
//! bounds, the single-death rule and seeded determinism.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use scrolly_arcade::consts::{MAX_VELOCITY, MAX_Y, MIN_Y};
use scrolly_arcade::scroller::physics::{self, Step};
use scrolly_arcade::scroller::{GamePhase, GameState, TickInput, handle_scroll, tick};
use scrolly_arcade::{DifficultyMode, GameEvent};

/// One host frame: time since the previous frame and an optional scroll delta
fn frame_strategy() -> impl Strategy<Value = (u16, Option<i16>)> {
    (1u16..50, prop::option::weighted(0.2, -120i16..120))
}

/// Drive a run from its first input through the given frames
fn play(seed: u64, mode: DifficultyMode, frames: &[(u16, Option<i16>)]) -> (GameState, Vec<GameEvent>) {
    let mut state = GameState::new(seed, mode);
    let mut now = 1_000.0;
    handle_scroll(&mut state, 1.0, false, now);

    let mut events = state.drain_events();
    for &(gap, scroll) in frames {
        now += gap as f64;
        if let Some(delta) = scroll {
            handle_scroll(&mut state, delta as f32, delta % 2 == 0, now);
        }
        tick(&mut state, &TickInput { now_ms: now, high_score: 30.0 });
        events.extend(state.drain_events());
    }
    (state, events)
}

fn mode_strategy() -> impl Strategy<Value = DifficultyMode> {
    prop_oneof![
        Just(DifficultyMode::Easy),
        Just(DifficultyMode::Medium),
        Just(DifficultyMode::Hard),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Velocity stays clamped and any step outside the playfield is reported and clamped.
    #[test]
    fn prop_physics_step_bounded(
        y in MIN_Y..=MAX_Y,
        velocity in -MAX_VELOCITY..=MAX_VELOCITY,
        dt in 0.0f32..=2.0,
    ) {
        let v = physics::integrate_velocity(velocity, dt);
        prop_assert!(v.abs() <= MAX_VELOCITY);

        match physics::integrate_position(y, v, dt) {
            Step::InBounds(next) => prop_assert!((MIN_Y..=MAX_Y).contains(&next)),
            Step::OutOfBounds { clamped } => {
                let raw = y + v * dt;
                prop_assert!(!(MIN_Y..=MAX_Y).contains(&raw));
                prop_assert!((MIN_Y..=MAX_Y).contains(&clamped));
            }
        }
    }

    /// The player never leaves the playfield and a run dies at most once.
    #[test]
    fn prop_run_stays_in_bounds(
        seed in any::<u64>(),
        mode in mode_strategy(),
        frames in prop::collection::vec(frame_strategy(), 1..400),
    ) {
        let (state, events) = play(seed, mode, &frames);

        prop_assert!((MIN_Y..=MAX_Y).contains(&state.player.y));
        prop_assert!(state.player.velocity.abs() <= MAX_VELOCITY);
        prop_assert!((0.0..=1.0).contains(&state.player.danger));

        let deaths = events.iter().filter(|e| matches!(e, GameEvent::Death { .. })).count();
        prop_assert!(deaths <= 1);
        prop_assert_eq!(deaths == 1, state.phase == GamePhase::Dead);
        prop_assert_eq!(state.outcome.is_some(), state.phase == GamePhase::Dead);
    }

    /// Same seed and inputs give the same run.
    #[test]
    fn prop_seeded_runs_are_deterministic(
        seed in any::<u64>(),
        frames in prop::collection::vec(frame_strategy(), 1..200),
    ) {
        let (a, events_a) = play(seed, DifficultyMode::Medium, &frames);
        let (b, events_b) = play(seed, DifficultyMode::Medium, &frames);

        prop_assert_eq!(a.phase, b.phase);
        prop_assert_eq!(a.player.y, b.player.y);
        prop_assert_eq!(a.obstacles.len(), b.obstacles.len());
        prop_assert_eq!(a.combo.coin_score, b.combo.coin_score);
        prop_assert_eq!(events_a, events_b);
    }
}
