//! Player physics integrator
//!
//! Pure functions of the current state. Frame time is normalized to a 60 Hz
//! reference so the feel is the same at any refresh rate.

use crate::consts::*;

/// Result of moving the player one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    InBounds(f32),
    /// Left [MIN_Y, MAX_Y]; carries the position clamped back for rendering
    OutOfBounds { clamped: f32 },
}

/// Frame-time scale factor relative to a 60 Hz frame, capped to absorb spikes
pub fn frame_scale(prev_ms: Option<f64>, now_ms: f64) -> f32 {
    match prev_ms {
        Some(prev) => (((now_ms - prev) / REFERENCE_FRAME_MS) as f32).clamp(0.0, MAX_FRAME_SCALE),
        None => 1.0,
    }
}

/// Gravity then friction, clamped to ±MAX_VELOCITY
#[inline]
pub fn integrate_velocity(velocity: f32, dt: f32) -> f32 {
    let v = (velocity + GRAVITY * dt) * FRICTION.powf(dt);
    v.clamp(-MAX_VELOCITY, MAX_VELOCITY)
}

/// Advance the player position by one step
#[inline]
pub fn integrate_position(y: f32, velocity: f32, dt: f32) -> Step {
    let new_y = y + velocity * dt;
    if (MIN_Y..=MAX_Y).contains(&new_y) {
        Step::InBounds(new_y)
    } else {
        Step::OutOfBounds {
            clamped: new_y.clamp(MIN_Y, MAX_Y),
        }
    }
}

/// Instantaneous impulse from a scroll/drag/swipe delta
///
/// Scrolling down (positive delta) pushes the player up.
pub fn scroll_impulse(velocity: f32, delta: f32, is_touch: bool) -> f32 {
    let force = if is_touch { TOUCH_FORCE } else { WHEEL_FORCE };
    (velocity - delta * SCROLL_SENSITIVITY * force).clamp(-MAX_VELOCITY, MAX_VELOCITY)
}

/// Danger added by one input, from how fast the player is scrolling
pub fn input_danger(delta: f32, elapsed_ms: f64, is_touch: bool) -> f32 {
    let elapsed = elapsed_ms.max(1.0) as f32;
    let speed = delta.abs() / elapsed;
    let limit = if is_touch { 30.0 } else { 5.0 };
    (speed / limit).min(1.0) * 0.3
}
