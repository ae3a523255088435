//! Collision and pickup detection
//!
//! Pure predicates over the player's vertical position and the committed
//! entity lists. Checks are not swept: at extreme velocity the player can
//! tunnel through a thin obstacle, which is accepted.

use super::state::{Coin, Jar, Meteor, Obstacle, ObstacleShape, PowerUp};
use crate::consts::*;
use crate::distance;

/// Does the player's box overlap this obstacle horizontally?
#[inline]
fn overlaps_horizontally(obstacle: &Obstacle) -> bool {
    let player_left = PLAYER_X;
    let player_right = PLAYER_X + PLAYER_WIDTH;
    let obs_left = obstacle.x - OBSTACLE_HALF_WIDTH;
    let obs_right = obstacle.x + OBSTACLE_HALF_WIDTH;
    player_right > obs_left && player_left < obs_right
}

/// Does the player at `y` hit a single obstacle?
pub fn hits_obstacle(y: f32, obstacle: &Obstacle) -> bool {
    if !overlaps_horizontally(obstacle) {
        return false;
    }
    let top = y - PLAYER_HALF_HEIGHT;
    let bottom = y + PLAYER_HALF_HEIGHT;
    let (safe_top, safe_bottom) = obstacle.shape.safe_band();
    top < safe_top || bottom > safe_bottom
}

/// Obstacle collision against the whole list; immunity always misses
pub fn check_obstacles(y: f32, obstacles: &[Obstacle], immune: bool) -> bool {
    !immune && obstacles.iter().any(|o| hits_obstacle(y, o))
}

/// Circle test between the player and a meteor
pub fn hits_meteor(y: f32, meteor: &Meteor) -> bool {
    let dist = distance(meteor.pos.x, meteor.pos.y, PLAYER_X, y);
    dist < meteor.size / 2.0 + PLAYER_RADIUS
}

/// Meteor collision against the whole list; immunity always misses
pub fn check_meteors(y: f32, meteors: &[Meteor], immune: bool) -> bool {
    !immune && meteors.iter().any(|m| hits_meteor(y, m))
}

pub fn reaches_coin(y: f32, coin: &Coin) -> bool {
    distance(PLAYER_X, y, coin.x, coin.y) < COIN_PICKUP_RADIUS
}

pub fn reaches_power_up(y: f32, power_up: &PowerUp) -> bool {
    distance(PLAYER_X, y, power_up.x, power_up.y) < POWER_UP_PICKUP_RADIUS
}

pub fn reaches_jar(y: f32, jar: &Jar) -> bool {
    (jar.x - PLAYER_X).abs() < JAR_PICKUP_DX && (jar.y - y).abs() < JAR_PICKUP_DY
}

/// Player squeezed past an obstacle within `NEAR_MISS_MARGIN` of an edge
pub fn is_near_miss(y: f32, shape: &ObstacleShape) -> bool {
    let (safe_top, safe_bottom) = shape.safe_band();
    let top_clearance = (y - PLAYER_HALF_HEIGHT) - safe_top;
    let bottom_clearance = safe_bottom - (y + PLAYER_HALF_HEIGHT);
    top_clearance.min(bottom_clearance) < NEAR_MISS_MARGIN
}

/// Did the obstacle's trailing edge cross the player's leading edge this tick?
#[inline]
pub fn passed_player(old_x: f32, new_x: f32) -> bool {
    old_x + OBSTACLE_HALF_WIDTH >= PLAYER_X && new_x + OBSTACLE_HALF_WIDTH < PLAYER_X
}
