//! Timed effects: power-ups and jar immunity
//!
//! All timers are absolute deadlines checked against the wall clock, so
//! they stay accurate under variable frame rates.

use serde::{Deserialize, Serialize};

use super::state::PowerUpKind;
use crate::consts::*;

/// Jar immunity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Immunity {
    pub started_at_ms: Option<f64>,
    /// Seconds left, recomputed from `started_at_ms` every update
    pub remaining_secs: f32,
}

impl Immunity {
    pub fn is_active(&self) -> bool {
        self.started_at_ms.is_some()
    }

    /// Start (or restart) the immunity window
    pub fn activate(&mut self, now_ms: f64) {
        self.started_at_ms = Some(now_ms);
        self.remaining_secs = (IMMUNITY_DURATION_MS / 1000.0) as f32;
    }

    /// Recompute remaining time; returns true when immunity just ended
    pub fn update(&mut self, now_ms: f64) -> bool {
        let Some(start) = self.started_at_ms else {
            return false;
        };
        let remaining = (IMMUNITY_DURATION_MS - (now_ms - start)).max(0.0) / 1000.0;
        self.remaining_secs = remaining as f32;
        if remaining <= 0.0 {
            self.started_at_ms = None;
            self.remaining_secs = 0.0;
            return true;
        }
        false
    }
}

/// Active power-up deadlines, indexed by `PowerUpKind::index`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUpTimers {
    deadlines: [Option<f64>; 4],
}

impl PowerUpTimers {
    pub fn activate(&mut self, kind: PowerUpKind, now_ms: f64) {
        self.deadlines[kind.index()] = Some(now_ms + POWER_UP_DURATION_MS);
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.deadlines[kind.index()].is_some()
    }

    /// Seconds left on a power-up (0 when inactive), for the HUD
    pub fn remaining_secs(&self, kind: PowerUpKind, now_ms: f64) -> f32 {
        self.deadlines[kind.index()]
            .map(|deadline| ((deadline - now_ms).max(0.0) / 1000.0) as f32)
            .unwrap_or(0.0)
    }

    /// Clear every power-up whose deadline passed; returns the expired kinds
    pub fn expire(&mut self, now_ms: f64) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in PowerUpKind::ALL {
            let slot = &mut self.deadlines[kind.index()];
            if slot.is_some_and(|deadline| now_ms >= deadline) {
                *slot = None;
                expired.push(kind);
            }
        }
        expired
    }
}
