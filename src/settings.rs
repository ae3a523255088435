//! Game settings and preferences
//!
//! Persisted separately from run records through the storage port.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage, keys};

/// User-selected difficulty mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyMode {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyMode::Easy => "Easy",
            DifficultyMode::Medium => "Medium",
            DifficultyMode::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(DifficultyMode::Easy),
            "medium" | "med" => Some(DifficultyMode::Medium),
            "hard" => Some(DifficultyMode::Hard),
            _ => None,
        }
    }

    /// Scales entity speed up and spawn interval down
    pub fn factor(&self) -> f32 {
        match self {
            DifficultyMode::Easy => 0.8,
            DifficultyMode::Medium => 1.0,
            DifficultyMode::Hard => 1.4,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Scroller difficulty mode
    pub difficulty: DifficultyMode,
    /// Sound effects on/off
    pub sound_enabled: bool,
    /// Puzzle edge length (3 or 4 in the shipped variants)
    #[serde(default = "default_puzzle_size")]
    pub puzzle_size: usize,
}

fn default_puzzle_size() -> usize {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyMode::Medium,
            sound_enabled: true,
            puzzle_size: default_puzzle_size(),
        }
    }
}

impl Settings {
    /// Load settings (falls back to defaults on missing/malformed data)
    pub fn load(storage: &dyn Storage) -> Self {
        let mut settings: Settings =
            persistence::load_json(storage, keys::SETTINGS).unwrap_or_else(|| {
                log::info!("Using default settings");
                Self::default()
            });

        // The sound flag has its own key, shared with the puzzle build
        if let Some(enabled) = persistence::load_parsed::<bool>(storage, keys::SOUND_ENABLED) {
            settings.sound_enabled = enabled;
        }
        settings.puzzle_size = settings.puzzle_size.clamp(2, 8);
        settings
    }

    /// Save settings
    pub fn save(&self, storage: &mut dyn Storage) {
        persistence::save_json(storage, keys::SETTINGS, self);
        persistence::save_raw(
            storage,
            keys::SOUND_ENABLED,
            if self.sound_enabled { "true" } else { "false" },
        );
        log::info!("Settings saved");
    }

    /// Flip the sound flag and persist it
    pub fn toggle_sound(&mut self, storage: &mut dyn Storage) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.save(storage);
        self.sound_enabled
    }
}
