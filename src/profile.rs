//! Player profile: high score, coin bank, achievements, daily challenge, streak
//!
//! Everything here is read once at startup and written back best-effort
//! through the storage port. Broken or missing values fall back to zero,
//! empty lists, or the first challenge of the pool.

use serde::{Deserialize, Serialize};

use crate::day_index;
use crate::persistence::{self, Storage, keys};

const HOUR_MS: f64 = 60.0 * 60.0 * 1000.0;

/// Achievements the scroller can unlock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    FirstGame,
    Survive10,
    Survive30,
    Coins10,
    Coins50,
    NearMiss5,
    PowerUpAll,
}

impl Achievement {
    pub const ALL: [Achievement; 7] = [
        Achievement::FirstGame,
        Achievement::Survive10,
        Achievement::Survive30,
        Achievement::Coins10,
        Achievement::Coins50,
        Achievement::NearMiss5,
        Achievement::PowerUpAll,
    ];

    /// Stable id used in the persisted list
    pub fn id(&self) -> &'static str {
        match self {
            Achievement::FirstGame => "first_game",
            Achievement::Survive10 => "survive_10",
            Achievement::Survive30 => "survive_30",
            Achievement::Coins10 => "coins_10",
            Achievement::Coins50 => "coins_50",
            Achievement::NearMiss5 => "near_miss_5",
            Achievement::PowerUpAll => "powerup_all",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Achievement::FirstGame => "First Scroll",
            Achievement::Survive10 => "Survivor",
            Achievement::Survive30 => "Endurance",
            Achievement::Coins10 => "Collector",
            Achievement::Coins50 => "Rich",
            Achievement::NearMiss5 => "Daredevil",
            Achievement::PowerUpAll => "Power Player",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Achievement::FirstGame => "🎮",
            Achievement::Survive10 => "⏱️",
            Achievement::Survive30 => "🏆",
            Achievement::Coins10 => "💰",
            Achievement::Coins50 => "💎",
            Achievement::NearMiss5 => "😈",
            Achievement::PowerUpAll => "⚡",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }
}

/// What a finished run achieved, for achievement checks
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub survival_secs: f32,
    pub coins: u32,
    pub near_misses: u32,
    pub power_up_kinds_used: usize,
}

/// Daily challenge goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Survive,
    Collect,
}

/// Today's challenge (JSON layout matches the web build)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ChallengeKind,
    pub target: u32,
    pub progress: u32,
    pub unlocked: bool,
}

const CHALLENGE_POOL: [(&str, &str, ChallengeKind, u32); 10] = [
    ("survive_20", "Survive 20 seconds", ChallengeKind::Survive, 20),
    ("collect_30", "Collect 50 coins", ChallengeKind::Collect, 50),
    ("survive_35", "Survive 35 seconds", ChallengeKind::Survive, 35),
    ("collect_20", "Collect 20 coins", ChallengeKind::Collect, 20),
    ("survive_45", "Survive 45 seconds", ChallengeKind::Survive, 45),
    ("collect_10", "Collect 10 coins", ChallengeKind::Collect, 10),
    ("survive_50", "Survive 50 seconds", ChallengeKind::Survive, 50),
    ("collect_5", "Collect 5 coins", ChallengeKind::Collect, 5),
    ("survive_15", "Survive 15 seconds", ChallengeKind::Survive, 15),
    ("collect_32", "Collect 32 coins", ChallengeKind::Collect, 32),
];

impl DailyChallenge {
    /// Deterministic challenge for a day index
    pub fn for_day(day: i64) -> Self {
        let idx = day.rem_euclid(CHALLENGE_POOL.len() as i64) as usize;
        Self::from_pool(idx)
    }

    fn from_pool(idx: usize) -> Self {
        let (id, title, kind, target) = CHALLENGE_POOL[idx];
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            target,
            progress: 0,
            unlocked: false,
        }
    }

    fn set_progress(&mut self, progress: u32) {
        self.progress = progress.min(self.target);
        if self.progress >= self.target {
            self.unlocked = true;
        }
    }
}

/// Persistent player profile
#[derive(Debug, Clone)]
pub struct Profile {
    pub high_score: f32,
    pub total_coins: u64,
    /// Unlocked achievement ids, in unlock order
    pub achievements: Vec<String>,
    pub challenge_day: i64,
    pub challenge: DailyChallenge,
    pub streak: u32,
    pub last_played_ms: Option<f64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            high_score: 0.0,
            total_coins: 0,
            achievements: Vec::new(),
            challenge_day: 0,
            challenge: DailyChallenge::from_pool(0),
            streak: 0,
            last_played_ms: None,
        }
    }
}

/// Stored challenge for a day, created and written back if missing
fn load_challenge(storage: &mut dyn Storage, day: i64) -> DailyChallenge {
    let key = keys::challenge(day);
    match persistence::read_json::<DailyChallenge>(storage, &key) {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            let choice = DailyChallenge::for_day(day);
            persistence::save_json(storage, &key, &choice);
            choice
        }
        Err(e) => {
            log::warn!("Daily challenge unreadable ({e}), using default");
            DailyChallenge::from_pool(0)
        }
    }
}

impl Profile {
    /// Load the profile, creating today's challenge record if missing
    pub fn load(storage: &mut dyn Storage, now_ms: f64) -> Self {
        let high_score = persistence::load_parsed::<f32>(storage, keys::HIGH_SCORE)
            .filter(|s| s.is_finite())
            .unwrap_or(0.0);
        let total_coins = persistence::load_parsed::<u64>(storage, keys::TOTAL_COINS).unwrap_or(0);
        let achievements =
            persistence::load_json::<Vec<String>>(storage, keys::ACHIEVEMENTS).unwrap_or_default();

        let day = day_index(now_ms);
        let challenge = load_challenge(storage, day);

        let last_played_ms = persistence::load_parsed::<f64>(storage, keys::LAST_PLAYED);
        let stored_streak = persistence::load_parsed::<u32>(storage, keys::STREAK);
        let streak = match (last_played_ms, stored_streak) {
            (Some(last), Some(streak)) if (now_ms - last) / HOUR_MS < 24.0 => streak,
            _ => 0,
        };

        log::info!(
            "Profile loaded: high score {high_score:.1}, {total_coins} coins, {} achievements, challenge {}",
            achievements.len(),
            challenge.id
        );

        Self {
            high_score,
            total_coins,
            achievements,
            challenge_day: day,
            challenge,
            streak,
            last_played_ms,
        }
    }

    /// Compare a final score against the record; returns true on a new record
    pub fn record_score(&mut self, storage: &mut dyn Storage, final_score: f32) -> bool {
        if final_score <= self.high_score {
            return false;
        }
        self.high_score = final_score;
        persistence::save_raw(storage, keys::HIGH_SCORE, &format!("{final_score:.1}"));
        log::info!("New high score: {final_score:.1}");
        true
    }

    /// Bank collected coins
    pub fn add_coins(&mut self, storage: &mut dyn Storage, gained: u32) {
        self.total_coins += u64::from(gained);
        persistence::save_raw(storage, keys::TOTAL_COINS, &self.total_coins.to_string());
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.achievements.iter().any(|id| id == achievement.id())
    }

    /// Unlock an achievement; returns it only the first time
    pub fn unlock(&mut self, storage: &mut dyn Storage, achievement: Achievement) -> Option<Achievement> {
        if self.is_unlocked(achievement) {
            return None;
        }
        self.achievements.push(achievement.id().to_string());
        persistence::save_json(storage, keys::ACHIEVEMENTS, &self.achievements);
        log::info!("Achievement unlocked: {}", achievement.name());
        Some(achievement)
    }

    /// Unlock everything a finished run qualifies for
    pub fn evaluate_run(&mut self, storage: &mut dyn Storage, run: &RunSummary) -> Vec<Achievement> {
        let earned = [
            (Achievement::FirstGame, true),
            (Achievement::Survive10, run.survival_secs >= 10.0),
            (Achievement::Survive30, run.survival_secs >= 30.0),
            (Achievement::Coins10, run.coins >= 10),
            (Achievement::Coins50, self.total_coins >= 50),
            (Achievement::NearMiss5, run.near_misses >= 5),
            (Achievement::PowerUpAll, run.power_up_kinds_used >= 4),
        ];
        earned
            .into_iter()
            .filter(|(_, ok)| *ok)
            .filter_map(|(a, _)| self.unlock(storage, a))
            .collect()
    }

    /// Switch to the challenge of the day containing `now_ms` once midnight (UTC) has passed
    pub fn roll_challenge(&mut self, storage: &mut dyn Storage, now_ms: f64) {
        let day = day_index(now_ms);
        if day == self.challenge_day {
            return;
        }
        self.challenge = load_challenge(storage, day);
        self.challenge_day = day;
        log::info!("New day, challenge {}", self.challenge.id);
    }

    /// Record survival progress on a "survive" challenge
    pub fn record_survival(&mut self, storage: &mut dyn Storage, survival_secs: f32, now_ms: f64) {
        self.roll_challenge(storage, now_ms);
        if self.challenge.kind != ChallengeKind::Survive {
            return;
        }
        let progress = survival_secs.max(0.0).floor() as u32;
        self.challenge.set_progress(progress);
        self.save_challenge(storage);
    }

    /// Record one coin on a "collect" challenge
    pub fn record_coin(&mut self, storage: &mut dyn Storage, now_ms: f64) {
        self.roll_challenge(storage, now_ms);
        if self.challenge.kind != ChallengeKind::Collect {
            return;
        }
        let progress = self.challenge.progress + 1;
        self.challenge.set_progress(progress);
        self.save_challenge(storage);
    }

    fn save_challenge(&self, storage: &mut dyn Storage) {
        persistence::save_json(storage, &keys::challenge(self.challenge_day), &self.challenge);
    }

    /// Update the day streak after a run ends
    pub fn record_played(&mut self, storage: &mut dyn Storage, now_ms: f64) -> u32 {
        let stored = persistence::load_parsed::<u32>(storage, keys::STREAK).unwrap_or(0);
        self.streak = match self.last_played_ms {
            Some(last) => {
                let hours = (now_ms - last) / HOUR_MS;
                if hours < 24.0 {
                    stored
                } else if hours < 48.0 {
                    stored + 1
                } else {
                    1
                }
            }
            None => 1,
        };
        persistence::save_raw(storage, keys::STREAK, &self.streak.to_string());
        persistence::save_raw(storage, keys::LAST_PLAYED, &format!("{now_ms:.0}"));
        self.last_played_ms = Some(now_ms);
        self.streak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    const DAY_MS: f64 = 86_400_000.0;

    #[test]
    fn test_defaults_on_empty_storage() {
        let mut storage = MemoryStorage::new();
        let profile = Profile::load(&mut storage, 3.0 * DAY_MS);
        assert_eq!(profile.high_score, 0.0);
        assert_eq!(profile.total_coins, 0);
        assert!(profile.achievements.is_empty());
        assert_eq!(profile.challenge.id, CHALLENGE_POOL[3].0);
        // Today's challenge is written back
        assert!(storage.get(&keys::challenge(3)).unwrap().is_some());
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let mut storage = MemoryStorage::new();
        storage.set(keys::HIGH_SCORE, "abc").unwrap();
        storage.set(keys::ACHIEVEMENTS, "{").unwrap();
        storage.set(&keys::challenge(7), "garbage").unwrap();
        let profile = Profile::load(&mut storage, 7.5 * DAY_MS);
        assert_eq!(profile.high_score, 0.0);
        assert!(profile.achievements.is_empty());
        assert_eq!(profile.challenge.id, CHALLENGE_POOL[0].0);
    }

    #[test]
    fn test_record_score() {
        let mut storage = MemoryStorage::new();
        let mut profile = Profile::load(&mut storage, 0.0);
        assert!(profile.record_score(&mut storage, 12.34));
        assert!(!profile.record_score(&mut storage, 10.0));
        assert_eq!(storage.get(keys::HIGH_SCORE).unwrap().as_deref(), Some("12.3"));
    }

    #[test]
    fn test_unlock_once() {
        let mut storage = MemoryStorage::new();
        let mut profile = Profile::load(&mut storage, 0.0);
        assert_eq!(
            profile.unlock(&mut storage, Achievement::FirstGame),
            Some(Achievement::FirstGame)
        );
        assert_eq!(profile.unlock(&mut storage, Achievement::FirstGame), None);
        let reloaded = Profile::load(&mut storage, 0.0);
        assert!(reloaded.is_unlocked(Achievement::FirstGame));
    }

    #[test]
    fn test_evaluate_run() {
        let mut storage = MemoryStorage::new();
        let mut profile = Profile::load(&mut storage, 0.0);
        let run = RunSummary {
            survival_secs: 12.0,
            coins: 3,
            near_misses: 5,
            power_up_kinds_used: 2,
        };
        let unlocked = profile.evaluate_run(&mut storage, &run);
        assert_eq!(
            unlocked,
            vec![
                Achievement::FirstGame,
                Achievement::Survive10,
                Achievement::NearMiss5
            ]
        );
        assert!(profile.evaluate_run(&mut storage, &run).is_empty());
    }

    #[test]
    fn test_survive_challenge_progress() {
        let mut storage = MemoryStorage::new();
        // Day 0 is "survive_20"
        let mut profile = Profile::load(&mut storage, 0.0);
        profile.record_survival(&mut storage, 12.9, 0.0);
        assert_eq!(profile.challenge.progress, 12);
        profile.record_survival(&mut storage, 99.0, 0.0);
        assert_eq!(profile.challenge.progress, 20);
        assert!(profile.challenge.unlocked);
        // Coins don't count toward a survive challenge
        profile.record_coin(&mut storage, 0.0);
        assert_eq!(profile.challenge.progress, 20);
    }

    #[test]
    fn test_challenge_rolls_over_at_midnight() {
        let mut storage = MemoryStorage::new();
        // Loaded a minute before day 1 (day 0 is "survive_20")
        let mut profile = Profile::load(&mut storage, DAY_MS - 60_000.0);
        assert_eq!(profile.challenge_day, 0);

        // Day 1 is "collect_30"
        profile.record_survival(&mut storage, 12.0, DAY_MS + 13_000.0);
        assert_eq!(profile.challenge_day, 1);
        assert_eq!(profile.challenge.id, CHALLENGE_POOL[1].0);
        profile.record_coin(&mut storage, DAY_MS + 14_000.0);

        let day0: DailyChallenge = persistence::load_json(&storage, &keys::challenge(0)).unwrap();
        assert_eq!(day0.progress, 0);
        let day1: DailyChallenge = persistence::load_json(&storage, &keys::challenge(1)).unwrap();
        assert_eq!(day1.progress, 1);
    }

    #[test]
    fn test_collect_challenge_caps_at_target() {
        let mut storage = MemoryStorage::new();
        // Day 7 is "collect_5"
        let now = 7.0 * DAY_MS;
        let mut profile = Profile::load(&mut storage, now);
        for _ in 0..4 {
            profile.record_coin(&mut storage, now);
        }
        assert!(!profile.challenge.unlocked);
        profile.record_coin(&mut storage, now);
        profile.record_coin(&mut storage, now);
        assert_eq!(profile.challenge.progress, 5);
        assert!(profile.challenge.unlocked);
        // Survival doesn't count toward a collect challenge
        profile.record_survival(&mut storage, 60.0, now);
        assert_eq!(profile.challenge.progress, 5);

        let stored: DailyChallenge = persistence::load_json(&storage, &keys::challenge(7)).unwrap();
        assert_eq!(stored, profile.challenge);
    }

    #[test]
    fn test_streak() {
        let mut storage = MemoryStorage::new();
        let mut profile = Profile::load(&mut storage, 0.0);
        assert_eq!(profile.record_played(&mut storage, 0.0), 1);
        // Same day keeps the streak
        assert_eq!(profile.record_played(&mut storage, 2.0 * HOUR_MS), 1);
        // Next day extends it
        assert_eq!(profile.record_played(&mut storage, 30.0 * HOUR_MS), 2);
        // A long gap resets it
        assert_eq!(profile.record_played(&mut storage, 200.0 * HOUR_MS), 1);

        let reloaded = Profile::load(&mut storage, 201.0 * HOUR_MS);
        assert_eq!(reloaded.streak, 1);
        let stale = Profile::load(&mut storage, 300.0 * HOUR_MS);
        assert_eq!(stale.streak, 0);
    }

    #[test]
    fn test_achievement_ids_roundtrip() {
        for a in Achievement::ALL {
            assert_eq!(Achievement::from_id(a.id()), Some(a));
        }
    }
}
