//! Scroller session
//!
//! Owns one run plus everything that outlives it (profile, settings) and the
//! injected storage and audio ports. The host calls `frame` once per display
//! refresh and `decay_particles` on its own 30 ms interval.

use super::particles;
use super::state::{GamePhase, GameState};
use super::tick::{self, TickInput};
use crate::audio::{self, AudioSink, SoundEffect};
use crate::events::GameEvent;
use crate::persistence::Storage;
use crate::profile::{Profile, RunSummary};
use crate::settings::{DifficultyMode, Settings};

pub struct ScrollerGame<S: Storage, A: AudioSink> {
    pub state: GameState,
    pub profile: Profile,
    pub settings: Settings,
    storage: S,
    audio: A,
    /// Events processed by the session, waiting for the presentation layer
    outbox: Vec<GameEvent>,
}

impl<S: Storage, A: AudioSink> ScrollerGame<S, A> {
    /// Load profile and settings, and prepare a run in the Start phase
    pub fn new(mut storage: S, audio: A, seed: u64, now_ms: f64) -> Self {
        let settings = Settings::load(&storage);
        let profile = Profile::load(&mut storage, now_ms);
        Self {
            state: GameState::new(seed, settings.difficulty),
            profile,
            settings,
            storage,
            audio,
            outbox: Vec::new(),
        }
    }

    /// Advance one display frame
    pub fn frame(&mut self, now_ms: f64) {
        let input = TickInput {
            now_ms,
            high_score: self.profile.high_score,
        };
        tick::tick(&mut self.state, &input);
        self.process_events(now_ms);
    }

    /// Scroll/drag/swipe input from the host
    pub fn handle_scroll(&mut self, delta: f32, is_touch: bool, now_ms: f64) -> bool {
        let handled = tick::handle_scroll(&mut self.state, delta, is_touch, now_ms);
        self.process_events(now_ms);
        handled
    }

    /// Recompute HUD timers between frames
    pub fn refresh_timers(&mut self, now_ms: f64) {
        tick::refresh_timers(&mut self.state, now_ms);
        self.process_events(now_ms);
    }

    pub fn decay_particles(&mut self) {
        particles::decay_particles(&mut self.state);
    }

    /// Back to Start (only once the run is over)
    pub fn reset(&mut self) -> bool {
        if self.state.phase != GamePhase::Dead {
            return false;
        }
        self.state.reset();
        self.state.mode = self.settings.difficulty;
        log::info!("Run reset");
        true
    }

    /// Change the difficulty mode; takes effect from the next run
    pub fn set_difficulty(&mut self, mode: DifficultyMode) {
        self.settings.difficulty = mode;
        self.settings.save(&mut self.storage);
        if self.state.phase == GamePhase::Start {
            self.state.mode = mode;
        }
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.settings.toggle_sound(&mut self.storage)
    }

    /// Take notifications for the presentation layer
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Browsers only start audio after a user gesture; hosts resume it here
    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    /// Apply the side effects of fresh core events (persistence, sound)
    fn process_events(&mut self, now_ms: f64) {
        for event in self.state.drain_events() {
            if let Some(effect) = SoundEffect::for_game_event(&event) {
                audio::play_if_enabled(&mut self.audio, self.settings.sound_enabled, effect);
            }

            if let GameEvent::CoinCollected { gained, .. } = &event {
                self.profile.add_coins(&mut self.storage, *gained);
                self.profile.record_coin(&mut self.storage, now_ms);
            }
            let death = match &event {
                GameEvent::Death {
                    survival_secs,
                    final_score,
                    ..
                } => Some((*survival_secs, *final_score)),
                _ => None,
            };

            self.outbox.push(event);
            if let Some((survival_secs, final_score)) = death {
                self.finish_run(survival_secs, final_score, now_ms);
            }
        }
    }

    fn finish_run(&mut self, survival_secs: f32, final_score: f32, now_ms: f64) {
        self.profile.record_survival(&mut self.storage, survival_secs, now_ms);
        self.profile.record_score(&mut self.storage, final_score);
        let streak = self.profile.record_played(&mut self.storage, now_ms);

        let summary = RunSummary {
            survival_secs,
            coins: self.state.combo.coin_score,
            near_misses: self.state.near_misses,
            power_up_kinds_used: self.state.power_up_kinds_used(),
        };
        for achievement in self.profile.evaluate_run(&mut self.storage, &summary) {
            self.outbox.push(GameEvent::AchievementUnlocked(achievement));
        }
        log::info!("Streak: {streak} day(s)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::RecordingAudio;
    use crate::persistence::{MemoryStorage, keys};
    use crate::consts::PLAYER_X;
    use crate::profile::Achievement;
    use crate::scroller::state::{Coin, PowerUpKind};

    const NOW: f64 = 1_700_000_000_000.0;

    fn game() -> ScrollerGame<MemoryStorage, RecordingAudio> {
        ScrollerGame::new(MemoryStorage::new(), RecordingAudio::default(), 42, NOW)
    }

    /// Start a run and send the player off the bottom of the screen
    fn die_after(game: &mut ScrollerGame<MemoryStorage, RecordingAudio>, secs: f64) {
        game.handle_scroll(0.0, false, NOW);
        game.state.spawn.last_obstacle_ms = f64::MAX;
        game.state.spawn.last_jar_ms = f64::MAX;
        game.state.spawn.last_meteor_ms = f64::MAX;
        game.state.spawn.last_power_up_ms = f64::MAX;
        game.state.player.y = 94.9;
        game.state.player.velocity = 5.0;
        game.frame(NOW + secs * 1000.0);
    }

    #[test]
    fn test_death_persists_profile() {
        let mut game = game();
        die_after(&mut game, 12.0);
        assert_eq!(game.state.phase, GamePhase::Dead);

        let events = game.drain_events();
        assert!(matches!(events[0], GameEvent::RunStarted));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Death { new_record: true, .. })));
        assert!(events.contains(&GameEvent::AchievementUnlocked(Achievement::FirstGame)));
        assert!(events.contains(&GameEvent::AchievementUnlocked(Achievement::Survive10)));

        assert_eq!(game.storage().get(keys::HIGH_SCORE).unwrap().as_deref(), Some("12.0"));
        assert_eq!(game.storage().get(keys::STREAK).unwrap().as_deref(), Some("1"));
        assert!((game.profile.high_score - 12.0).abs() < 1e-3);
    }

    #[test]
    fn test_sounds_follow_setting() {
        let mut game = game();
        die_after(&mut game, 1.0);
        assert_eq!(game.audio.played, vec![SoundEffect::Start, SoundEffect::Death]);

        let mut muted = game_with_sound_off();
        die_after(&mut muted, 1.0);
        assert!(muted.audio.played.is_empty());
    }

    fn game_with_sound_off() -> ScrollerGame<MemoryStorage, RecordingAudio> {
        let mut storage = MemoryStorage::new();
        storage.set(keys::SOUND_ENABLED, "false").unwrap();
        ScrollerGame::new(storage, RecordingAudio::default(), 42, NOW)
    }

    #[test]
    fn test_reset_only_after_death() {
        let mut game = game();
        assert!(!game.reset());
        die_after(&mut game, 2.0);
        assert!(game.reset());
        assert_eq!(game.state.phase, GamePhase::Start);
        assert!(game.state.outcome.is_none());
    }

    #[test]
    fn test_difficulty_applies_to_next_run() {
        let mut game = game();
        game.set_difficulty(DifficultyMode::Hard);
        assert_eq!(game.state.mode, DifficultyMode::Hard);

        game.handle_scroll(0.0, false, NOW);
        game.set_difficulty(DifficultyMode::Easy);
        assert_eq!(game.state.mode, DifficultyMode::Hard);
        assert_eq!(Settings::load(game.storage()).difficulty, DifficultyMode::Easy);
    }

    #[test]
    fn test_coins_bank_and_fill_collect_challenge() {
        // Day 5 is "collect_10"
        let now = 5.0 * 86_400_000.0 + 1_000.0;
        let mut game = ScrollerGame::new(MemoryStorage::new(), RecordingAudio::default(), 9, now);
        assert_eq!(game.profile.challenge.id, "collect_10");

        game.handle_scroll(0.0, false, now);
        game.state.spawn.last_obstacle_ms = f64::MAX;
        game.state.spawn.last_jar_ms = f64::MAX;
        game.state.spawn.last_meteor_ms = f64::MAX;
        game.state.spawn.last_power_up_ms = f64::MAX;
        game.state.effects.activate(PowerUpKind::Double, now);
        game.state.score_multiplier = 2.0;

        let mut t = now;
        for pickup in 1..=10u32 {
            let id = game.state.next_entity_id();
            let y = game.state.player.y;
            game.state.coins.push(Coin {
                id,
                x: PLAYER_X,
                y,
                collected: false,
            });
            t += 16.67;
            game.frame(t);
            assert_eq!(game.profile.total_coins, u64::from(2 * pickup));
            assert_eq!(game.profile.challenge.progress, pickup);
            assert_eq!(game.profile.challenge.unlocked, pickup == 10);
        }

        assert_eq!(game.state.phase, GamePhase::Playing);
        assert_eq!(game.state.combo.coin_score, 20);
        assert_eq!(game.storage().get(keys::TOTAL_COINS).unwrap().as_deref(), Some("20"));
        let stored = game.storage().get(&keys::challenge(5)).unwrap().unwrap();
        assert!(stored.contains("\"progress\":10"));
        assert!(stored.contains("\"unlocked\":true"));
    }

    #[test]
    fn test_lower_score_keeps_record() {
        let mut game = game();
        die_after(&mut game, 20.0);
        game.reset();
        die_after(&mut game, 5.0);
        assert!((game.profile.high_score - 20.0).abs() < 1e-3);
        let outcome = game.state.outcome.clone().unwrap();
        assert!(!outcome.new_record);
    }
}
