//! Sound effects
//!
//! The cores only say *which* sound to play; an `AudioSink` turns that into
//! noise. On the web, tones are generated with the Web Audio API, so no
//! sound files are needed.

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

use serde::{Deserialize, Serialize};

use crate::events::{GameEvent, PuzzleEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Coin collected
    Coin,
    /// Power-up collected
    PowerUp,
    /// Run ended
    Death,
    /// Squeezed past an obstacle
    NearMiss,
    /// Run started
    Start,
    /// Immunity jar collected
    Jar,
    /// Puzzle tile moved
    TileSlide,
    /// Puzzle solved
    Win,
}

impl SoundEffect {
    /// Sound for a scroller event, if it has one
    pub fn for_game_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::RunStarted => Some(SoundEffect::Start),
            GameEvent::Death { .. } => Some(SoundEffect::Death),
            GameEvent::CoinCollected { .. } => Some(SoundEffect::Coin),
            GameEvent::PowerUpCollected(_) => Some(SoundEffect::PowerUp),
            GameEvent::JarCollected => Some(SoundEffect::Jar),
            GameEvent::NearMiss => Some(SoundEffect::NearMiss),
            _ => None,
        }
    }

    /// Sound for a puzzle event, if it has one
    pub fn for_puzzle_event(event: &PuzzleEvent) -> Option<Self> {
        match event {
            PuzzleEvent::TileMoved { .. } | PuzzleEvent::ReplayStep { .. } => Some(SoundEffect::TileSlide),
            PuzzleEvent::Won { .. } => Some(SoundEffect::Win),
            _ => None,
        }
    }
}

/// Something that can play sound effects
///
/// Playback is fire-and-forget: sinks swallow their own failures.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Silent sink for headless runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Sink that remembers what it was asked to play
#[derive(Debug, Default, Clone)]
pub struct RecordingAudio {
    pub played: Vec<SoundEffect>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, effect: SoundEffect) {
        self.played.push(effect);
    }
}

impl<A: AudioSink + ?Sized> AudioSink for &mut A {
    fn play(&mut self, effect: SoundEffect) {
        (**self).play(effect);
    }
}

/// Gate a sink behind the sound setting
pub fn play_if_enabled<A: AudioSink + ?Sized>(sink: &mut A, enabled: bool, effect: SoundEffect) {
    if enabled {
        sink.play(effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroller::state::PowerUpKind;

    #[test]
    fn test_event_mapping() {
        assert_eq!(SoundEffect::for_game_event(&GameEvent::NearMiss), Some(SoundEffect::NearMiss));
        assert_eq!(
            SoundEffect::for_game_event(&GameEvent::PowerUpCollected(PowerUpKind::Magnet)),
            Some(SoundEffect::PowerUp)
        );
        assert_eq!(SoundEffect::for_game_event(&GameEvent::ImmunityEnded), None);
        assert_eq!(
            SoundEffect::for_puzzle_event(&PuzzleEvent::Won {
                moves: 3,
                elapsed_secs: 1.0
            }),
            Some(SoundEffect::Win)
        );
        assert_eq!(SoundEffect::for_puzzle_event(&PuzzleEvent::ReplayComplete), None);
    }

    #[test]
    fn test_muted_sink_stays_quiet() {
        let mut sink = RecordingAudio::default();
        play_if_enabled(&mut sink, false, SoundEffect::Coin);
        play_if_enabled(&mut sink, true, SoundEffect::Jar);
        assert_eq!(sink.played, vec![SoundEffect::Jar]);
    }
}
