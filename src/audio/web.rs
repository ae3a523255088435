//! Web Audio sink
//!
//! Each effect is a short oscillator sweep with an exponential fade.

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use super::{AudioSink, SoundEffect};

/// Master gain applied to every effect
const MASTER_VOLUME: f32 = 1.0;

/// Oscillator-based sound player
pub struct WebAudio {
    ctx: Option<AudioContext>,
}

impl Default for WebAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl WebAudio {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx }
    }

    /// Resume the context (browsers require a user gesture first)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    fn create_osc(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Exponential pitch sweep `from -> to` over `ramp` seconds, fading out by `len`
    #[allow(clippy::too_many_arguments)]
    fn sweep(&self, ctx: &AudioContext, osc_type: OscillatorType, from: f32, to: f32, ramp: f64, level: f32, len: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, from, osc_type) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(from, t).ok();
        osc.frequency().exponential_ramp_to_value_at_time(to, t + ramp).ok();
        gain.gain().set_value_at_time(MASTER_VOLUME * level, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, t + len).ok();

        osc.start().ok();
        osc.stop_with_when(t + len).ok();
    }

    /// Start - three stepped notes on one oscillator
    fn play_start(&self, ctx: &AudioContext) {
        let Some((osc, gain)) = self.create_osc(ctx, 440.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        for (i, freq) in [440.0, 550.0, 660.0].iter().enumerate() {
            osc.frequency().set_value_at_time(*freq, t + i as f64 * 0.1).ok();
        }
        gain.gain().set_value_at_time(MASTER_VOLUME * 0.25, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.4).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.4).ok();
    }

    /// Win - rising arpeggio
    fn play_win(&self, ctx: &AudioContext) {
        for (i, freq) in [523.0, 659.0, 784.0, 1047.0].iter().enumerate() {
            let delay = i as f64 * 0.1;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(MASTER_VOLUME * 0.3, t).ok();
                gain.gain().exponential_ramp_to_value_at_time(0.01, t + 0.35).ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }
}

impl AudioSink for WebAudio {
    fn play(&mut self, effect: SoundEffect) {
        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        use OscillatorType::{Sawtooth, Sine};
        match effect {
            SoundEffect::Coin => self.sweep(ctx, Sine, 880.0, 1760.0, 0.1, 0.25, 0.15),
            SoundEffect::PowerUp => self.sweep(ctx, Sine, 440.0, 880.0, 0.2, 0.35, 0.3),
            SoundEffect::Death => self.sweep(ctx, Sawtooth, 200.0, 50.0, 0.5, 0.4, 0.5),
            SoundEffect::NearMiss => self.sweep(ctx, Sine, 600.0, 800.0, 0.08, 0.18, 0.1),
            SoundEffect::Jar => self.sweep(ctx, Sine, 330.0, 660.0, 0.2, 0.3, 0.3),
            SoundEffect::TileSlide => self.sweep(ctx, Sine, 300.0, 180.0, 0.06, 0.2, 0.08),
            SoundEffect::Start => self.play_start(ctx),
            SoundEffect::Win => self.play_win(ctx),
        }
    }
}
