//! Sound effects
//!
//! The simulation only raises events; whether a sound is actually heard is
//! decided here by [`AudioGate`]: nothing plays before a user gesture has
//! unlocked audio, nothing plays while muted, and all effects share one
//! cooldown clock so rapid hits do not stack.
//!
//! On the web the effects are synthesized with the Web Audio API, so no
//! sound files are shipped.

use crate::consts::*;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball hits a paddle
    PaddleHit,
    /// Ball hits a wall
    WallHit,
    /// Last life lost
    GameOver,
}

impl SoundEffect {
    /// Minimum gap since the previous accepted sound (milliseconds)
    pub fn cooldown_ms(self) -> f64 {
        match self {
            SoundEffect::PaddleHit => PADDLE_HIT_COOLDOWN_MS,
            SoundEffect::WallHit => WALL_HIT_COOLDOWN_MS,
            SoundEffect::GameOver => GAME_OVER_COOLDOWN_MS,
        }
    }
}

/// Sound playback device
pub trait SoundPlayer {
    /// Play `effect` unless muted, still locked, or within `cooldown_ms` of the last sound
    fn play(&mut self, effect: SoundEffect, cooldown_ms: f64);
}

/// Unlock, mute and cooldown bookkeeping shared by every backend
#[derive(Debug, Clone, Default)]
pub struct AudioGate {
    unlocked: bool,
    muted: bool,
    last_played_ms: Option<f64>,
}

impl AudioGate {
    pub fn new(muted: bool) -> Self {
        Self {
            muted,
            ..Self::default()
        }
    }

    /// Record the first user gesture. There is no way back to locked.
    pub fn unlock(&mut self) -> bool {
        let first = !self.unlocked;
        self.unlocked = true;
        first
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Flip mute and return the new state
    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Decide whether a sound may start at `now_ms`; records it if so
    pub fn admit(&mut self, cooldown_ms: f64, now_ms: f64) -> bool {
        if !self.unlocked || self.muted {
            return false;
        }
        if let Some(last) = self.last_played_ms {
            if now_ms - last < cooldown_ms {
                return false;
            }
        }
        self.last_played_ms = Some(now_ms);
        true
    }
}

/// Sound player for hosts without an audio device
///
/// Time is advanced by the host (one frame at a time); accepted effects are
/// logged and counted.
#[derive(Debug, Clone, Default)]
pub struct HeadlessAudio {
    pub gate: AudioGate,
    now_ms: f64,
    pub played: Vec<SoundEffect>,
}

impl HeadlessAudio {
    /// Already unlocked: there is no gesture to wait for
    pub fn new(muted: bool) -> Self {
        let mut gate = AudioGate::new(muted);
        gate.unlock();
        Self {
            gate,
            now_ms: 0.0,
            played: Vec::new(),
        }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }
}

impl SoundPlayer for HeadlessAudio {
    fn play(&mut self, effect: SoundEffect, cooldown_ms: f64) {
        if self.gate.admit(cooldown_ms, self.now_ms) {
            log::debug!("Sound: {:?} at {:.0}ms", effect, self.now_ms);
            self.played.push(effect);
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioGate, SoundEffect, SoundPlayer};

    /// Web Audio synthesizer
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        pub gate: AudioGate,
        master_volume: f32,
    }

    impl AudioManager {
        pub fn new(muted: bool, master_volume: f32) -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                gate: AudioGate::new(muted),
                master_volume: master_volume.clamp(0.0, 1.0),
            }
        }

        /// First user gesture: resume the context and open the gate
        pub fn unlock(&mut self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
            if self.gate.unlock() {
                log::info!("Audio unlocked");
            }
        }

        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        fn now_ms() -> f64 {
            web_sys::window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
                .unwrap_or(0.0)
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Paddle hit - solid thump
        fn play_paddle_hit(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 150.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.6, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.frequency().set_value_at_time(150.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(60.0, t + 0.1)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Wall hit - higher ping
        fn play_wall_hit(ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = Self::create_osc(ctx, 400.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Game over - sad descending
        fn play_game_over(ctx: &AudioContext, vol: f32) {
            for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
                let delay = i as f64 * 0.2;
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.4).ok();
                }
            }
        }
    }

    impl SoundPlayer for AudioManager {
        fn play(&mut self, effect: SoundEffect, cooldown_ms: f64) {
            if self.master_volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if !self.gate.admit(cooldown_ms, Self::now_ms()) {
                log::debug!("Sound suppressed: {:?}", effect);
                return;
            }

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let vol = self.master_volume;
            match effect {
                SoundEffect::PaddleHit => Self::play_paddle_hit(ctx, vol),
                SoundEffect::WallHit => Self::play_wall_hit(ctx, vol),
                SoundEffect::GameOver => Self::play_game_over(ctx, vol),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locked_gate_plays_nothing() {
        let mut gate = AudioGate::new(false);
        assert!(!gate.admit(40.0, 1000.0));
        assert!(gate.unlock());
        assert!(!gate.unlock());
        assert!(gate.admit(40.0, 1000.0));
    }

    #[test]
    fn test_muted_gate_plays_nothing() {
        let mut gate = AudioGate::new(true);
        gate.unlock();
        assert!(!gate.admit(40.0, 0.0));
        assert!(!gate.toggle_muted());
        assert!(gate.admit(40.0, 0.0));
    }

    #[test]
    fn test_cooldown_is_shared_across_effects() {
        let mut audio = HeadlessAudio::new(false);
        audio.play(SoundEffect::WallHit, SoundEffect::WallHit.cooldown_ms());
        audio.advance(50.0);
        // 50ms later: past the wall cooldown but inside the paddle one
        audio.play(SoundEffect::PaddleHit, SoundEffect::PaddleHit.cooldown_ms());
        audio.advance(20.0);
        audio.play(SoundEffect::PaddleHit, SoundEffect::PaddleHit.cooldown_ms());
        assert_eq!(audio.played, vec![SoundEffect::WallHit, SoundEffect::PaddleHit]);
    }

    #[test]
    fn test_rejected_sound_does_not_reset_clock() {
        let mut gate = AudioGate::new(false);
        gate.unlock();
        assert!(gate.admit(60.0, 0.0));
        assert!(!gate.admit(60.0, 30.0));
        assert!(gate.admit(60.0, 60.0));
    }
}
