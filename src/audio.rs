//! Audio cues using the Web Audio API
//!
//! Procedurally generated beeps - no external files needed! Each simulation
//! event maps to a short tone sequence; native builds have no audio output.

use crate::sim::GameEvent;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Triangle,
    Sawtooth,
}

/// A single beep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Frequency (Hz)
    pub freq: f32,
    /// Length (s)
    pub duration: f32,
    pub wave: Waveform,
    /// Peak gain
    pub volume: f32,
    /// Offset from the cue start (s)
    pub delay: f32,
}

const fn tone(freq: f32, duration: f32, wave: Waveform, volume: f32) -> Tone {
    Tone {
        freq,
        duration,
        wave,
        volume,
        delay: 0.0,
    }
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Run started
    Start,
    /// Obstacle dodged; pitch rises with the combo
    Dodge { combo: u32 },
    /// Coin collected
    Coin,
    /// Shield power-up collected
    ShieldPickup,
    /// Magnet power-up collected
    MagnetPickup,
    /// Shield absorbed a hit
    ShieldBlock,
    /// Boss wave incoming
    BossWave,
    /// Dash activated
    Ability,
    /// Daily challenge reward
    Challenge,
    /// Run over
    GameOver,
}

impl SoundEffect {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::RunStarted => Some(SoundEffect::Start),
            GameEvent::Dodge { combo } => Some(SoundEffect::Dodge { combo: *combo }),
            GameEvent::CoinCollected { .. } => Some(SoundEffect::Coin),
            GameEvent::ShieldGained { .. } => Some(SoundEffect::ShieldPickup),
            GameEvent::MagnetActivated => Some(SoundEffect::MagnetPickup),
            GameEvent::ShieldBlocked { .. } => Some(SoundEffect::ShieldBlock),
            GameEvent::BossWaveStarted { .. } => Some(SoundEffect::BossWave),
            GameEvent::AbilityUsed => Some(SoundEffect::Ability),
            GameEvent::ChallengeComplete { .. } => Some(SoundEffect::Challenge),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            GameEvent::BossWaveEnded { .. } | GameEvent::Paused | GameEvent::Resumed => None,
        }
    }

    /// Tone sequence for this cue
    pub fn tones(&self) -> Vec<Tone> {
        use Waveform::*;
        match *self {
            SoundEffect::Start => vec![tone(500.0, 0.06, Triangle, 0.02)],
            SoundEffect::Dodge { combo } => {
                vec![tone(710.0 + combo as f32 * 35.0, 0.04, Square, 0.02)]
            }
            SoundEffect::Coin => vec![tone(900.0, 0.03, Triangle, 0.02)],
            SoundEffect::ShieldPickup => vec![tone(520.0, 0.06, Square, 0.03)],
            SoundEffect::MagnetPickup => vec![tone(620.0, 0.06, Square, 0.03)],
            SoundEffect::ShieldBlock => vec![tone(420.0, 0.05, Triangle, 0.03)],
            SoundEffect::BossWave => vec![
                tone(220.0, 0.08, Sawtooth, 0.04),
                tone(260.0, 0.08, Sawtooth, 0.04),
            ],
            SoundEffect::Ability => vec![
                tone(680.0, 0.06, Triangle, 0.03),
                tone(860.0, 0.05, Triangle, 0.02),
            ],
            SoundEffect::Challenge => vec![
                tone(820.0, 0.08, Triangle, 0.04),
                tone(960.0, 0.08, Triangle, 0.03),
            ],
            SoundEffect::GameOver => vec![
                tone(180.0, 0.15, Sawtooth, 0.04),
                Tone {
                    delay: 0.06,
                    ..tone(120.0, 0.22, Sawtooth, 0.04)
                },
            ],
        }
    }

    /// Vibration length (ms) on devices that support it
    pub fn haptic_ms(&self) -> Option<u32> {
        match self {
            SoundEffect::ShieldBlock => Some(22),
            SoundEffect::ShieldPickup | SoundEffect::MagnetPickup => Some(14),
            SoundEffect::BossWave => Some(26),
            SoundEffect::GameOver => Some(50),
            _ => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(not(target_arch = "wasm32"))]
pub use native::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, Tone, Waveform};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self { ctx, muted: false }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Mute/unmute all audio
        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        pub fn is_muted(&self) -> bool {
            self.muted
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            if self.muted {
                return;
            }
            if let Some(ms) = effect.haptic_ms() {
                vibrate(ms);
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for t in effect.tones() {
                beep(ctx, &t);
            }
        }
    }

    fn vibrate(ms: u32) {
        if let Some(window) = web_sys::window() {
            let _ = window.navigator().vibrate_with_duration(ms);
        }
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

    /// One tone with an exponential decay envelope
    fn beep(ctx: &AudioContext, tone: &Tone) {
        let osc_type = match tone.wave {
            Waveform::Square => OscillatorType::Square,
            Waveform::Triangle => OscillatorType::Triangle,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
        };
        let Some((osc, gain)) = create_osc(ctx, tone.freq, osc_type) else {
            return;
        };
        let t = ctx.current_time() + f64::from(tone.delay);
        let end = t + f64::from(tone.duration);

        gain.gain().set_value_at_time(tone.volume, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.0001, end)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(end).ok();
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::SoundEffect;

    /// Silent stand-in; cues are only logged
    #[derive(Debug, Default)]
    pub struct AudioManager {
        muted: bool,
    }

    impl AudioManager {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn resume(&self) {}

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        pub fn is_muted(&self) -> bool {
            self.muted
        }

        pub fn play(&self, effect: SoundEffect) {
            if !self.muted {
                log::trace!("audio cue {:?}", effect);
            }
        }
    }
}
