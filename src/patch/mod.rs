//! Patch: the complete set of sound parameters for one channel.
//!
//! A patch is a plain value. Channels hold one and push copies of its fields
//! into every voice; nothing in here carries runtime DSP state.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod param;

pub use crate::dsp::{glide::GlideMode, lfo::LfoWaveform, noise::NoiseType, oscillator::Waveform};
pub use param::ParamId;

use crate::NUM_OSCILLATORS;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub name: String,
    pub oscillators: Vec<OscillatorParams>,
    pub noise: NoiseParams,
    pub filter: FilterParams,
    #[cfg_attr(feature = "serde", serde(rename = "filter_adsr"))]
    pub filter_env: AdsrParams,
    #[cfg_attr(feature = "serde", serde(rename = "amp_adsr"))]
    pub amp_env: AdsrParams,
    pub lfo: LfoParams,
    pub glide: GlideParams,
    pub master_volume: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscillatorParams {
    pub waveform: Waveform,
    pub octave: i32,
    pub semitone: i32,
    /// Fine tuning in cents.
    pub detune: f32,
    pub level: f32,
    /// Square duty cycle, used only by [`Waveform::Square`].
    pub pulse_width: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParams {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub noise_type: NoiseType,
    pub level: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Base cutoff in Hz.
    pub cutoff: f32,
    /// 0..1, self-oscillation near 1.
    pub resonance: f32,
    /// Filter envelope sweep depth in semitones.
    pub env_amount: f32,
    /// 0..1, how far cutoff follows the played note.
    pub key_tracking: f32,
}

/// Stage times in seconds, sustain as a level.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoParams {
    pub waveform: LfoWaveform,
    /// Hz.
    pub rate: f32,
    pub depth: f32,
    pub destination: LfoDestination,
    pub key_sync: bool,
}

/// What the LFO modulates.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoDestination {
    #[default]
    Filter,
    Pitch,
    Amp,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlideParams {
    /// Seconds.
    pub time: f32,
    pub mode: GlideMode,
}

impl Default for OscillatorParams {
    fn default() -> Self {
        Self {
            waveform: Waveform::Saw,
            octave: 0,
            semitone: 0,
            detune: 0.0,
            level: 0.0,
            pulse_width: 0.5,
        }
    }
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            noise_type: NoiseType::White,
            level: 0.0,
        }
    }
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            cutoff: 8_000.0,
            resonance: 0.0,
            env_amount: 0.0,
            key_tracking: 0.0,
        }
    }
}

impl AdsrParams {
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

impl Default for LfoParams {
    fn default() -> Self {
        Self {
            waveform: LfoWaveform::Sine,
            rate: 1.0,
            depth: 0.0,
            destination: LfoDestination::Filter,
            key_sync: true,
        }
    }
}

impl Default for GlideParams {
    fn default() -> Self {
        Self {
            time: 0.0,
            mode: GlideMode::Off,
        }
    }
}

impl Patch {
    /// The neutral starting point: one saw through an open filter.
    pub fn init() -> Self {
        let mut oscillators = vec![OscillatorParams::default(); NUM_OSCILLATORS];
        oscillators[0].level = 1.0;

        Self {
            name: "Init".to_string(),
            oscillators,
            noise: NoiseParams::default(),
            filter: FilterParams::default(),
            filter_env: AdsrParams::new(0.01, 0.3, 0.2, 0.3),
            amp_env: AdsrParams::new(0.01, 0.1, 0.7, 0.3),
            lfo: LfoParams::default(),
            glide: GlideParams::default(),
            master_volume: 0.7,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for Patch {
    fn default() -> Self {
        Self::init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_patch_is_a_single_open_saw() {
        let patch = Patch::init();

        assert_eq!(patch.name, "Init");
        assert_eq!(patch.oscillators.len(), NUM_OSCILLATORS);
        assert_eq!(patch.oscillators[0].waveform, Waveform::Saw);
        assert_eq!(patch.oscillators[0].level, 1.0);
        assert!(patch.oscillators[1..].iter().all(|osc| osc.level == 0.0));
        assert_eq!(patch.filter.cutoff, 8_000.0);
        assert_eq!(patch.amp_env, AdsrParams::new(0.01, 0.1, 0.7, 0.3));
        assert_eq!(patch.filter_env, AdsrParams::new(0.01, 0.3, 0.2, 0.3));
        assert_eq!(patch.lfo.depth, 0.0);
        assert!(patch.lfo.key_sync);
        assert_eq!(patch.glide.mode, GlideMode::Off);
        assert_eq!(patch.master_volume, 0.7);
    }

    #[test]
    fn with_name_keeps_parameters() {
        let patch = Patch::init().with_name("Bass");
        assert_eq!(patch.name, "Bass");
        assert_eq!(patch.filter, FilterParams::default());
    }
}
