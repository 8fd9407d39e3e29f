//! Addressing individual patch fields.
//!
//! Every writable field has a [`ParamId`]. The textual form is a dotted path
//! such as `filter.cutoff` or `osc2.detune`; `FromStr` and `Display` convert
//! between the two. Values cross this boundary as `f32`:
//!
//! | field kind | encoding                          |
//! |------------|-----------------------------------|
//! | numeric    | stored as written                 |
//! | integer    | rounded to nearest                |
//! | boolean    | `>= 0.5` is true, reads 0.0 / 1.0 |
//! | enum       | variant index, in declared order  |

use std::{fmt, str::FromStr};

use crate::{
    error::{Result, SynthError},
    patch::{GlideMode, LfoDestination, LfoWaveform, NoiseType, Patch, Waveform},
};

macro_rules! param_fields {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $path:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $path),+
                }
            }

            fn parse(s: &str) -> Option<Self> {
                match s {
                    $($path => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

param_fields!(
    /// Per-oscillator fields.
    OscField {
        Waveform => "waveform",
        Octave => "octave",
        Semitone => "semitone",
        Detune => "detune",
        Level => "level",
        PulseWidth => "pulse_width",
    }
);

param_fields!(NoiseField {
    Type => "type",
    Level => "level",
});

param_fields!(FilterField {
    Cutoff => "cutoff",
    Resonance => "resonance",
    EnvAmount => "env_amount",
    KeyTracking => "key_tracking",
});

param_fields!(
    /// Shared by the filter and amplitude envelopes.
    EnvField {
        Attack => "attack",
        Decay => "decay",
        Sustain => "sustain",
        Release => "release",
    }
);

param_fields!(LfoField {
    Waveform => "waveform",
    Rate => "rate",
    Depth => "depth",
    Destination => "destination",
    KeySync => "key_sync",
});

param_fields!(GlideField {
    Time => "time",
    Mode => "mode",
});

/// One addressable patch field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    /// `index` is zero-based; the path form is one-based (`osc1`).
    Osc { index: usize, field: OscField },
    Noise(NoiseField),
    Filter(FilterField),
    FilterEnv(EnvField),
    AmpEnv(EnvField),
    Lfo(LfoField),
    Glide(GlideField),
    MasterVolume,
}

impl ParamId {
    pub const fn osc(index: usize, field: OscField) -> Self {
        ParamId::Osc { index, field }
    }

    fn unknown(self, value: f32) -> SynthError {
        SynthError::UnknownParameter(format!("{self} = {value}"))
    }

    /// Reject values no patch could accept for this field. Enumerated fields
    /// need an index with a variant; everything else is clamped downstream.
    ///
    /// Whether the oscillator slot exists depends on the patch and is left
    /// to [`Patch::set_param`].
    pub fn check(self, value: f32) -> Result<()> {
        fn variant<T: IndexedEnum>(id: ParamId, value: f32) -> Result<()> {
            T::from_value(value).map(|_| ()).ok_or_else(|| id.unknown(value))
        }

        match self {
            ParamId::Osc {
                field: OscField::Waveform,
                ..
            } => variant::<Waveform>(self, value),
            ParamId::Noise(NoiseField::Type) => variant::<NoiseType>(self, value),
            ParamId::Lfo(LfoField::Waveform) => variant::<LfoWaveform>(self, value),
            ParamId::Lfo(LfoField::Destination) => variant::<LfoDestination>(self, value),
            ParamId::Glide(GlideField::Mode) => variant::<GlideMode>(self, value),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamId::Osc { index, field } => write!(f, "osc{}.{}", index + 1, field.as_str()),
            ParamId::Noise(field) => write!(f, "noise.{}", field.as_str()),
            ParamId::Filter(field) => write!(f, "filter.{}", field.as_str()),
            ParamId::FilterEnv(field) => write!(f, "filter_adsr.{}", field.as_str()),
            ParamId::AmpEnv(field) => write!(f, "amp_adsr.{}", field.as_str()),
            ParamId::Lfo(field) => write!(f, "lfo.{}", field.as_str()),
            ParamId::Glide(field) => write!(f, "glide.{}", field.as_str()),
            ParamId::MasterVolume => f.write_str("master_volume"),
        }
    }
}

impl FromStr for ParamId {
    type Err = SynthError;

    fn from_str(path: &str) -> Result<Self> {
        let unknown = || SynthError::UnknownParameter(path.to_string());

        if path == "master_volume" {
            return Ok(ParamId::MasterVolume);
        }

        let (group, field) = path.split_once('.').ok_or_else(unknown)?;

        let id = match group {
            "noise" => NoiseField::parse(field).map(ParamId::Noise),
            "filter" => FilterField::parse(field).map(ParamId::Filter),
            "filter_adsr" => EnvField::parse(field).map(ParamId::FilterEnv),
            "amp_adsr" => EnvField::parse(field).map(ParamId::AmpEnv),
            "lfo" => LfoField::parse(field).map(ParamId::Lfo),
            "glide" => GlideField::parse(field).map(ParamId::Glide),
            _ => {
                let number = group.strip_prefix("osc").ok_or_else(unknown)?;
                if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(unknown());
                }
                let number: usize = number.parse().map_err(|_| unknown())?;
                let index = number.checked_sub(1).ok_or_else(unknown)?;
                OscField::parse(field).map(|field| ParamId::Osc { index, field })
            }
        };

        id.ok_or_else(unknown)
    }
}

/// Enumerations that travel as their variant index.
trait IndexedEnum: Copy + PartialEq + 'static {
    const VARIANTS: &'static [Self];

    fn to_value(self) -> f32 {
        Self::VARIANTS
            .iter()
            .position(|&variant| variant == self)
            .unwrap_or(0) as f32
    }

    fn from_value(value: f32) -> Option<Self> {
        let index = value.round();
        if !(0.0..Self::VARIANTS.len() as f32).contains(&index) {
            return None;
        }
        Self::VARIANTS.get(index as usize).copied()
    }
}

impl IndexedEnum for Waveform {
    const VARIANTS: &'static [Self] = &[
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
    ];
}

impl IndexedEnum for NoiseType {
    const VARIANTS: &'static [Self] = &[NoiseType::White, NoiseType::Pink];
}

impl IndexedEnum for LfoWaveform {
    const VARIANTS: &'static [Self] = &[
        LfoWaveform::Sine,
        LfoWaveform::Triangle,
        LfoWaveform::Saw,
        LfoWaveform::Square,
    ];
}

impl IndexedEnum for LfoDestination {
    const VARIANTS: &'static [Self] = &[
        LfoDestination::Filter,
        LfoDestination::Pitch,
        LfoDestination::Amp,
    ];
}

impl IndexedEnum for GlideMode {
    const VARIANTS: &'static [Self] = &[GlideMode::Off, GlideMode::Always, GlideMode::Legato];
}

fn bool_value(flag: bool) -> f32 {
    if flag {
        1.0
    } else {
        0.0
    }
}

impl Patch {
    /// Write one field. Fails for an oscillator the patch doesn't have or an
    /// enum index with no variant; the patch is unchanged on failure.
    pub fn set_param(&mut self, id: ParamId, value: f32) -> Result<()> {
        fn variant<T: IndexedEnum>(id: ParamId, value: f32) -> Result<T> {
            T::from_value(value).ok_or_else(|| id.unknown(value))
        }

        match id {
            ParamId::Osc { index, field } => {
                let osc = self
                    .oscillators
                    .get_mut(index)
                    .ok_or_else(|| SynthError::UnknownParameter(id.to_string()))?;
                match field {
                    OscField::Waveform => osc.waveform = variant(id, value)?,
                    OscField::Octave => osc.octave = value.round() as i32,
                    OscField::Semitone => osc.semitone = value.round() as i32,
                    OscField::Detune => osc.detune = value,
                    OscField::Level => osc.level = value,
                    OscField::PulseWidth => osc.pulse_width = value,
                }
            }
            ParamId::Noise(field) => match field {
                NoiseField::Type => self.noise.noise_type = variant(id, value)?,
                NoiseField::Level => self.noise.level = value,
            },
            ParamId::Filter(field) => match field {
                FilterField::Cutoff => self.filter.cutoff = value,
                FilterField::Resonance => self.filter.resonance = value,
                FilterField::EnvAmount => self.filter.env_amount = value,
                FilterField::KeyTracking => self.filter.key_tracking = value,
            },
            ParamId::FilterEnv(field) | ParamId::AmpEnv(field) => {
                let env = if matches!(id, ParamId::FilterEnv(_)) {
                    &mut self.filter_env
                } else {
                    &mut self.amp_env
                };
                match field {
                    EnvField::Attack => env.attack = value,
                    EnvField::Decay => env.decay = value,
                    EnvField::Sustain => env.sustain = value,
                    EnvField::Release => env.release = value,
                }
            }
            ParamId::Lfo(field) => match field {
                LfoField::Waveform => self.lfo.waveform = variant(id, value)?,
                LfoField::Rate => self.lfo.rate = value,
                LfoField::Depth => self.lfo.depth = value,
                LfoField::Destination => self.lfo.destination = variant(id, value)?,
                LfoField::KeySync => self.lfo.key_sync = value >= 0.5,
            },
            ParamId::Glide(field) => match field {
                GlideField::Time => self.glide.time = value,
                GlideField::Mode => self.glide.mode = variant(id, value)?,
            },
            ParamId::MasterVolume => self.master_volume = value,
        }

        Ok(())
    }

    /// Read one field back in the same encoding `set_param` accepts.
    pub fn param(&self, id: ParamId) -> Result<f32> {
        let value = match id {
            ParamId::Osc { index, field } => {
                let osc = self
                    .oscillators
                    .get(index)
                    .ok_or_else(|| SynthError::UnknownParameter(id.to_string()))?;
                match field {
                    OscField::Waveform => osc.waveform.to_value(),
                    OscField::Octave => osc.octave as f32,
                    OscField::Semitone => osc.semitone as f32,
                    OscField::Detune => osc.detune,
                    OscField::Level => osc.level,
                    OscField::PulseWidth => osc.pulse_width,
                }
            }
            ParamId::Noise(field) => match field {
                NoiseField::Type => self.noise.noise_type.to_value(),
                NoiseField::Level => self.noise.level,
            },
            ParamId::Filter(field) => match field {
                FilterField::Cutoff => self.filter.cutoff,
                FilterField::Resonance => self.filter.resonance,
                FilterField::EnvAmount => self.filter.env_amount,
                FilterField::KeyTracking => self.filter.key_tracking,
            },
            ParamId::FilterEnv(field) | ParamId::AmpEnv(field) => {
                let env = if matches!(id, ParamId::FilterEnv(_)) {
                    &self.filter_env
                } else {
                    &self.amp_env
                };
                match field {
                    EnvField::Attack => env.attack,
                    EnvField::Decay => env.decay,
                    EnvField::Sustain => env.sustain,
                    EnvField::Release => env.release,
                }
            }
            ParamId::Lfo(field) => match field {
                LfoField::Waveform => self.lfo.waveform.to_value(),
                LfoField::Rate => self.lfo.rate,
                LfoField::Depth => self.lfo.depth,
                LfoField::Destination => self.lfo.destination.to_value(),
                LfoField::KeySync => bool_value(self.lfo.key_sync),
            },
            ParamId::Glide(field) => match field {
                GlideField::Time => self.glide.time,
                GlideField::Mode => self.glide.mode.to_value(),
            },
            ParamId::MasterVolume => self.master_volume,
        };

        Ok(value)
    }
}
