use crate::patch::param::{EnvField, FilterField, LfoField, ParamId};

/// Channel-mode message that releases every note on the channel.
pub const ALL_NOTES_OFF_CC: u8 = 123;

/// How one controller number drives one patch field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcMapping {
    pub control: u8,
    pub param: ParamId,
    pub min: f32,
    pub max: f32,
}

impl CcMapping {
    /// Map a 7-bit controller value linearly onto `[min, max]`.
    pub fn scale(&self, value: u8) -> f32 {
        let t = value.min(127) as f32 / 127.0;
        self.min + (self.max - self.min) * t
    }
}

const fn map(control: u8, param: ParamId, min: f32, max: f32) -> CcMapping {
    CcMapping {
        control,
        param,
        min,
        max,
    }
}

/// The fixed controller table.
pub const CC_MAP: &[CcMapping] = &[
    map(1, ParamId::Lfo(LfoField::Depth), 0.0, 1.0), // mod wheel
    map(7, ParamId::MasterVolume, 0.0, 1.0),
    map(71, ParamId::Filter(FilterField::Resonance), 0.0, 1.0),
    map(72, ParamId::AmpEnv(EnvField::Release), 0.001, 3.0),
    map(73, ParamId::AmpEnv(EnvField::Attack), 0.001, 2.0),
    map(74, ParamId::Filter(FilterField::Cutoff), 20.0, 20_000.0), // brightness
    map(75, ParamId::AmpEnv(EnvField::Decay), 0.001, 2.0),
    map(76, ParamId::Lfo(LfoField::Rate), 0.1, 20.0),
    map(77, ParamId::Filter(FilterField::EnvAmount), 0.0, 48.0),
    map(78, ParamId::FilterEnv(EnvField::Attack), 0.001, 2.0),
    map(79, ParamId::FilterEnv(EnvField::Decay), 0.001, 2.0),
];

pub fn lookup(control: u8) -> Option<&'static CcMapping> {
    CC_MAP.iter().find(|mapping| mapping.control == control)
}
