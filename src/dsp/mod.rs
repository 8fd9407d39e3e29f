//! Low-level DSP primitives owned by each voice.
//!
//! These components are allocation-free and realtime-safe once constructed.
//! None of them depend on each other; the voice wires them together. Every
//! parameter is clamped on the way in, so arbitrary patch values can never
//! push NaN or infinity into the render path.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Four-pole nonlinear ladder lowpass.
pub mod filter;
/// Exponential portamento.
pub mod glide;
/// Control-rate low frequency oscillator.
pub mod lfo;
/// White and pink noise.
pub mod noise;
/// Band-limited audio oscillator.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeState};
pub use filter::LadderFilter;
pub use glide::Glide;
pub use lfo::Lfo;
pub use noise::NoiseGenerator;
pub use oscillator::Oscillator;

/// Clamp `value` into `[min, max]`, substituting `fallback` for NaN.
#[inline]
pub(crate) fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}
