pub mod config;
pub mod dsp; // Leaf signal generators and processors
pub mod engine; // Render entry point and output device
pub mod error;
pub mod io; // MIDI data shapes and control-change mapping
pub mod patch; // Parameter sets and parameter identifiers
pub mod synth; // Voices, allocation and channels

pub use config::EngineConfig;
pub use engine::AudioEngine;
#[cfg(feature = "audio-device")]
pub use engine::output::RunningEngine;
pub use error::{Result, SynthError};
pub use patch::{param::ParamId, Patch};
pub use synth::message::{EngineHandle, SynthEvent};

/// Largest block any unit renders in one pass. Longer requests are split.
pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Oscillators carried by every voice.
pub const NUM_OSCILLATORS: usize = 3;

/// Peak amplitude-envelope level below which a released voice is considered silent.
pub const SILENCE_THRESHOLD: f32 = 1e-5;
