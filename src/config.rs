#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Engine-wide settings fixed at construction time.
///
/// Everything here sizes pools or derives per-sample constants, so changing a
/// value means building a new [`AudioEngine`](crate::AudioEngine).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f32,
    /// Number of independent channels, each with its own patch.
    pub channels: usize,
    /// Voice pool size per channel.
    pub max_voices: usize,
    /// Reference pitch for MIDI note 69.
    pub a4_frequency: f32,
    /// Audio samples per LFO control-rate step.
    pub control_rate_divider: usize,
    /// Capacity of the inbound event ring buffer.
    pub event_queue_capacity: usize,
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_max_voices(mut self, max_voices: usize) -> Self {
        self.max_voices = max_voices;
        self
    }

    pub fn with_a4_frequency(mut self, a4_frequency: f32) -> Self {
        self.a4_frequency = a4_frequency;
        self
    }

    pub fn with_control_rate_divider(mut self, divider: usize) -> Self {
        self.control_rate_divider = divider;
        self
    }

    pub fn with_event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity;
        self
    }

    /// Clamp every field into the range the engine can run with.
    pub(crate) fn sanitized(mut self) -> Self {
        self.sample_rate = if self.sample_rate.is_finite() {
            self.sample_rate.max(1_000.0)
        } else {
            44_100.0
        };
        self.channels = self.channels.max(1);
        self.max_voices = self.max_voices.max(1);
        self.a4_frequency = if self.a4_frequency.is_finite() && self.a4_frequency > 0.0 {
            self.a4_frequency
        } else {
            440.0
        };
        self.control_rate_divider = self.control_rate_divider.max(1);
        self.event_queue_capacity = self.event_queue_capacity.max(16);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            channels: 4,
            max_voices: 8,
            a4_frequency: 440.0,
            control_rate_divider: 32,
            event_queue_capacity: 1024,
        }
    }
}
