use log::debug;

use crate::{
    config::EngineConfig,
    dsp::clamp_finite,
    error::Result,
    patch::{ParamId, Patch},
    synth::{allocator::VoiceAllocator, voice::Voice},
    MAX_BLOCK_SIZE,
};

/// One timbre: a patch, a voice pool and a volume.
///
/// Channels are independent; the engine sums them.
pub struct Channel {
    id: usize,
    patch: Patch,
    allocator: VoiceAllocator,
    volume: f32,
    voice_buffer: Vec<f32>,
}

impl Channel {
    pub fn new(id: usize, config: &EngineConfig) -> Self {
        let voices = (0..config.max_voices)
            .map(|v| {
                // Distinct, reproducible noise seed per (channel, voice).
                let seed = ((id as u64) << 32) | v as u64;
                Voice::new(
                    config.sample_rate,
                    config.a4_frequency,
                    config.control_rate_divider,
                    seed,
                )
            })
            .collect();

        let mut channel = Self {
            id,
            patch: Patch::init(),
            allocator: VoiceAllocator::new(voices),
            volume: 1.0,
            voice_buffer: vec![0.0; MAX_BLOCK_SIZE],
        };
        channel.push_patch();
        channel
    }

    fn push_patch(&mut self) {
        for voice in self.allocator.voices_mut() {
            voice.apply_patch(&self.patch);
        }
    }

    /// Replace the patch and push it into every voice. Sounding notes keep
    /// their envelope stage and filter memory.
    pub fn set_patch(&mut self, patch: Patch) {
        debug!("channel {}: patch '{}'", self.id, patch.name);
        self.patch = patch;
        self.push_patch();
    }

    /// Write one patch field by its dotted path.
    pub fn set_param(&mut self, path: &str, value: f32) -> Result<()> {
        let id: ParamId = path.parse()?;
        self.set_param_id(id, value)
    }

    pub fn set_param_id(&mut self, id: ParamId, value: f32) -> Result<()> {
        self.patch.set_param(id, value)?;
        debug!("channel {}: {id} = {value}", self.id);
        self.push_patch();
        Ok(())
    }

    /// Read one patch field by its dotted path.
    pub fn param(&self, path: &str) -> Result<f32> {
        let id: ParamId = path.parse()?;
        self.patch.param(id)
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) -> usize {
        self.allocator.note_on(note, velocity)
    }

    pub fn note_off(&mut self, note: u8) {
        self.allocator.note_off(note);
    }

    pub fn all_notes_off(&mut self) {
        self.allocator.all_notes_off();
    }

    /// Add this channel's output, scaled by channel volume and the patch's
    /// master volume, into `out`.
    pub fn render_add(&mut self, out: &mut [f32]) {
        let gain = self.volume * clamp_finite(self.patch.master_volume, 0.0, 1.0, 0.0);

        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            let scratch = &mut self.voice_buffer[..block.len()];

            for voice in self.allocator.voices_mut() {
                if !voice.is_active() {
                    continue;
                }
                voice.render(scratch);
                for (o, &v) in block.iter_mut().zip(scratch.iter()) {
                    *o += v * gain;
                }
            }
        }
    }

    /// Render this channel alone into a fresh buffer.
    pub fn render(&mut self, n_samples: usize) -> Vec<f32> {
        let mut out = vec![0.0; n_samples];
        self.render_add(&mut out);
        out
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn patch(&self) -> &Patch {
        &self.patch
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() { volume.max(0.0) } else { 0.0 };
    }

    pub fn active_voice_count(&self) -> usize {
        self.allocator.active_voice_count()
    }

    pub fn held_notes(&self) -> &[u8] {
        self.allocator.held_notes()
    }

    pub fn voices(&self) -> &[Voice] {
        self.allocator.voices()
    }
}
