use crate::{
    dsp::{
        clamp_finite, filter::MIN_CUTOFF_HZ, Envelope, Glide, LadderFilter, Lfo, NoiseGenerator,
        Oscillator,
    },
    patch::{LfoDestination, Patch},
    MAX_BLOCK_SIZE, NUM_OSCILLATORS, SILENCE_THRESHOLD,
};

/// Pitch swing at full LFO depth, in semitones.
pub const LFO_PITCH_RANGE_SEMITONES: f32 = 12.0;
/// Cutoff swing at full LFO depth, in semitones.
pub const LFO_FILTER_RANGE_SEMITONES: f32 = 2.0;
/// Gain swing of the amp LFO around unity.
pub const LFO_TREMOLO_DEPTH: f32 = 0.5;

/// Equal-tempered frequency of a MIDI note.
#[inline]
pub fn note_to_frequency(note: u8, a4_frequency: f32) -> f32 {
    a4_frequency * ((note as f32 - 69.0) / 12.0).exp2()
}

/// Per-block working memory, sized once for `MAX_BLOCK_SIZE`.
struct Scratch {
    amp_env: Vec<f32>,
    filter_env: Vec<f32>,
    lfo: Vec<f32>,
    frequency: Vec<f32>,
    pitch_mod: Vec<f32>,
    noise: Vec<f32>,
    mix: Vec<f32>,
    cutoff: Vec<f32>,
}

impl Scratch {
    fn new() -> Self {
        Self {
            amp_env: vec![0.0; MAX_BLOCK_SIZE],
            filter_env: vec![0.0; MAX_BLOCK_SIZE],
            lfo: vec![0.0; MAX_BLOCK_SIZE],
            frequency: vec![0.0; MAX_BLOCK_SIZE],
            pitch_mod: vec![0.0; MAX_BLOCK_SIZE],
            noise: vec![0.0; MAX_BLOCK_SIZE],
            mix: vec![0.0; MAX_BLOCK_SIZE],
            cutoff: vec![0.0; MAX_BLOCK_SIZE],
        }
    }
}

/// One note's worth of synthesis: oscillators and noise into the ladder,
/// shaped by two envelopes, an LFO and glide.
pub struct Voice {
    sample_rate: f32,
    a4_frequency: f32,

    note: Option<u8>,
    velocity: f32,
    active: bool,
    base_frequency: f32,

    oscillators: [Oscillator; NUM_OSCILLATORS],
    noise: NoiseGenerator,
    filter: LadderFilter,
    amp_env: Envelope,
    filter_env: Envelope,
    lfo: Lfo,
    glide: Glide,

    // Patch values consumed here rather than by a leaf unit
    cutoff: f32,
    env_amount: f32,
    key_tracking: f32,
    lfo_destination: LfoDestination,
    key_sync: bool,

    scratch: Scratch,
}

impl Voice {
    /// `seed` drives this voice's noise generator.
    pub fn new(sample_rate: f32, a4_frequency: f32, control_rate_divider: usize, seed: u64) -> Self {
        let mut voice = Self {
            sample_rate,
            a4_frequency,
            note: None,
            velocity: 0.0,
            active: false,
            base_frequency: 0.0,
            oscillators: std::array::from_fn(|_| Oscillator::new(sample_rate)),
            noise: NoiseGenerator::new(seed),
            filter: LadderFilter::new(sample_rate),
            amp_env: Envelope::new(sample_rate),
            filter_env: Envelope::new(sample_rate),
            lfo: Lfo::new(sample_rate, control_rate_divider),
            glide: Glide::new(sample_rate),
            cutoff: 8_000.0,
            env_amount: 0.0,
            key_tracking: 0.0,
            lfo_destination: LfoDestination::Filter,
            key_sync: true,
            scratch: Scratch::new(),
        };
        voice.apply_patch(&Patch::init());
        voice
    }

    /// Copy parameters from `patch` without touching running state.
    ///
    /// Oscillator slots the patch doesn't describe are silenced.
    pub fn apply_patch(&mut self, patch: &Patch) {
        for (index, osc) in self.oscillators.iter_mut().enumerate() {
            match patch.oscillators.get(index) {
                Some(params) => {
                    osc.waveform = params.waveform;
                    osc.octave = params.octave;
                    osc.semitone = params.semitone;
                    osc.detune_cents = params.detune;
                    osc.level = params.level;
                    osc.pulse_width = params.pulse_width;
                }
                None => osc.level = 0.0,
            }
        }

        self.noise.noise_type = patch.noise.noise_type;
        self.noise.level = patch.noise.level;

        self.cutoff = patch.filter.cutoff;
        self.filter.set_resonance(patch.filter.resonance);
        self.env_amount = patch.filter.env_amount;
        self.key_tracking = patch.filter.key_tracking;

        let amp = &patch.amp_env;
        self.amp_env.set_params(amp.attack, amp.decay, amp.sustain, amp.release);
        let filt = &patch.filter_env;
        self.filter_env.set_params(filt.attack, filt.decay, filt.sustain, filt.release);

        self.lfo.waveform = patch.lfo.waveform;
        self.lfo.rate_hz = patch.lfo.rate;
        self.lfo.depth = patch.lfo.depth;
        self.lfo_destination = patch.lfo.destination;
        self.key_sync = patch.lfo.key_sync;

        self.glide.time = patch.glide.time;
        self.glide.mode = patch.glide.mode;
    }

    /// Arm the voice for `note`. A legato note glides (if the patch allows)
    /// and keeps oscillator phase running.
    pub fn note_on(&mut self, note: u8, velocity: u8, legato: bool) {
        self.note = Some(note);
        self.velocity = velocity.min(127) as f32 / 127.0;
        self.base_frequency = note_to_frequency(note, self.a4_frequency);
        self.active = true;

        self.glide.set_target(self.base_frequency, legato);
        self.amp_env.gate_on();
        self.filter_env.gate_on();

        if self.key_sync {
            self.lfo.reset();
        }
        if !legato {
            for osc in self.oscillators.iter_mut() {
                osc.reset_phase();
            }
        }
    }

    /// Release both envelopes. The voice stays active until it fades out.
    pub fn note_off(&mut self) {
        self.amp_env.gate_off();
        self.filter_env.gate_off();
    }

    /// Force to idle with all DSP state zeroed.
    pub fn reset(&mut self) {
        self.note = None;
        self.velocity = 0.0;
        self.active = false;
        self.base_frequency = 0.0;

        self.amp_env.reset();
        self.filter_env.reset();
        self.lfo.reset();
        self.glide.reset();
        self.filter.reset();
        self.noise.reset();
        for osc in self.oscillators.iter_mut() {
            osc.reset_phase();
        }
    }

    /// Overwrite `out` with this voice's output. Inactive voices write silence.
    pub fn render(&mut self, out: &mut [f32]) {
        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            if self.active {
                self.render_block(block);
            } else {
                block.fill(0.0);
            }
        }
    }

    fn render_block(&mut self, out: &mut [f32]) {
        let n = out.len();
        let Scratch {
            amp_env,
            filter_env,
            lfo,
            frequency,
            pitch_mod,
            noise,
            mix,
            cutoff,
        } = &mut self.scratch;
        let (amp_env, filter_env, lfo) = (&mut amp_env[..n], &mut filter_env[..n], &mut lfo[..n]);
        let (frequency, pitch_mod, noise) =
            (&mut frequency[..n], &mut pitch_mod[..n], &mut noise[..n]);
        let (mix, cutoff) = (&mut mix[..n], &mut cutoff[..n]);

        // 1. Amplitude envelope, with the early exit that frees the voice
        self.amp_env.render(amp_env);
        if !self.amp_env.is_active() {
            let peak = amp_env.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
            if peak < SILENCE_THRESHOLD {
                self.active = false;
                self.note = None;
                out.fill(0.0);
                return;
            }
        }

        // 2-4. Modulation sources
        self.filter_env.render(filter_env);
        self.lfo.render(lfo);
        self.glide.render(frequency);

        let lfo_on = self.lfo.depth > 0.0;
        let pitch = if lfo_on && self.lfo_destination == LfoDestination::Pitch {
            for (p, &l) in pitch_mod.iter_mut().zip(lfo.iter()) {
                *p = l * LFO_PITCH_RANGE_SEMITONES;
            }
            Some(&*pitch_mod)
        } else {
            None
        };

        // 5. Oscillators and noise
        mix.fill(0.0);
        for osc in self.oscillators.iter_mut().filter(|osc| osc.is_audible()) {
            osc.render_add(mix, frequency, pitch);
        }
        if self.noise.level > 0.0 {
            self.noise.render(noise);
            for (m, &x) in mix.iter_mut().zip(noise.iter()) {
                *m += x;
            }
        }

        // 6. Cutoff trajectory
        let max_cutoff = self.filter.max_cutoff();
        let key_tracking = clamp_finite(self.key_tracking, 0.0, 1.0, 0.0);
        // Only the final per-sample value is clamped to the ladder's range, so
        // a key-tracked base below 20 Hz still pulls the offsets down with it.
        let tracked = self.cutoff + (self.base_frequency - self.a4_frequency) * key_tracking;
        let base = clamp_finite(tracked, -max_cutoff, max_cutoff, MIN_CUTOFF_HZ);
        let env_amount = clamp_finite(self.env_amount, -96.0, 96.0, 0.0);
        let lfo_to_filter = lfo_on && self.lfo_destination == LfoDestination::Filter;

        for (i, c) in cutoff.iter_mut().enumerate() {
            let mut fc = base;
            if env_amount != 0.0 {
                fc += base * ((filter_env[i] * env_amount / 12.0).exp2() - 1.0);
            }
            if lfo_to_filter {
                fc += base * ((lfo[i] * LFO_FILTER_RANGE_SEMITONES / 12.0).exp2() - 1.0);
            }
            *c = fc;
        }

        // 7. Ladder
        self.filter.render_modulated(mix, cutoff);

        // 8. Tremolo
        if lfo_on && self.lfo_destination == LfoDestination::Amp {
            for (m, &l) in mix.iter_mut().zip(lfo.iter()) {
                *m *= 1.0 + l * LFO_TREMOLO_DEPTH;
            }
        }

        // 9. Envelope and velocity
        let velocity = self.velocity;
        for ((o, &m), &a) in out.iter_mut().zip(mix.iter()).zip(amp_env.iter()) {
            *o = m * a * velocity;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn amp_env(&self) -> &Envelope {
        &self.amp_env
    }
}
