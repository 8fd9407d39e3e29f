use std::f32::consts::PI;

use crate::dsp::clamp_finite;

/*
Four-Pole Ladder Lowpass
========================

The ladder is four identical one-pole lowpass stages in series with the
output of the last stage fed back, inverted, to the input:

    x ──(+)──[tanh]──[LP1]──[LP2]──[LP3]──[LP4]──┬──→ y
         ↑ -k                                    │
         └───────────────────────────────────────┘

Each stage rolls off at 6 dB/octave, so the cascade gives 24 dB/octave. The
feedback gain k (0..4, from resonance 0..1) adds a resonant peak at the
cutoff; at k = 4 the loop gain at cutoff reaches unity and the filter starts
to self-oscillate.

Discretisation
--------------

Every stage is a trapezoidal ("topology preserving") one-pole:

    g  = tan(pi * fc / fs)          pre-warped cutoff
    G  = g / (1 + g)                one-pole gain
    v  = (x - s) * G
    lp = v + s
    s' = lp + v                     stage memory

Written out, a stage's output is `G * x + (1 - G) * s`, so the whole cascade
resolves to

    y4 = G^4 * u + (1 - G) * (G^3*s0 + G^2*s1 + G*s2 + s3)

with u the ladder input. The feedback therefore has no unit delay: the input
is solved for directly,

    u = (x - k * S) / (1 + k * G^4)

where S is the weighted memory sum above. The denominator keeps the loop
well-conditioned at every resonance, including k = 4.

The tanh stage saturates the solved input with some headroom. Small signals
pass untouched; loud mixes and runaway resonance are squashed, which keeps the
output bounded for bounded input no matter how cutoff and resonance are
modulated.

Parameters
----------

Cutoff (Hz):  clamped to [20, 0.49 * sample_rate] per sample.
Resonance:    clamped to [0, 1], scaled to k in [0, 4].
*/

/// Lowest cutoff the ladder will run at.
pub const MIN_CUTOFF_HZ: f32 = 20.0;

/// Peak level the saturating input stage allows through.
const DRIVE_HEADROOM: f32 = 2.0;

pub struct LadderFilter {
    sample_rate: f32,
    stages: [f32; 4],

    pub cutoff_hz: f32,
    pub resonance: f32,

    // One-pole gain cache keyed by the last cutoff seen.
    cached_cutoff: f32,
    cached_gain: f32,
}

impl LadderFilter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            stages: [0.0; 4],
            cutoff_hz: 8_000.0,
            resonance: 0.0,
            cached_cutoff: f32::NAN,
            cached_gain: 0.0,
        }
    }

    pub fn lowpass(sample_rate: f32, cutoff_hz: f32, resonance: f32) -> Self {
        let mut filter = Self::new(sample_rate);
        filter.cutoff_hz = cutoff_hz;
        filter.resonance = resonance;
        filter
    }

    /// Highest cutoff the ladder will run at.
    pub fn max_cutoff(&self) -> f32 {
        self.sample_rate * 0.49
    }

    /// One-pole gain `G` for a cutoff in Hz.
    #[inline]
    fn stage_gain(&mut self, cutoff_hz: f32) -> f32 {
        let fc = clamp_finite(cutoff_hz, MIN_CUTOFF_HZ, self.max_cutoff(), MIN_CUTOFF_HZ);
        if fc != self.cached_cutoff {
            let g = (PI * fc / self.sample_rate).tan();
            self.cached_cutoff = fc;
            self.cached_gain = g / (1.0 + g);
        }
        self.cached_gain
    }

    #[inline]
    fn feedback_gain(&self) -> f32 {
        clamp_finite(self.resonance, 0.0, 1.0, 0.0) * 4.0
    }

    /// Run one sample through the ladder with stage gain `gain` and feedback `k`.
    #[inline]
    pub fn next_sample(&mut self, input: f32, gain: f32, k: f32) -> f32 {
        let [s0, s1, s2, s3] = self.stages;
        let g2 = gain * gain;
        let g3 = g2 * gain;
        let g4 = g2 * g2;

        let memory = (g3 * s0 + g2 * s1 + gain * s2 + s3) * (1.0 - gain);
        let u = (input - k * memory) / (1.0 + k * g4);
        let mut x = DRIVE_HEADROOM * (u / DRIVE_HEADROOM).tanh();

        for s in self.stages.iter_mut() {
            let v = (x - *s) * gain;
            let lp = v + *s;
            *s = lp + v;
            x = lp;
        }

        x
    }

    /// Filter in place at the fixed `cutoff_hz`.
    pub fn render(&mut self, buffer: &mut [f32]) {
        let gain = self.stage_gain(self.cutoff_hz);
        let k = self.feedback_gain();

        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample, gain, k);
        }
    }

    /// Filter in place with a per-sample cutoff in Hz.
    ///
    /// `cutoff` must be at least as long as `buffer`.
    pub fn render_modulated(&mut self, buffer: &mut [f32], cutoff: &[f32]) {
        debug_assert!(cutoff.len() >= buffer.len());
        let k = self.feedback_gain();

        for (sample, &fc) in buffer.iter_mut().zip(cutoff) {
            let gain = self.stage_gain(fc);
            *sample = self.next_sample(*sample, gain, k);
        }
    }

    /// Zero all four stage memories.
    pub fn reset(&mut self) {
        self.stages = [0.0; 4];
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance;
    }

    pub fn stage_memory(&self) -> [f32; 4] {
        self.stages
    }
}
