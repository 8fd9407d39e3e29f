use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::clamp_finite;

/*
Band-Limited Oscillator
=======================

A phase accumulator drives every waveform. Phase t runs 0..1; each sample it
advances by dt = frequency / sample_rate and wraps.

    SINE      sin(2 pi t)
    SAW       2t - 1                   one downward jump per cycle
    SQUARE    +1 while t < pw, else -1 two jumps per cycle
    TRIANGLE  1 - 4 |frac(t + 1/4) - 1/2|   starts at 0, rising

Aliasing
--------

The instantaneous jumps in saw and square contain harmonics far above
Nyquist, which fold back as inharmonic whine. PolyBLEP smooths each jump
with a two-sample polynomial residual centred on the discontinuity:

    t < dt:        r = 2u - u^2 - 1      with u = t / dt
    t > 1 - dt:    r = u^2 + 2u + 1      with u = (t - 1) / dt

The saw subtracts r at its wrap. The square adds r at its rising edge
(t = 0) and subtracts a copy shifted to its falling edge (t = pw). The
triangle has no jumps, only corners, and is left naive.

Pitch
-----

The voice supplies a per-sample base frequency (after glide). The
oscillator's own offset is a fixed ratio,

    ratio = 2^(octave + semitone/12 + detune/1200)

computed once per block. An optional per-sample pitch modulation in
semitones multiplies in on top.
*/

/// Audio oscillator waveform.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    Sine,
    #[default]
    Saw,
    Square,
    Triangle,
}

pub const MIN_PULSE_WIDTH: f32 = 0.05;
pub const MAX_PULSE_WIDTH: f32 = 0.95;

/// PolyBLEP residual for a discontinuity at phase 0.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let u = t / dt;
        2.0 * u - u * u - 1.0
    } else if t > 1.0 - dt {
        let u = (t - 1.0) / dt;
        u * u + 2.0 * u + 1.0
    } else {
        0.0
    }
}

pub struct Oscillator {
    sample_rate: f32,

    pub waveform: Waveform,
    pub octave: i32,
    pub semitone: i32,
    pub detune_cents: f32,
    pub level: f32,
    pub pulse_width: f32,

    phase: f32,
}

impl Oscillator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            waveform: Waveform::Saw,
            octave: 0,
            semitone: 0,
            detune_cents: 0.0,
            level: 0.0,
            pulse_width: 0.5,
            phase: 0.0,
        }
    }

    /// Fixed frequency multiplier from octave, semitone and detune.
    pub fn pitch_ratio(&self) -> f32 {
        let detune = clamp_finite(self.detune_cents, -1200.0, 1200.0, 0.0);
        let octaves = self.octave as f32 + self.semitone as f32 / 12.0 + detune / 1200.0;
        octaves.clamp(-10.0, 10.0).exp2()
    }

    /// Whether this oscillator contributes anything to the mix.
    pub fn is_audible(&self) -> bool {
        self.level > 0.0
    }

    #[inline]
    fn next_sample(&mut self, dt: f32) -> f32 {
        let t = self.phase;

        let value = match self.waveform {
            Waveform::Sine => (TAU * t).sin(),
            Waveform::Saw => 2.0 * t - 1.0 - poly_blep(t, dt),
            Waveform::Square => {
                let pw = clamp_finite(self.pulse_width, MIN_PULSE_WIDTH, MAX_PULSE_WIDTH, 0.5);
                let naive = if t < pw { 1.0 } else { -1.0 };
                naive + poly_blep(t, dt) - poly_blep((t + 1.0 - pw).fract(), dt)
            }
            Waveform::Triangle => 1.0 - 4.0 * ((t + 0.25).fract() - 0.5).abs(),
        };

        self.phase += dt;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        value
    }

    #[inline]
    fn phase_increment(&self, frequency: f32) -> f32 {
        // Below Nyquist so the two-sample BLEP windows never overlap.
        clamp_finite(frequency / self.sample_rate, 0.0, 0.499, 0.0)
    }

    /// Add `level`-scaled output to `mix`.
    ///
    /// `frequency` holds the per-sample base frequency in Hz. `pitch_mod`,
    /// when given, is a per-sample offset in semitones. Both must be at least
    /// as long as `mix`.
    pub fn render_add(&mut self, mix: &mut [f32], frequency: &[f32], pitch_mod: Option<&[f32]>) {
        let level = clamp_finite(self.level, 0.0, 1.0, 0.0);
        if level == 0.0 {
            return;
        }

        let ratio = self.pitch_ratio();

        match pitch_mod {
            Some(semitones) => {
                for ((out, &freq), &st) in mix.iter_mut().zip(frequency).zip(semitones) {
                    let dt = self.phase_increment(freq * ratio * (st / 12.0).exp2());
                    *out += self.next_sample(dt) * level;
                }
            }
            None => {
                for (out, &freq) in mix.iter_mut().zip(frequency) {
                    let dt = self.phase_increment(freq * ratio);
                    *out += self.next_sample(dt) * level;
                }
            }
        }
    }

    /// Restart the waveform cycle.
    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}
