//! Low Frequency Oscillator (LFO) computed at control rate.

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::clamp_finite;

/*
Low Frequency Oscillators
=========================

An LFO is simply an oscillator running at sub-audio frequencies. The same
phase math applies, but the output modulates a parameter instead of being
heard directly.

Vocabulary
----------

  audio-rate      Frequencies humans can hear: ~20 Hz to ~20,000 Hz.

  control-rate    A reduced update rate for slowly varying signals. Here the
                  waveform is evaluated once every `divider` audio samples
                  (32 by default, ~1.4 kHz at 44.1 kHz).

  depth           Output scale, 0..1. The LFO is bipolar: at depth d its
                  output swings between -d and +d.

  key sync        The voice resets the LFO phase on every note-on, so each
                  note gets the same modulation shape. Without it the LFO
                  free-runs across notes.


Shapes
------

Phase p runs 0..1 and wraps.

    SINE       sin(2 pi p)                     smooth, natural
    TRIANGLE   4 |p - 0.5| - 1                 constant rate of change
    SAW        2p - 1                          ramp up, snap down  ╱╱╱╱
    SQUARE     +1 while p < 0.5, else -1       hard switch


Control Rate and Upsampling
---------------------------

Evaluating sin() per audio sample per voice is wasted work for a 5 Hz wobble.
Instead the waveform is sampled once per control tick and the audio-rate
output is a straight line between consecutive ticks:

    tick k-1          tick k            tick k+1
       ●─────────────────●─────────────────●
       │ ← divider samples interpolated →  │

Interpolation state carries across render calls, so block boundaries are
invisible in the output. The very first tick after a reset has no history
to interpolate from, so its value is held flat for one control period.


Depth Zero
----------

With depth <= 0 the LFO writes zeros and its phase does NOT advance. A voice
whose LFO is switched off therefore costs nothing here.
*/

/// LFO waveform shape.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoWaveform {
    #[default]
    Sine,
    Triangle,
    Saw,
    Square,
}

impl LfoWaveform {
    /// Evaluate the bipolar waveform at phase `p` in [0, 1).
    #[inline]
    pub fn evaluate(self, phase: f32) -> f32 {
        match self {
            LfoWaveform::Sine => (TAU * phase).sin(),
            LfoWaveform::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
            LfoWaveform::Saw => 2.0 * phase - 1.0,
            LfoWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

pub struct Lfo {
    sample_rate: f32,
    divider: usize,

    pub waveform: LfoWaveform,
    pub rate_hz: f32,
    pub depth: f32,

    // Runtime state
    phase: f32,
    previous: f32,
    next: f32,
    position: usize, // samples into the current control segment
    primed: bool,
}

impl Lfo {
    pub fn new(sample_rate: f32, divider: usize) -> Self {
        Self {
            sample_rate,
            divider: divider.max(1),
            waveform: LfoWaveform::Sine,
            rate_hz: 1.0,
            depth: 0.0,
            phase: 0.0,
            previous: 0.0,
            next: 0.0,
            position: 0,
            primed: false,
        }
    }

    /// Evaluate a new control sample and advance the phase by one tick.
    #[inline]
    fn tick(&mut self) {
        let value = self.waveform.evaluate(self.phase);
        if self.primed {
            self.previous = self.next;
        } else {
            self.previous = value;
            self.primed = true;
        }
        self.next = value;

        let rate = clamp_finite(self.rate_hz, 0.0, self.sample_rate * 0.5, 0.0);
        let increment = rate * self.divider as f32 / self.sample_rate;
        self.phase = (self.phase + increment).fract();
    }

    /// Render the bipolar modulation signal, scaled by depth.
    pub fn render(&mut self, buffer: &mut [f32]) {
        if self.depth.is_nan() || self.depth <= 0.0 {
            buffer.fill(0.0);
            return;
        }

        let depth = self.depth.min(1.0);
        let step = 1.0 / self.divider as f32;

        for sample in buffer.iter_mut() {
            if self.position == 0 {
                self.tick();
            }

            let t = self.position as f32 * step;
            *sample = (self.previous + (self.next - self.previous) * t) * depth;

            self.position += 1;
            if self.position >= self.divider {
                self.position = 0;
            }
        }
    }

    /// Restart from phase zero with no interpolation history.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.previous = 0.0;
        self.next = 0.0;
        self.position = 0;
        self.primed = false;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}
