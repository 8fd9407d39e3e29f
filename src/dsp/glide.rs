#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Glide (Portamento)
==================

Glide makes the pitch slide from the previous note to the new one instead of
jumping. The slide is a one-pole exponential approach:

    current += (target - current) * coeff
    coeff     = 1 - exp(-1 / (time * sample_rate))

so `time` is the time constant: after `time` seconds the pitch has covered
~63% of the interval.

Modes
-----

    Off      every note snaps straight to its pitch
    Always   every note slides from wherever the pitch currently is
    Legato   only notes played while another is held slide; detached
             notes snap

The very first note after a reset always snaps, since there is nothing to
slide from. Once the pitch is within 0.01 Hz of the target it locks onto the
target exactly so the approach never trails off into denormals.
*/

/// Lock-on distance in Hz.
const SNAP_EPSILON_HZ: f32 = 0.01;

/// Portamento behaviour.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlideMode {
    #[default]
    Off,
    Always,
    Legato,
}

pub struct Glide {
    sample_rate: f32,

    pub time: f32,
    pub mode: GlideMode,

    current: f32,
    target: f32,
}

impl Glide {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            time: 0.0,
            mode: GlideMode::Off,
            current: 0.0,
            target: 0.0,
        }
    }

    /// Aim at a new frequency. Whether it slides depends on the mode.
    pub fn set_target(&mut self, frequency: f32, legato: bool) {
        let slides = match self.mode {
            GlideMode::Off => false,
            GlideMode::Always => true,
            GlideMode::Legato => legato,
        };

        if slides && self.current > 0.0 {
            self.target = frequency;
        } else {
            self.current = frequency;
            self.target = frequency;
        }
    }

    /// Write the per-sample frequency trajectory.
    pub fn render(&mut self, buffer: &mut [f32]) {
        if self.time.is_nan() || self.time <= 0.0 || self.current == self.target {
            self.current = self.target;
            buffer.fill(self.target);
            return;
        }

        let coeff = 1.0 - (-1.0 / (self.time * self.sample_rate)).exp();

        for sample in buffer.iter_mut() {
            self.current += (self.target - self.current) * coeff;
            if (self.target - self.current).abs() < SNAP_EPSILON_HZ {
                self.current = self.target;
            }
            *sample = self.current;
        }
    }

    pub fn reset(&mut self) {
        self.current = 0.0;
        self.target = 0.0;
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}
