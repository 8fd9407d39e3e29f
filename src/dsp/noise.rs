use rand::{rngs::SmallRng, Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Noise colour.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseType {
    /// Flat spectrum, uniform in [-1, 1].
    #[default]
    White,
    /// -3 dB/octave, from Paul Kellet's filter bank.
    Pink,
}

/// Output scale that keeps the pink filter bank near unity peak.
const PINK_GAIN: f32 = 0.11;

/// Seeded noise source. Each voice owns one with its own seed so renders are
/// reproducible.
pub struct NoiseGenerator {
    rng: SmallRng,
    pub noise_type: NoiseType,
    pub level: f32,
    pink: [f32; 7],
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            noise_type: NoiseType::White,
            level: 0.0,
            pink: [0.0; 7],
        }
    }

    #[inline]
    fn white(&mut self) -> f32 {
        self.rng.random_range(-1.0f32..=1.0)
    }

    #[inline]
    fn pink(&mut self, white: f32) -> f32 {
        let b = &mut self.pink;
        b[0] = 0.99886 * b[0] + white * 0.055_517_9;
        b[1] = 0.99332 * b[1] + white * 0.075_075_9;
        b[2] = 0.96900 * b[2] + white * 0.153_852;
        b[3] = 0.86650 * b[3] + white * 0.310_485_6;
        b[4] = 0.55000 * b[4] + white * 0.532_952_2;
        b[5] = -0.7616 * b[5] - white * 0.016_898;
        let out = b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362;
        b[6] = white * 0.115_926;
        out * PINK_GAIN
    }

    /// Fill `buffer` with noise scaled by `level`. Writes zeros when the
    /// level is not positive.
    pub fn render(&mut self, buffer: &mut [f32]) {
        if self.level.is_nan() || self.level <= 0.0 {
            buffer.fill(0.0);
            return;
        }

        let level = self.level.min(1.0);
        match self.noise_type {
            NoiseType::White => {
                for sample in buffer.iter_mut() {
                    *sample = self.white() * level;
                }
            }
            NoiseType::Pink => {
                for sample in buffer.iter_mut() {
                    let white = self.white();
                    *sample = self.pink(white) * level;
                }
            }
        }
    }

    /// Clear the pink filter memory.
    pub fn reset(&mut self) {
        self.pink = [0.0; 7];
    }
}
