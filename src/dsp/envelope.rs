use crate::{dsp::clamp_finite, MIN_TIME};

/*
ADSR Envelope Implementation
============================

A linear ADSR envelope generator. Every voice owns two of these: one shapes
the amplitude, the other sweeps the filter cutoff.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  gate        The note on/off signal. Gate high (gate_on) triggers Attack.
              Gate low (gate_off) triggers Release from wherever we are.

  increment   How much `level` changes per sample:

                  increment = target_change / (time_seconds * sample_rate)


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time
        Attack Decay  Sustain  Release


The State Machine
-----------------

    Idle ──gate_on──→ Attack ──level=1──→ Decay ──level=S──→ Sustain
      ↑                 │ ↑                 │                  │
      │                 │ └────gate_on──────┴──────────────────┤
      │                 ↓                                      ↓
      └───level=0─── Release ←──────────gate_off───────────────┘

gate_on is legal from ANY stage and always enters Attack from the CURRENT
level. A retriggered note that is still ringing therefore ramps up from where
it is instead of snapping to zero, which would click.

gate_off enters Release from any non-idle stage, again starting from the
current level. Release snapshots its start level and length at gate_off and
interpolates linearly so it lands on exactly 0.0.

Zero-length stages are clamped to one sample at 48 kHz so the increment
never divides by zero.
*/

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle,    // Gate low, envelope inactive, level = 0
    Attack,  // Ramping from the current level up to 1.0
    Decay,   // Reached peak, ramping down to sustain level
    Sustain, // Holding at sustain level while gate is high
    Release, // Gate went low, ramping down to 0
}

pub struct Envelope {
    sample_rate: f32,

    // ADSR parameters
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    // Runtime state
    stage: EnvelopeState,
    level: f32,

    decay_start_level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        Self::adsr(sample_rate, 0.01, 0.1, 0.7, 0.3)
    }

    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self {
            sample_rate,
            attack_time: MIN_TIME,
            decay_time: MIN_TIME,
            sustain_level: 0.0,
            release_time: MIN_TIME,

            stage: EnvelopeState::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        };
        env.set_params(attack, decay, sustain, release);
        env
    }

    /// Replace the stage times and sustain level without touching the
    /// running stage or level.
    pub fn set_params(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = clamp_finite(attack, MIN_TIME, f32::MAX, MIN_TIME);
        self.decay_time = clamp_finite(decay, MIN_TIME, f32::MAX, MIN_TIME);
        self.sustain_level = clamp_finite(sustain, 0.0, 1.0, 0.0);
        self.release_time = clamp_finite(release, MIN_TIME, f32::MAX, MIN_TIME);
    }

    /// Gate high: enter attack from the current level.
    pub fn gate_on(&mut self) {
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: start the release phase from current level.
    pub fn gate_off(&mut self) {
        if self.stage == EnvelopeState::Idle {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * self.sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance the envelope by one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                let increment = 1.0 / (self.attack_time * self.sample_rate);
                self.level += increment;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let target = self.sustain_level;
                let total_drop = self.decay_start_level - target;
                let decrement = total_drop / (self.decay_time * self.sample_rate);
                self.level -= decrement;

                if self.level <= target {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Returns true if the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    /// Reset to idle state.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.decay_start_level = 0.0;
        self.release_elapsed_samples = 0;
        self.release_start_level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn render_samples(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample();
        }
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.1, 0.7, 0.2);

        env.gate_on();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize);

        assert!(env.level() > 0.99, "expected attack to reach full level");
        assert_ne!(env.state(), EnvelopeState::Attack);
    }

    #[test]
    fn first_attack_sample_starts_near_zero() {
        let mut env = Envelope::adsr(44_100.0, 0.01, 0.1, 0.7, 0.2);
        env.gate_on();

        let first = env.next_sample();
        assert!(first < 0.01, "attack should not click, got {first}");
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, sustain, 0.2);

        env.gate_on();
        render_samples(&mut env, ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5);

        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((env.level() - sustain).abs() < 0.05, "sustain level should be held");
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.5, release);

        env.gate_on();
        render_samples(&mut env, 20);

        env.gate_off();
        render_samples(&mut env, (release * SAMPLE_RATE) as usize + 2);

        assert!(env.level() <= 0.001, "release should fall back to zero");
        assert!(!env.is_active());
    }

    #[test]
    fn retrigger_continues_from_current_level() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.5, 0.5);
        env.gate_on();
        render_samples(&mut env, 100);
        env.gate_off();
        render_samples(&mut env, 10);

        let before = env.level();
        env.gate_on();
        let after = env.next_sample();

        assert_eq!(env.state(), EnvelopeState::Attack);
        assert!(after >= before, "retrigger must ramp up from {before}, got {after}");
        assert!(after - before < 0.2, "retrigger must not jump, got {after}");
    }

    #[test]
    fn gate_off_when_idle_is_ignored() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.gate_off();
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn zero_times_never_produce_nan() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.0, 0.0, 2.0, 0.0);
        let mut buffer = [0.0f32; 64];
        env.gate_on();
        env.render(&mut buffer);
        env.gate_off();
        env.render(&mut buffer);

        assert!(buffer.iter().all(|s| s.is_finite()));
        assert!(!env.is_active());
    }

    #[test]
    fn set_params_keeps_running_stage() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.5, 0.2);
        env.gate_on();
        render_samples(&mut env, 5);

        env.set_params(1.0, 1.0, 0.2, 1.0);
        assert_eq!(env.state(), EnvelopeState::Attack);
        assert!(env.level() > 0.0);
    }
}
