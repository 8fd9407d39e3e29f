//! Benchmarks for a single voice running a full patch.
//!
//! Each case switches on one more stage of the chain, so the difference
//! between neighbours is roughly the cost of that stage.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voog::{
    patch::{GlideMode, LfoDestination, Waveform},
    synth::Voice,
    Patch,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn voice(patch: &Patch) -> Voice {
    let mut voice = Voice::new(SAMPLE_RATE, 440.0, 32, 7);
    voice.apply_patch(patch);
    voice.note_on(45, 100, false); // A2, typical bass note
    voice
}

fn single_osc() -> Patch {
    let mut patch = Patch::init();
    for osc in patch.oscillators.iter_mut().skip(1) {
        osc.level = 0.0;
    }
    patch
}

fn three_osc() -> Patch {
    let mut patch = Patch::init();
    for (osc, detune) in patch.oscillators.iter_mut().zip([-7.0, 0.0, 7.0]) {
        osc.waveform = Waveform::Saw;
        osc.detune = detune;
        osc.level = 0.5;
    }
    patch.noise.level = 0.1;
    patch
}

fn modulated() -> Patch {
    let mut patch = three_osc();
    patch.filter.resonance = 0.8;
    patch.filter.env_amount = 36.0;
    patch.lfo.depth = 1.0;
    patch.lfo.rate = 4.0;
    patch.lfo.destination = LfoDestination::Pitch;
    patch.glide.mode = GlideMode::Always;
    patch.glide.time = 0.1;
    patch
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    let cases = [
        ("single_osc", single_osc()),
        ("three_osc_noise", three_osc()),
        ("fully_modulated", modulated()),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, patch) in &cases {
            let mut voice = voice(patch);
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    voice.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
