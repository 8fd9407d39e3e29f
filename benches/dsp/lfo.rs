//! Benchmarks for the control-rate LFO.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voog::dsp::lfo::{Lfo, LfoWaveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Default divider: one waveform evaluation per 32 samples
        let mut lfo = Lfo::new(SAMPLE_RATE, 32);
        lfo.waveform = LfoWaveform::Sine;
        lfo.rate_hz = 5.0;
        lfo.depth = 1.0;
        group.bench_with_input(BenchmarkId::new("divider_32", size), &size, |b, _| {
            b.iter(|| {
                lfo.render(black_box(&mut buffer));
            })
        });

        // Audio-rate evaluation as an upper bound
        let mut lfo = Lfo::new(SAMPLE_RATE, 1);
        lfo.rate_hz = 5.0;
        lfo.depth = 1.0;
        group.bench_with_input(BenchmarkId::new("divider_1", size), &size, |b, _| {
            b.iter(|| {
                lfo.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
