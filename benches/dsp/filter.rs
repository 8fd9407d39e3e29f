//! Benchmarks for the ladder filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voog::dsp::filter::LadderFilter;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        // Fixed cutoff - gain computed once per block
        let mut filter = LadderFilter::lowpass(SAMPLE_RATE, 1000.0, 0.5);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("fixed", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // Self-oscillating resonance
        let mut filter = LadderFilter::lowpass(SAMPLE_RATE, 1000.0, 1.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("full_resonance", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // Per-sample sweep - tan() on every sample
        let sweep: Vec<f32> = (0..size)
            .map(|i| 200.0 + 8000.0 * i as f32 / size as f32)
            .collect();
        let mut filter = LadderFilter::lowpass(SAMPLE_RATE, 1000.0, 0.5);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render_modulated(black_box(&mut buffer), black_box(&sweep));
            })
        });
    }

    group.finish();
}
