//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voog::dsp::oscillator::{Oscillator, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let waveforms = [
        // sin() transcendental per sample
        ("sine", Waveform::Sine),
        // ramp plus PolyBLEP at one edge
        ("saw", Waveform::Saw),
        // PolyBLEP at both edges
        ("square", Waveform::Square),
        // absolute value, no correction
        ("triangle", Waveform::Triangle),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let frequency = vec![220.0f32; size];
        let vibrato: Vec<f32> = (0..size)
            .map(|i| 0.3 * (i as f32 * 0.01).sin())
            .collect();

        for (name, waveform) in waveforms {
            let mut osc = Oscillator::new(SAMPLE_RATE);
            osc.waveform = waveform;
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.fill(0.0);
                    osc.render_add(black_box(&mut buffer), black_box(&frequency), None);
                })
            });
        }

        // Per-sample pitch modulation adds an exp2() per sample
        let mut osc = Oscillator::new(SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("saw_pitch_mod", size), &size, |b, _| {
            b.iter(|| {
                buffer.fill(0.0);
                osc.render_add(
                    black_box(&mut buffer),
                    black_box(&frequency),
                    Some(black_box(&vibrato)),
                );
            })
        });
    }

    group.finish();
}
