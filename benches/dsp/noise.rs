//! Benchmarks for the noise source.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voog::dsp::noise::{NoiseGenerator, NoiseType};

use crate::BLOCK_SIZES;

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut white = NoiseGenerator::new(1);
        white.level = 1.0;
        group.bench_with_input(BenchmarkId::new("white", size), &size, |b, _| {
            b.iter(|| {
                white.render(black_box(&mut buffer));
            })
        });

        // Seven-pole pinking filter on top of the white source
        let mut pink = NoiseGenerator::new(1);
        pink.noise_type = NoiseType::Pink;
        pink.level = 1.0;
        group.bench_with_input(BenchmarkId::new("pink", size), &size, |b, _| {
            b.iter(|| {
                pink.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
