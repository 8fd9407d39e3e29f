//! Benchmarks for whole-engine renders.
//!
//! These simulate a full arrangement: several channels, each holding
//! chords, summed through the master volume.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use voog::{AudioEngine, EngineConfig};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// Start `notes_per_channel` notes on every channel and let the queue drain.
fn busy_engine(channels: usize, voices: usize, notes_per_channel: u8) -> AudioEngine {
    let mut engine = AudioEngine::new(
        EngineConfig::default()
            .with_sample_rate(SAMPLE_RATE)
            .with_channels(channels)
            .with_max_voices(voices),
    );

    let handle = engine.handle();
    for channel in 0..channels {
        for i in 0..notes_per_channel {
            let note = 48 + (channel as u8) * 5 + i * 4;
            handle
                .note_on(channel, note, 100)
                .expect("queue sized for bench");
        }
    }
    engine.render(1);
    engine
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === IDLE: nothing sounding, measures the silence path ===
        let mut idle = busy_engine(4, 8, 0);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle.render_into(black_box(&mut buffer));
            })
        });

        // === SMALL: one channel, triad ===
        let mut small = busy_engine(1, 8, 3);
        group.bench_with_input(BenchmarkId::new("1ch_3_voices", size), &size, |b, _| {
            b.iter(|| {
                small.render_into(black_box(&mut buffer));
            })
        });

        // === FULL: default layout, every voice busy ===
        let mut full = busy_engine(4, 8, 8);
        group.bench_with_input(BenchmarkId::new("4ch_32_voices", size), &size, |b, _| {
            b.iter(|| {
                full.render_into(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
