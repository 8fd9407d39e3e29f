//! Real-world scenario benchmarks.
//!
//! These benchmarks model actual usage patterns, testing complete voices
//! and multi-channel engine renders.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;
