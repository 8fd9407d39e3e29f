//! voog - plays a short three-channel demo on the default output device
//!
//! Run with: cargo run --release
//! Set RUST_LOG=debug to watch voice allocation.

use std::{thread, time::Duration};

use color_eyre::eyre::{Result, WrapErr};
use voog::{
    patch::{GlideMode, LfoDestination, LfoWaveform, Waveform},
    AudioEngine, EngineConfig, EngineHandle, Patch,
};

const BPM: u64 = 110;
const EIGHTH: Duration = Duration::from_millis(60_000 / BPM / 2);

const BASS: usize = 0;
const PAD: usize = 1;
const LEAD: usize = 2;

fn bass() -> Patch {
    let mut patch = Patch::init().with_name("Rubber Bass");
    patch.oscillators[0].waveform = Waveform::Square;
    patch.oscillators[0].pulse_width = 0.35;
    patch.oscillators[1].waveform = Waveform::Saw;
    patch.oscillators[1].octave = -1;
    patch.oscillators[1].level = 0.6;
    patch.filter.cutoff = 380.0;
    patch.filter.resonance = 0.55;
    patch.filter.env_amount = 30.0;
    patch.filter_env.decay = 0.18;
    patch.filter_env.sustain = 0.0;
    patch.amp_env.sustain = 0.8;
    patch.amp_env.release = 0.08;
    patch.glide.mode = GlideMode::Legato;
    patch.glide.time = 0.04;
    patch
}

fn pad() -> Patch {
    let mut patch = Patch::init().with_name("Slow Pad");
    for (osc, detune) in patch.oscillators.iter_mut().zip([-9.0, 0.0, 8.0]) {
        osc.waveform = Waveform::Saw;
        osc.detune = detune;
        osc.level = 0.4;
    }
    patch.noise.level = 0.03;
    patch.filter.cutoff = 1_400.0;
    patch.filter.resonance = 0.2;
    patch.amp_env.attack = 0.6;
    patch.amp_env.release = 1.2;
    patch.lfo.waveform = LfoWaveform::Triangle;
    patch.lfo.rate = 0.3;
    patch.lfo.depth = 0.8;
    patch.lfo.destination = LfoDestination::Filter;
    patch.lfo.key_sync = false;
    patch.master_volume = 0.35;
    patch
}

fn lead() -> Patch {
    let mut patch = Patch::init().with_name("Vibrato Lead");
    patch.oscillators[0].waveform = Waveform::Triangle;
    patch.oscillators[1].waveform = Waveform::Square;
    patch.oscillators[1].octave = 1;
    patch.oscillators[1].level = 0.25;
    patch.filter.cutoff = 3_000.0;
    patch.filter.key_tracking = 0.5;
    patch.lfo.rate = 5.5;
    patch.lfo.depth = 0.02;
    patch.lfo.destination = LfoDestination::Pitch;
    patch.glide.mode = GlideMode::Always;
    patch.glide.time = 0.06;
    patch.master_volume = 0.45;
    patch
}

/// Hold `notes` on `channel` for `steps` eighths.
fn chord(handle: &EngineHandle, channel: usize, notes: &[u8], steps: u32) -> Result<()> {
    for &note in notes {
        handle.note_on(channel, note, 80)?;
    }
    thread::sleep(EIGHTH * steps);
    for &note in notes {
        handle.note_off(channel, note)?;
    }
    Ok(())
}

fn play(handle: &EngineHandle) -> Result<()> {
    let bassline: [u8; 8] = [36, 36, 48, 36, 39, 41, 43, 46];
    let melody: [u8; 8] = [72, 75, 77, 79, 77, 75, 74, 70];
    let chords: [[u8; 3]; 2] = [[60, 63, 67], [58, 62, 65]];

    for (bar, pad_chord) in chords.iter().cycle().take(4).enumerate() {
        for &note in pad_chord {
            handle.note_on(PAD, note, 70)?;
        }

        for step in 0..8 {
            handle.note_on(BASS, bassline[step], 110)?;
            if bar >= 2 {
                handle.note_on(LEAD, melody[step], 96)?;
            }
            thread::sleep(EIGHTH);
            handle.note_off(BASS, bassline[step])?;
            if bar >= 2 {
                handle.note_off(LEAD, melody[step])?;
            }
        }

        for &note in pad_chord {
            handle.note_off(PAD, note)?;
        }
    }

    // Filter sweep on a held chord through CC74
    handle.note_on(BASS, 36, 110)?;
    for value in (20..=127).step_by(8) {
        handle.control_change(BASS, 74, value)?;
        thread::sleep(EIGHTH / 4);
    }
    handle.note_off(BASS, 36)?;

    chord(handle, PAD, &[60, 63, 67, 70], 8)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig::default().with_sample_rate(48_000.0).with_channels(3);
    let engine = AudioEngine::new(config);

    let handle = engine.handle();
    handle.set_patch(BASS, bass())?;
    handle.set_patch(PAD, pad())?;
    handle.set_patch(LEAD, lead())?;
    handle.set_master_volume(0.8)?;

    let running = engine
        .start()
        .wrap_err("failed to start audio output")?;

    println!("=== voog ===");
    println!("Sample rate: {} Hz", running.sample_rate());
    println!("Device channels: {}", running.device_channels());
    println!("Tempo: {BPM} BPM");
    println!();
    println!("Playing...");

    play(&handle).wrap_err("demo sequence failed")?;

    handle.panic()?;
    thread::sleep(Duration::from_millis(1_500));

    let engine = running.stop().wrap_err("failed to stop audio output")?;
    println!("Done. Voices still sounding: {}", engine.active_voice_count());

    Ok(())
}
