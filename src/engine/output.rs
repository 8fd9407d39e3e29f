//! Driving an [`AudioEngine`] from the default output device.

use std::sync::{Arc, Mutex, PoisonError};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat, Stream, StreamConfig,
};
use log::{error, info, warn};

use crate::{
    engine::AudioEngine,
    error::{Result, SynthError},
    synth::message::EngineHandle,
    MAX_BLOCK_SIZE,
};

/// An engine that is currently feeding a cpal output stream.
///
/// The engine lives behind a mutex shared with the audio callback. The
/// callback only ever `try_lock`s it, so a caller holding the lock through
/// [`RunningEngine::with_engine`] costs one silent block, never a stall.
pub struct RunningEngine {
    stream: Stream,
    engine: Arc<Mutex<Option<AudioEngine>>>,
    handle: EngineHandle,
    sample_rate: f32,
    device_channels: usize,
}

impl AudioEngine {
    /// Open the default output device at the engine's sample rate and start
    /// rendering into it.
    ///
    /// Failure is final: the engine is dropped and the device error returned.
    pub fn start(self) -> Result<RunningEngine> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(SynthError::NoOutputDevice)?;
        let supported = device.default_output_config()?;

        if supported.sample_format() != SampleFormat::F32 {
            return Err(SynthError::UnsupportedSampleFormat(
                supported.sample_format().to_string(),
            ));
        }

        let device_channels = (supported.channels() as usize).max(1);
        let sample_rate = self.sample_rate();
        let config = StreamConfig {
            channels: supported.channels(),
            sample_rate: cpal::SampleRate(sample_rate as u32),
            buffer_size: cpal::BufferSize::Default,
        };

        let handle = self.handle();
        let engine = Arc::new(Mutex::new(Some(self)));
        let engine_cb = Arc::clone(&engine);
        let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _| {
                let mut guard = match engine_cb.try_lock() {
                    Ok(guard) => guard,
                    Err(std::sync::TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                    Err(std::sync::TryLockError::WouldBlock) => {
                        data.fill(0.0);
                        return;
                    }
                };
                let Some(engine) = guard.as_mut() else {
                    data.fill(0.0);
                    return;
                };

                // Mono render copied to every device channel
                for frames in data.chunks_mut(MAX_BLOCK_SIZE * device_channels) {
                    let n = frames.len() / device_channels;
                    let block = &mut mono[..n];
                    engine.render_into(block);

                    for (frame, &sample) in frames.chunks_mut(device_channels).zip(block.iter()) {
                        frame.fill(sample);
                    }
                }
            },
            |err| error!("audio stream error: {err}"),
            None,
        )?;

        stream.play()?;
        info!(
            "output started: {} Hz, {device_channels} device channels",
            sample_rate
        );

        Ok(RunningEngine {
            stream,
            engine,
            handle,
            sample_rate,
            device_channels,
        })
    }
}

impl RunningEngine {
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn device_channels(&self) -> usize {
        self.device_channels
    }

    /// Run `f` against the live engine. The audio callback outputs silence
    /// for as long as `f` holds it.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut AudioEngine) -> R) -> Result<R> {
        let mut guard = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        guard.as_mut().map(f).ok_or(SynthError::EngineUnavailable)
    }

    /// Stop the stream and hand the engine back.
    ///
    /// The engine leaves the shared slot before the stream is touched, so a
    /// device that refuses to pause still returns it. Dropping the stream
    /// closes it either way.
    pub fn stop(self) -> Result<AudioEngine> {
        let engine = reclaim(&self.engine)?;

        if let Err(err) = self.stream.pause() {
            warn!("pausing output failed, closing it anyway: {err}");
        }
        drop(self.stream);
        info!("output stopped");

        Ok(engine)
    }
}

/// Take the engine out of the slot shared with the callback, which renders
/// silence from then on.
fn reclaim(slot: &Mutex<Option<AudioEngine>>) -> Result<AudioEngine> {
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    guard.take().ok_or(SynthError::EngineUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineConfig;

    fn slot() -> Arc<Mutex<Option<AudioEngine>>> {
        Arc::new(Mutex::new(Some(AudioEngine::new(EngineConfig::default()))))
    }

    #[test]
    fn reclaim_empties_the_slot_once() {
        let slot = slot();
        let engine = reclaim(&slot).unwrap();
        assert_eq!(engine.sample_rate(), 44_100.0);

        assert!(slot.lock().unwrap().is_none());
        assert!(matches!(reclaim(&slot), Err(SynthError::EngineUnavailable)));
    }

    #[test]
    fn reclaim_survives_a_poisoned_slot() {
        let slot = slot();
        let poisoner = Arc::clone(&slot);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("callback died holding the engine");
        })
        .join();

        assert!(slot.is_poisoned());
        assert!(reclaim(&slot).is_ok());
    }
}
