//! The render entry point.
//!
//! [`AudioEngine`] owns every channel and the consuming end of the event
//! queue. Whoever calls `render` is the render thread: each call drains the
//! queue once, applies the events in order, then synthesises the block with
//! that state held fixed.

#[cfg(feature = "audio-device")]
pub mod output;

use log::{debug, trace, warn};
use rtrb::Consumer;

use crate::{
    config::EngineConfig,
    error::{Result, SynthError},
    io::cc_map::{self, ALL_NOTES_OFF_CC},
    synth::{
        channel::Channel,
        message::{event_queue, EngineHandle, EventReceiver, SynthEvent},
    },
};

pub struct AudioEngine {
    config: EngineConfig,
    channels: Vec<Channel>,
    master_volume: f32,
    handle: EngineHandle,
    events: Consumer<SynthEvent>,
}

impl AudioEngine {
    /// Build all channels and voices up front. Out-of-range config values are
    /// clamped.
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();
        let channels = (0..config.channels)
            .map(|id| Channel::new(id, &config))
            .collect();
        let (handle, events) = event_queue(config.event_queue_capacity, config.channels);

        debug!(
            "engine: {} channels x {} voices at {} Hz",
            config.channels, config.max_voices, config.sample_rate
        );

        Self {
            config,
            channels,
            master_volume: 1.0,
            handle,
            events,
        }
    }

    /// A sender usable from any thread.
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Queue an event for the next render call.
    pub fn enqueue(&self, event: SynthEvent) -> Result<()> {
        self.handle.enqueue(event)
    }

    /// Render `n_samples` of mono output into a new buffer.
    pub fn render(&mut self, n_samples: usize) -> Vec<f32> {
        let mut out = vec![0.0; n_samples];
        self.render_into(&mut out);
        out
    }

    /// Render into `out`, overwriting it. Allocation-free.
    pub fn render_into(&mut self, out: &mut [f32]) {
        self.drain_events();

        out.fill(0.0);
        for channel in self.channels.iter_mut() {
            channel.render_add(out);
        }

        let master = self.master_volume;
        if master != 1.0 {
            for sample in out.iter_mut() {
                *sample *= master;
            }
        }
    }

    fn drain_events(&mut self) {
        while let Some(event) = EventReceiver::pop(&mut self.events) {
            if let Err(err) = self.dispatch(event) {
                warn!("dropped event: {err}");
            }
        }
    }

    fn dispatch(&mut self, event: SynthEvent) -> Result<()> {
        match event {
            SynthEvent::NoteOn {
                channel,
                note,
                velocity,
            } => {
                // Running status convention: velocity 0 is a release.
                let channel = self.channel_mut(channel)?;
                if velocity == 0 {
                    channel.note_off(note);
                } else {
                    let voice = channel.note_on(note, velocity);
                    trace!("ch{}: note {note} vel {velocity} -> voice {voice}", channel.id());
                }
            }
            SynthEvent::NoteOff { channel, note } => self.channel_mut(channel)?.note_off(note),
            SynthEvent::ControlChange {
                channel,
                control,
                value,
            } => self.control_change(channel, control, value)?,
            SynthEvent::SetParam {
                channel,
                param,
                value,
            } => self.channel_mut(channel)?.set_param_id(param, value)?,
            SynthEvent::SetPatch { channel, patch } => self.channel_mut(channel)?.set_patch(*patch),
            SynthEvent::AllNotesOff { channel } => self.channel_mut(channel)?.all_notes_off(),
            SynthEvent::AllNotesOffEverywhere => {
                for channel in self.channels.iter_mut() {
                    channel.all_notes_off();
                }
            }
            SynthEvent::SetChannelVolume { channel, volume } => {
                self.channel_mut(channel)?.set_volume(volume)
            }
            SynthEvent::SetMasterVolume(volume) => self.set_master_volume(volume),
        }
        Ok(())
    }

    fn control_change(&mut self, channel: usize, control: u8, value: u8) -> Result<()> {
        let channel = self.channel_mut(channel)?;

        if control == ALL_NOTES_OFF_CC {
            channel.all_notes_off();
            return Ok(());
        }

        match cc_map::lookup(control) {
            Some(mapping) => channel.set_param_id(mapping.param, mapping.scale(value)),
            None => {
                trace!("ch{}: unmapped CC{control}", channel.id());
                Ok(())
            }
        }
    }

    pub fn channel(&self, index: usize) -> Result<&Channel> {
        let count = self.channels.len();
        self.channels
            .get(index)
            .ok_or(SynthError::ChannelOutOfRange {
                channel: index,
                count,
            })
    }

    /// Direct access for the thread that owns the engine. Other threads go
    /// through [`EngineHandle`].
    pub fn channel_mut(&mut self, index: usize) -> Result<&mut Channel> {
        let count = self.channels.len();
        self.channels
            .get_mut(index)
            .ok_or(SynthError::ChannelOutOfRange {
                channel: index,
                count,
            })
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = if volume.is_finite() { volume.max(0.0) } else { 0.0 };
    }

    pub fn active_voice_count(&self) -> usize {
        self.channels.iter().map(Channel::active_voice_count).sum()
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> AudioEngine {
        AudioEngine::new(
            EngineConfig::default()
                .with_sample_rate(48_000.0)
                .with_channels(2)
                .with_max_voices(4),
        )
    }

    #[test]
    fn events_apply_before_the_block_renders() {
        let mut engine = engine();
        engine.handle().note_on(0, 60, 100).unwrap();
        assert_eq!(engine.active_voice_count(), 0, "nothing happens until render");

        let out = engine.render(256);
        assert_eq!(engine.active_voice_count(), 1);
        assert!(out.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn velocity_zero_note_on_releases() {
        let mut engine = engine();
        engine.handle().note_on(0, 60, 100).unwrap();
        engine.render(64);
        engine.handle().note_on(0, 60, 0).unwrap();
        engine.render(64);

        assert!(engine.channel(0).unwrap().held_notes().is_empty());
    }

    #[test]
    fn control_change_routes_through_cc_map() {
        let mut engine = engine();
        engine.handle().control_change(1, 74, 127).unwrap();
        engine.handle().control_change(1, 71, 0).unwrap();
        engine.render(1);

        let channel = engine.channel(1).unwrap();
        assert_eq!(channel.param("filter.cutoff").unwrap(), 20_000.0);
        assert_eq!(channel.param("filter.resonance").unwrap(), 0.0);
        assert_eq!(engine.channel(0).unwrap().param("filter.cutoff").unwrap(), 8_000.0);
    }

    #[test]
    fn cc123_releases_the_channel() {
        let mut engine = engine();
        let handle = engine.handle();
        handle.note_on(0, 60, 100).unwrap();
        handle.note_on(0, 64, 100).unwrap();
        engine.render(32);

        handle.control_change(0, 123, 0).unwrap();
        engine.render(32);

        assert!(engine.channel(0).unwrap().held_notes().is_empty());
    }

    #[test]
    fn master_volume_scales_the_mix() {
        let mut loud = engine();
        let mut quiet = engine();
        quiet.set_master_volume(0.5);
        for engine in [&mut loud, &mut quiet] {
            engine.handle().note_on(0, 57, 100).unwrap();
        }

        let a = loud.render(1024);
        let b = quiet.render(1024);
        for (x, y) in a.iter().zip(&b) {
            assert!((x * 0.5 - y).abs() < 1e-6);
        }
    }

    #[test]
    fn channel_lookup_reports_out_of_range() {
        let engine = engine();
        assert!(matches!(
            engine.channel(5),
            Err(SynthError::ChannelOutOfRange { channel: 5, count: 2 })
        ));
    }

    #[test]
    fn panic_releases_all_channels() {
        let mut engine = engine();
        let handle = engine.handle();
        handle.note_on(0, 60, 100).unwrap();
        handle.note_on(1, 67, 100).unwrap();
        engine.render(32);

        handle.panic().unwrap();
        engine.render(32);

        assert!(engine.channels().iter().all(|c| c.held_notes().is_empty()));
    }
}
