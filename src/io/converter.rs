use log::trace;

use crate::{io::midi::MidiEvent, synth::message::SynthEvent};

/// Number of MIDI channels on one port.
const MIDI_CHANNELS: usize = 16;

/// Maps MIDI channels onto engine channels.
///
/// Unmapped MIDI channel `n` goes to engine channel `n % channel_count`.
#[derive(Debug, Clone)]
pub struct MidiRouter {
    channel_count: usize,
    mapping: [Option<usize>; MIDI_CHANNELS],
}

impl MidiRouter {
    pub fn new(channel_count: usize) -> Self {
        Self {
            channel_count: channel_count.max(1),
            mapping: [None; MIDI_CHANNELS],
        }
    }

    /// Engine channel for a MIDI channel.
    pub fn route(&self, midi_channel: u8) -> usize {
        let midi_channel = midi_channel as usize % MIDI_CHANNELS;
        self.mapping[midi_channel].unwrap_or(midi_channel % self.channel_count)
    }

    /// Pin a MIDI channel to an engine channel (wrapped into range).
    pub fn set_mapping(&mut self, midi_channel: u8, channel: usize) {
        let midi_channel = midi_channel as usize % MIDI_CHANNELS;
        self.mapping[midi_channel] = Some(channel % self.channel_count);
    }

    pub fn clear_mappings(&mut self) {
        self.mapping = [None; MIDI_CHANNELS];
    }

    /// Translate a decoded MIDI message. Messages the engine has no use for
    /// (program change, pitch bend) yield `None`.
    pub fn to_event(&self, midi: MidiEvent) -> Option<SynthEvent> {
        let channel = self.route(midi.channel());

        match midi {
            MidiEvent::NoteOn { key, velocity, .. } => Some(SynthEvent::NoteOn {
                channel,
                note: key,
                velocity,
            }),
            MidiEvent::NoteOff { key, .. } => Some(SynthEvent::NoteOff { channel, note: key }),
            MidiEvent::ControlChange {
                controller, value, ..
            } => Some(SynthEvent::ControlChange {
                channel,
                control: controller,
                value,
            }),
            MidiEvent::PitchBend { .. } | MidiEvent::ProgramChange { .. } => {
                trace!("ignoring {midi:?}");
                None
            }
        }
    }
}
