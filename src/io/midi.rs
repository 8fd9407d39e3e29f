/// A decoded channel-voice MIDI message. Channels are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Centred on zero: -8192..=8191.
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode one raw message. Returns `None` for system messages, unsupported
    /// status bytes and truncated input.
    ///
    /// A note-on with velocity 0 decodes as a note-off.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;
        let data1 = data.first().map(|b| b & 0x7F);
        let data2 = data.get(1).map(|b| b & 0x7F);

        let event = match status & 0xF0 {
            0x80 => MidiEvent::NoteOff {
                channel,
                key: data1?,
                velocity: data2?,
            },
            0x90 => {
                let (key, velocity) = (data1?, data2?);
                if velocity == 0 {
                    MidiEvent::NoteOff {
                        channel,
                        key,
                        velocity: 0,
                    }
                } else {
                    MidiEvent::NoteOn {
                        channel,
                        key,
                        velocity,
                    }
                }
            }
            0xB0 => MidiEvent::ControlChange {
                channel,
                controller: data1?,
                value: data2?,
            },
            0xC0 => MidiEvent::ProgramChange {
                channel,
                program: data1?,
            },
            0xE0 => {
                let raw = (data2? as i16) << 7 | data1? as i16;
                MidiEvent::PitchBend {
                    channel,
                    value: raw - 8192,
                }
            }
            _ => return None,
        };

        Some(event)
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::PitchBend { channel, .. }
            | MidiEvent::ProgramChange { channel, .. } => channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_on_with_channel() {
        assert_eq!(
            MidiEvent::parse(&[0x93, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 3,
                key: 60,
                velocity: 100
            })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert_eq!(
            MidiEvent::parse(&[0x90, 64, 0]),
            Some(MidiEvent::NoteOff {
                channel: 0,
                key: 64,
                velocity: 0
            })
        );
    }

    #[test]
    fn parses_control_change_and_program_change() {
        assert_eq!(
            MidiEvent::parse(&[0xB1, 74, 127]),
            Some(MidiEvent::ControlChange {
                channel: 1,
                controller: 74,
                value: 127
            })
        );
        assert_eq!(
            MidiEvent::parse(&[0xC2, 5]),
            Some(MidiEvent::ProgramChange {
                channel: 2,
                program: 5
            })
        );
    }

    #[test]
    fn pitch_bend_is_centred() {
        assert_eq!(
            MidiEvent::parse(&[0xE0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 0
            })
        );
        assert_eq!(
            MidiEvent::parse(&[0xE0, 0x7F, 0x7F]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 8191
            })
        );
    }

    #[test]
    fn rejects_truncated_and_system_messages() {
        assert_eq!(MidiEvent::parse(&[]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None);
        assert_eq!(MidiEvent::parse(&[0xF8]), None);
    }
}
