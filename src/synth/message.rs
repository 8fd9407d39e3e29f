use std::sync::{Arc, Mutex, PoisonError};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    error::{Result, SynthError},
    patch::{ParamId, Patch},
};

/// Everything the render thread can be asked to do.
#[derive(Debug, Clone)]
pub enum SynthEvent {
    NoteOn { channel: usize, note: u8, velocity: u8 },
    NoteOff { channel: usize, note: u8 },
    ControlChange { channel: usize, control: u8, value: u8 },
    SetParam { channel: usize, param: ParamId, value: f32 },
    SetPatch { channel: usize, patch: Box<Patch> },
    AllNotesOff { channel: usize },
    /// Release every voice on every channel.
    AllNotesOffEverywhere,
    SetChannelVolume { channel: usize, volume: f32 },
    SetMasterVolume(f32),
}

impl SynthEvent {
    /// Target channel, for events that address one.
    pub fn channel(&self) -> Option<usize> {
        match *self {
            SynthEvent::NoteOn { channel, .. }
            | SynthEvent::NoteOff { channel, .. }
            | SynthEvent::ControlChange { channel, .. }
            | SynthEvent::SetParam { channel, .. }
            | SynthEvent::SetPatch { channel, .. }
            | SynthEvent::AllNotesOff { channel }
            | SynthEvent::SetChannelVolume { channel, .. } => Some(channel),
            SynthEvent::AllNotesOffEverywhere | SynthEvent::SetMasterVolume(_) => None,
        }
    }

    /// Check MIDI data ranges and the channel index against `channel_count`.
    pub fn validate(&self, channel_count: usize) -> Result<()> {
        if let Some(channel) = self.channel() {
            if channel >= channel_count {
                return Err(SynthError::ChannelOutOfRange {
                    channel,
                    count: channel_count,
                });
            }
        }

        match *self {
            SynthEvent::NoteOn { note, velocity, .. } => {
                check_data(note, "note number above 127")?;
                check_data(velocity, "velocity above 127")
            }
            SynthEvent::NoteOff { note, .. } => check_data(note, "note number above 127"),
            SynthEvent::ControlChange { control, value, .. } => {
                check_data(control, "controller number above 127")?;
                check_data(value, "controller value above 127")
            }
            _ => Ok(()),
        }
    }
}

fn check_data(byte: u8, reason: &'static str) -> Result<()> {
    if byte > 127 {
        Err(SynthError::InvalidEvent(reason))
    } else {
        Ok(())
    }
}

/// Render-side end of the event queue.
pub trait EventReceiver {
    fn pop(&mut self) -> Option<SynthEvent>;
}

impl EventReceiver for Consumer<SynthEvent> {
    fn pop(&mut self) -> Option<SynthEvent> {
        Consumer::pop(self).ok()
    }
}

/// Cloneable, thread-safe sender of [`SynthEvent`]s.
///
/// The underlying ring buffer is single-producer, so pushes are serialised
/// through a mutex. The critical section is one `push`; the render thread
/// never takes this lock.
#[derive(Clone)]
pub struct EngineHandle {
    producer: Arc<Mutex<Producer<SynthEvent>>>,
    channel_count: usize,
}

/// Build a queue sized for `capacity` events addressed to `channel_count`
/// channels.
pub fn event_queue(capacity: usize, channel_count: usize) -> (EngineHandle, Consumer<SynthEvent>) {
    let (producer, consumer) = RingBuffer::<SynthEvent>::new(capacity);
    let handle = EngineHandle {
        producer: Arc::new(Mutex::new(producer)),
        channel_count,
    };
    (handle, consumer)
}

impl EngineHandle {
    /// Validate and queue an event. Never blocks on a full queue.
    pub fn enqueue(&self, event: SynthEvent) -> Result<()> {
        event.validate(self.channel_count)?;

        let mut producer = self.producer.lock().unwrap_or_else(PoisonError::into_inner);
        producer.push(event).map_err(|_| SynthError::QueueFull)
    }

    pub fn note_on(&self, channel: usize, note: u8, velocity: u8) -> Result<()> {
        self.enqueue(SynthEvent::NoteOn {
            channel,
            note,
            velocity,
        })
    }

    pub fn note_off(&self, channel: usize, note: u8) -> Result<()> {
        self.enqueue(SynthEvent::NoteOff { channel, note })
    }

    pub fn control_change(&self, channel: usize, control: u8, value: u8) -> Result<()> {
        self.enqueue(SynthEvent::ControlChange {
            channel,
            control,
            value,
        })
    }

    /// Resolve `path` and check `value` here so a bad name or enum index
    /// fails on the caller's thread.
    pub fn set_param(&self, channel: usize, path: &str, value: f32) -> Result<()> {
        let param: ParamId = path.parse()?;
        param.check(value)?;
        self.enqueue(SynthEvent::SetParam {
            channel,
            param,
            value,
        })
    }

    pub fn set_patch(&self, channel: usize, patch: Patch) -> Result<()> {
        self.enqueue(SynthEvent::SetPatch {
            channel,
            patch: Box::new(patch),
        })
    }

    pub fn all_notes_off(&self, channel: usize) -> Result<()> {
        self.enqueue(SynthEvent::AllNotesOff { channel })
    }

    /// Release everything on every channel.
    pub fn panic(&self) -> Result<()> {
        self.enqueue(SynthEvent::AllNotesOffEverywhere)
    }

    pub fn set_channel_volume(&self, channel: usize, volume: f32) -> Result<()> {
        self.enqueue(SynthEvent::SetChannelVolume { channel, volume })
    }

    pub fn set_master_volume(&self, volume: f32) -> Result<()> {
        self.enqueue(SynthEvent::SetMasterVolume(volume))
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }
}
