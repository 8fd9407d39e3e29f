//! MIDI in, engine events out.
//!
//! Port handling belongs to the host application. These modules only decode
//! raw MIDI bytes and translate them into [`SynthEvent`](crate::SynthEvent)s.

pub mod cc_map;
pub mod converter;
pub mod midi;

pub use cc_map::CcMapping;
pub use converter::MidiRouter;
pub use midi::MidiEvent;
