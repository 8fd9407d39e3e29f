//! Voices, voice allocation, channels and the event types that drive them.
//!
//! Layering, bottom up:
//!
//! - [`voice::Voice`] renders one note through the full DSP chain
//! - [`allocator::VoiceAllocator`] decides which voice plays each note
//! - [`channel::Channel`] pairs an allocator with a patch and a volume
//! - [`message`] carries events from any thread to the render thread

pub mod allocator;
pub mod channel;
pub mod message;
pub mod voice;

pub use allocator::VoiceAllocator;
pub use channel::Channel;
pub use message::{EngineHandle, SynthEvent};
pub use voice::Voice;
