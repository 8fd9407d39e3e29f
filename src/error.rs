use thiserror::Error;

pub type Result<T> = std::result::Result<T, SynthError>;

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("channel {channel} out of range (engine has {count} channels)")]
    ChannelOutOfRange { channel: usize, count: usize },

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("invalid event: {0}")]
    InvalidEvent(&'static str),

    #[error("event queue is full")]
    QueueFull,

    #[error("no default output device available")]
    NoOutputDevice,

    #[error("unsupported sample format {0}, only f32 output is supported")]
    UnsupportedSampleFormat(String),

    #[error("audio engine could not be recovered from the output stream")]
    EngineUnavailable,

    #[cfg(feature = "audio-device")]
    #[error(transparent)]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[cfg(feature = "audio-device")]
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "audio-device")]
    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),

    #[cfg(feature = "audio-device")]
    #[error(transparent)]
    PauseStream(#[from] cpal::PauseStreamError),
}
