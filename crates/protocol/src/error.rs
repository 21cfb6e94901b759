/// Errors the demuxer can surface. Any of these is reported up to the event
/// loop as a reason to close the session; the demuxer itself never retries.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("unknown record type {0}")]
    UnknownRecordType(u8),
    #[error("audio configuration record was not valid ASCII/UTF-8")]
    InvalidAudioConfig,
    #[error("audio configuration sample rate {0} is not 44100 or 48000")]
    UnsupportedSampleRate(u32),
    #[error("unknown audio channel name {0:?}")]
    UnknownAudioChannel(String),
    #[error("a non-configuration audio record arrived before the channel map was established")]
    AudioConfigNotSeen,
    #[error("a second audio configuration record arrived; reconfiguration mid-stream is not supported")]
    AudioReconfigured,
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
