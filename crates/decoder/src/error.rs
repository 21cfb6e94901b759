/// Errors a decode session can fail with.
///
/// Any of these takes the session straight to its terminal `Failed` state;
/// per the protocol demuxer's contract, the caller is expected to close the
/// session rather than retry it in place.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("decoder session already initialised")]
    AlreadyInitialised,
    #[error("a slice NAL unit arrived before an SPS and PPS were seen")]
    HeaderNotSeen,
    #[error("accelerator initialisation failed: {0}")]
    Accel(#[from] scuffle_accel::AccelError),
    #[error("the decode session has already failed and cannot accept more input")]
    Failed,
    #[error("slice references PPS id {slice}, but the active PPS has id {active}")]
    PpsMismatch { slice: u64, active: u64 },
}

pub type Result<T> = std::result::Result<T, DecoderError>;
