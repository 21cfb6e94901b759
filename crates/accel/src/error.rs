/// Errors surfaced by the VA-API wrapper.
///
/// Every variant here is what the decoder session (`scuffle-decoder`)
/// converts into its own "unsupported stream" / "accelerator failure" error
/// kinds; this crate itself stays a thin, fallible wrapper with no opinion on
/// process-level recovery.
#[derive(Debug, thiserror::Error)]
pub enum AccelError {
    /// No render node could be opened, or the driver doesn't support the
    /// restricted HEVC Main/VLD profile this client needs.
    #[error("failed to open a VA-API display")]
    DisplayOpen,
    /// A VA-API call returned a non-success status.
    #[error("VA-API call failed: {0}")]
    Va(#[from] cros_libva::VaError),
    /// A surface's dmabuf descriptor was exported but its file descriptors
    /// couldn't be duplicated into this process.
    #[error("failed to duplicate an exported dmabuf file descriptor")]
    DmabufDup,
    /// The surface pool had no free surface to hand to the next decode
    /// submission; this should be unreachable given the reference-window
    /// discipline in `scuffle-decoder`, and is treated as a programmer error.
    #[error("surface pool exhausted: no free surface available")]
    PoolExhausted,
}

pub type Result<T> = std::result::Result<T, AccelError>;
