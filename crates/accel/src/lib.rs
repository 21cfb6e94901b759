//! A thin, RAII wrapper around `cros-libva`'s VA-API bindings, scoped to
//! exactly the restricted HEVC Main profile / 4:2:0 / NV12 decode path this
//! client speaks.
//!
//! Everything this crate does not need — the full breadth of VA-API profiles,
//! encode, VPP, JPEG — is simply not exposed here. The decoder session in
//! `scuffle-decoder` is the only caller; this crate owns no policy about
//! reference-picture bookkeeping or surface pool locking, only the mechanics
//! of talking to the accelerator.

mod display;
mod error;
mod params;
mod picture;
mod surface;

pub use display::VaDisplay;
pub use error::{AccelError, Result};
pub use params::{
    LOG2_MIN_PCM_LUMA_CODING_BLOCK_SIZE_SENTINEL, PictureParameterHevc, PictureRef, SliceParameterHevc,
    pcm_sample_bit_depth,
};
pub use picture::DecoderContext;
pub use surface::Surface;
