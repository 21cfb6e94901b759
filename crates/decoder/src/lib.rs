//! HEVC decode session: turns parsed SPS/PPS/slice headers and Annex-B slice
//! payloads into decoded surfaces, using `scuffle-accel` for the actual
//! accelerator calls.

mod error;
mod pool;
mod session;

pub use error::{DecoderError, Result};
pub use pool::{DecodeSurface, SurfacePool};
pub use session::{DecodedFrame, DecoderSession};
