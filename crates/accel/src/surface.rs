use std::os::fd::OwnedFd;

use cros_libva::{Surface as RawSurface, UsageHint};

use crate::error::Result;

/// One decode target surface: the VA-API surface backing it plus the dmabuf
/// file descriptors a compositor needs to import it as a texture.
///
/// `locked` tracks whether the surface is currently in flight as a reference
/// picture or decode target; [`crate::SurfacePool`] (owned by
/// `scuffle-decoder`) is the only thing allowed to flip it, never this type
/// itself, keeping busy/free tracking centralized in the pool.
pub struct Surface {
    raw: RawSurface<()>,
    dmabuf_fds: Vec<OwnedFd>,
    locked: bool,
}

impl Surface {
    pub(crate) fn new(raw: RawSurface<()>) -> Result<Self> {
        let descriptor = raw.export_prime()?;
        let dmabuf_fds = descriptor
            .objects
            .iter()
            .take(4)
            .map(|object| object.fd.try_clone())
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(|_| crate::error::AccelError::DmabufDup)?;

        Ok(Self {
            raw,
            dmabuf_fds,
            locked: false,
        })
    }

    /// The VA-API surface id, used as `CurrPic.picture_id` / `RefPicList` entries.
    pub fn id(&self) -> u32 {
        self.raw.id()
    }

    /// Up to four dmabuf file descriptors, one per exported plane.
    pub fn dmabuf_fds(&self) -> &[OwnedFd] {
        &self.dmabuf_fds
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub(crate) fn raw(&self) -> &RawSurface<()> {
        &self.raw
    }
}

pub(crate) const DECODE_USAGE_HINT: UsageHint = UsageHint::USAGE_HINT_DECODER;
