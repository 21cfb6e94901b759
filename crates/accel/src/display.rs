use std::rc::Rc;

use cros_libva::Display;

use crate::error::{AccelError, Result};

/// An opened VA-API display, scoped to a single DRM render node.
///
/// Wraps `cros_libva::Display` in an `Rc` so that [`crate::DecoderContext`]
/// and every [`crate::Surface`] it allocates can hold a cheap clone without
/// re-opening the device.
#[derive(Clone)]
pub struct VaDisplay {
    inner: Rc<Display>,
}

impl VaDisplay {
    /// Opens the first usable render node (`/dev/dri/renderD*`).
    ///
    /// `cros_libva::Display::open` already probes the standard render-node
    /// paths; we don't second-guess that search here; a future version of
    /// this crate could take an explicit path if a machine ever needs it.
    pub fn open() -> Result<Self> {
        let inner = Display::open().ok_or(AccelError::DisplayOpen)?;
        Ok(Self { inner })
    }

    pub(crate) fn raw(&self) -> &Rc<Display> {
        &self.inner
    }
}
