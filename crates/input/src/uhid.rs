use std::fs::{File, OpenOptions};
use std::io::ErrorKind;

use input_linux::uhid::{Bus, CreateParams, UHIDDevice};

use crate::descriptor::REPORT_DESCRIPTOR;
use crate::error::{InputError, Result};

const UHID_PATH: &str = "/dev/uhid";
const DEVICE_NAME: &str = "scuffle-input-forwarder";
const VENDOR_ID: u32 = 0x0000;
const PRODUCT_ID: u32 = 0x0000;
const VERSION: u32 = 1;

/// Owns a virtual UHID device and forwards HID reports to it.
///
/// Created with [`UhidDevice::create`], which performs the `UHID_CREATE2`
/// handshake with the composite keyboard+mouse report descriptor in
/// [`crate::descriptor::REPORT_DESCRIPTOR`]. Dropping the device sends
/// `UHID_DESTROY` so the kernel tears down the input device promptly rather
/// than waiting on file descriptor garbage collection.
pub struct UhidDevice {
    inner: UHIDDevice<File>,
    destroyed: bool,
}

impl UhidDevice {
    pub fn create() -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(UHID_PATH)
            .map_err(InputError::Create)?;

        let params = CreateParams {
            name: DEVICE_NAME.into(),
            phys: String::new(),
            uniq: String::new(),
            bus: Bus::VIRTUAL,
            vendor: VENDOR_ID,
            product: PRODUCT_ID,
            version: VERSION,
            country: 0,
            rd_data: REPORT_DESCRIPTOR.to_vec(),
        };

        let inner = UHIDDevice::create(file, params).map_err(InputError::Create)?;
        Ok(Self { inner, destroyed: false })
    }

    /// Writes a HID report in full, looping over short writes and retrying on
    /// `EINTR` rather than assuming the kernel character device accepts the
    /// whole report atomically.
    pub fn write_report(&mut self, report: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < report.len() {
            match self.inner.write(&report[written..]) {
                Ok(n) => written += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(InputError::Write(err)),
            }
        }
        Ok(())
    }

    /// Drains one pending output event (`UHID_START`/`UHID_OPEN`/etc.) if
    /// available, without blocking on anything this client needs to act on.
    /// Kept around so the file descriptor doesn't back up with unread kernel
    /// notifications.
    pub fn poll_event(&mut self) -> Result<bool> {
        match self.inner.read() {
            Ok(_event) => Ok(true),
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => Ok(false),
            Err(err) => Err(InputError::Write(err)),
        }
    }

    pub fn destroy(mut self) -> Result<()> {
        self.destroyed = true;
        self.inner.destroy().map_err(InputError::Destroy)
    }
}

impl Drop for UhidDevice {
    fn drop(&mut self) {
        if self.destroyed {
            return;
        }
        if let Err(err) = self.inner.destroy() {
            tracing::warn!(%err, "failed to destroy uhid device on drop");
        }
    }
}
