mod descriptor;
mod error;
mod forwarder;
mod hid_report;
mod keymap;
mod uhid;

pub use descriptor::REPORT_DESCRIPTOR;
pub use error::{InputError, Result};
pub use forwarder::InputForwarder;
pub use hid_report::{build_mouse_report, KeyboardState, MouseButtons};
pub use keymap::{is_modifier, EVDEV_TO_HID};
pub use uhid::UhidDevice;
