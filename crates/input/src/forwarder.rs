use crate::error::Result;
use crate::hid_report::{build_mouse_report, KeyboardState, MouseButtons};
use crate::uhid::UhidDevice;

/// Ties keyboard/mouse state tracking to a [`UhidDevice`] sink: every state
/// change is immediately flattened into a HID report and written out.
pub struct InputForwarder {
    device: UhidDevice,
    keyboard: KeyboardState,
    mouse_buttons: MouseButtons,
}

impl InputForwarder {
    pub fn new(device: UhidDevice) -> Self {
        Self {
            device,
            keyboard: KeyboardState::new(),
            mouse_buttons: MouseButtons::default(),
        }
    }

    pub fn key_event(&mut self, evdev_code: u16, pressed: bool) -> Result<()> {
        self.keyboard.set(evdev_code, pressed);
        let report = self.keyboard.build_report();
        self.device.write_report(&report)
    }

    pub fn mouse_button(&mut self, button: u8, pressed: bool) -> Result<()> {
        self.mouse_buttons.set(button, pressed);
        self.write_mouse_report(0, 0, 0)
    }

    pub fn mouse_move(&mut self, dx: i16, dy: i16) -> Result<()> {
        self.write_mouse_report(dx, dy, 0)
    }

    pub fn mouse_wheel(&mut self, delta: i8) -> Result<()> {
        self.write_mouse_report(0, 0, delta)
    }

    fn write_mouse_report(&mut self, dx: i16, dy: i16, wheel: i8) -> Result<()> {
        let report = build_mouse_report(self.mouse_buttons, dx, dy, wheel);
        self.device.write_report(&report)
    }

    /// Clears keyboard state and writes the resulting all-zero report (every
    /// one of the 8 bytes is 0, since a cleared `KeyboardState` has no
    /// modifier bits and no rollover slots filled), releasing any stuck keys
    /// on focus loss.
    pub fn handsoff(&mut self) -> Result<()> {
        self.keyboard.clear();
        let report = self.keyboard.build_report();
        self.device.write_report(&report)
    }

    pub fn poll_events(&mut self) -> Result<bool> {
        self.device.poll_event()
    }
}
