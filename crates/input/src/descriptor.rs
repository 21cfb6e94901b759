/// Composite HID report descriptor: a boot-protocol keyboard (report id 1) and a
/// 3-button relative mouse with a wheel (report id 2), in one top-level application
/// collection pair, matching the external contract's UHID_CREATE2 payload.
#[rustfmt::skip]
pub const REPORT_DESCRIPTOR: &[u8] = &[
    // --- Keyboard application collection (report id 1) ---
    0x05, 0x01,             // Usage Page (Generic Desktop)
    0x09, 0x06,             // Usage (Keyboard)
    0xA1, 0x01,             // Collection (Application)
    0x85, 0x01,             //   Report ID (1)
    0x05, 0x07,             //   Usage Page (Key Codes)
    0x19, 0xE0,             //   Usage Minimum (224)
    0x29, 0xE7,             //   Usage Maximum (231)
    0x15, 0x00,             //   Logical Minimum (0)
    0x25, 0x01,             //   Logical Maximum (1)
    0x75, 0x01,             //   Report Size (1)
    0x95, 0x08,             //   Report Count (8)
    0x81, 0x02,             //   Input (Data, Variable, Absolute) -- modifier byte
    0x95, 0x01,             //   Report Count (1)
    0x75, 0x08,             //   Report Size (8)
    0x81, 0x01,             //   Input (Constant) -- reserved byte
    0x95, 0x06,             //   Report Count (6)
    0x75, 0x08,             //   Report Size (8)
    0x15, 0x00,             //   Logical Minimum (0)
    0x25, 0x65,             //   Logical Maximum (101)
    0x05, 0x07,             //   Usage Page (Key Codes)
    0x19, 0x00,             //   Usage Minimum (0)
    0x29, 0x65,             //   Usage Maximum (101)
    0x81, 0x00,             //   Input (Data, Array) -- up to 6 keycodes
    0xC0,                   // End Collection

    // --- Mouse application collection (report id 2) ---
    0x05, 0x01,             // Usage Page (Generic Desktop)
    0x09, 0x02,             // Usage (Mouse)
    0xA1, 0x01,             // Collection (Application)
    0x85, 0x02,             //   Report ID (2)
    0x09, 0x01,             //   Usage (Pointer)
    0xA1, 0x00,             //   Collection (Physical)
    0x05, 0x09,             //     Usage Page (Buttons)
    0x19, 0x01,             //     Usage Minimum (1)
    0x29, 0x03,             //     Usage Maximum (3)
    0x15, 0x00,             //     Logical Minimum (0)
    0x25, 0x01,             //     Logical Maximum (1)
    0x95, 0x03,             //     Report Count (3)
    0x75, 0x01,             //     Report Size (1)
    0x81, 0x02,             //     Input (Data, Variable, Absolute) -- L/R/M buttons
    0x95, 0x01,             //     Report Count (1)
    0x75, 0x05,             //     Report Size (5)
    0x81, 0x01,             //     Input (Constant) -- padding
    0x05, 0x01,             //     Usage Page (Generic Desktop)
    0x09, 0x30,             //     Usage (X)
    0x09, 0x31,             //     Usage (Y)
    0x16, 0x00, 0x80,       //     Logical Minimum (-32768)
    0x26, 0xFF, 0x7F,       //     Logical Maximum (32767)
    0x75, 0x10,             //     Report Size (16)
    0x95, 0x02,             //     Report Count (2)
    0x81, 0x06,             //     Input (Data, Variable, Relative) -- dx, dy
    0x09, 0x38,             //     Usage (Wheel)
    0x15, 0x81,             //     Logical Minimum (-127)
    0x25, 0x7F,             //     Logical Maximum (127)
    0x75, 0x08,             //     Report Size (8)
    0x95, 0x01,             //     Report Count (1)
    0x81, 0x06,             //     Input (Data, Variable, Relative) -- wheel
    0xC0,                   //   End Collection
    0xC0,                   // End Collection
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_ends_each_collection() {
        let end_collection_count = REPORT_DESCRIPTOR.iter().filter(|&&b| b == 0xC0).count();
        assert_eq!(end_collection_count, 3);
    }

    #[test]
    fn descriptor_declares_both_report_ids() {
        assert!(REPORT_DESCRIPTOR.windows(2).any(|w| w == [0x85, 0x01]));
        assert!(REPORT_DESCRIPTOR.windows(2).any(|w| w == [0x85, 0x02]));
    }
}
