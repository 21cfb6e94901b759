use std::sync::LazyLock;

/// Fixed 256-entry evdev keycode -> USB HID boot-keyboard usage code table.
///
/// Indexed by the Linux `input-event-codes.h` keycode; entries for keys this
/// client doesn't forward (multimedia keys, vendor-specific codes, and
/// anything past the boot keyboard's usage range) are `0x00`, matching a HID
/// report byte that the host simply ignores. This table is part of the
/// external contract alongside the HID report descriptor in [`crate::descriptor`]
/// and must stay index-stable.
pub static EVDEV_TO_HID: LazyLock<[u8; 256]> = LazyLock::new(build_table);

fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];

    // Top row: Esc, 1-0, minus, equal, backspace.
    table[1] = 0x29; // KEY_ESC
    let digits_and_punct = [0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27, 0x2d, 0x2e, 0x2a];
    for (i, &hid) in digits_and_punct.iter().enumerate() {
        table[2 + i] = hid; // KEY_1..KEY_0, KEY_MINUS, KEY_EQUAL, KEY_BACKSPACE
    }

    table[15] = 0x2b; // KEY_TAB
    let qwerty_row = [0x14, 0x1a, 0x08, 0x15, 0x17, 0x1c, 0x18, 0x0c, 0x12, 0x13, 0x2f, 0x30, 0x28];
    for (i, &hid) in qwerty_row.iter().enumerate() {
        table[16 + i] = hid; // KEY_Q..KEY_P, KEY_LEFTBRACE, KEY_RIGHTBRACE, KEY_ENTER
    }

    table[29] = 0xe0; // KEY_LEFTCTRL
    let home_row = [0x04, 0x16, 0x07, 0x09, 0x0a, 0x0b, 0x0d, 0x0e, 0x0f, 0x33, 0x34, 0x35];
    for (i, &hid) in home_row.iter().enumerate() {
        table[30 + i] = hid; // KEY_A..KEY_L, KEY_SEMICOLON, KEY_APOSTROPHE, KEY_GRAVE
    }

    table[42] = 0xe1; // KEY_LEFTSHIFT
    table[43] = 0x31; // KEY_BACKSLASH
    let bottom_row = [0x1d, 0x1b, 0x06, 0x19, 0x05, 0x11, 0x10, 0x36, 0x37, 0x38];
    for (i, &hid) in bottom_row.iter().enumerate() {
        table[44 + i] = hid; // KEY_Z..KEY_M, KEY_COMMA, KEY_DOT, KEY_SLASH
    }
    table[54] = 0xe5; // KEY_RIGHTSHIFT
    table[56] = 0xe2; // KEY_LEFTALT
    table[57] = 0x2c; // KEY_SPACE
    table[58] = 0x39; // KEY_CAPSLOCK

    for (i, hid) in (0x3a..=0x43).enumerate() {
        table[59 + i] = hid; // KEY_F1..KEY_F10
    }
    table[87] = 0x44; // KEY_F11
    table[88] = 0x45; // KEY_F12

    table[97] = 0xe4; // KEY_RIGHTCTRL
    table[100] = 0xe6; // KEY_RIGHTALT
    table[102] = 0x4a; // KEY_HOME
    table[103] = 0x52; // KEY_UP
    table[104] = 0x4b; // KEY_PAGEUP
    table[105] = 0x50; // KEY_LEFT
    table[106] = 0x4f; // KEY_RIGHT
    table[107] = 0x4d; // KEY_END
    table[108] = 0x51; // KEY_DOWN
    table[109] = 0x4e; // KEY_PAGEDOWN
    table[110] = 0x49; // KEY_INSERT
    table[111] = 0x4c; // KEY_DELETE
    table[119] = 0x48; // KEY_PAUSE
    table[125] = 0xe3; // KEY_LEFTMETA
    table[126] = 0xe7; // KEY_RIGHTMETA

    table
}

/// HID usage codes for the boot keyboard's modifier byte, `0xE0..=0xE7`.
pub fn is_modifier(hid_usage: u8) -> bool {
    (0xe0..=0xe7).contains(&hid_usage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_common_letters() {
        assert_eq!(EVDEV_TO_HID[30], 0x04); // KEY_A -> HID 'a'
        assert_eq!(EVDEV_TO_HID[44], 0x1d); // KEY_Z -> HID 'z'
    }

    #[test]
    fn maps_modifiers_into_the_modifier_range() {
        assert!(is_modifier(EVDEV_TO_HID[29])); // KEY_LEFTCTRL
        assert!(is_modifier(EVDEV_TO_HID[42])); // KEY_LEFTSHIFT
        assert!(is_modifier(EVDEV_TO_HID[56])); // KEY_LEFTALT
    }

    #[test]
    fn unmapped_codes_default_to_zero() {
        assert_eq!(EVDEV_TO_HID[200], 0x00);
        assert_eq!(EVDEV_TO_HID[0], 0x00);
    }
}
