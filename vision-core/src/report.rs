//! USB HID mouse report (boot protocol layout)
//!
//! ```text
//! Byte 0: buttons, bit 0 = left, bit 1 = right, bit 2 = middle
//! Byte 1: X displacement (signed)
//! Byte 2: Y displacement (signed)
//! ```

use crate::capability::MouseButton;

pub const MOUSE_REPORT_SIZE: usize = 3;

/// Report descriptor for a 3-button mouse with relative X/Y
pub const MOUSE_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x02, // Usage (Mouse)
    0xA1, 0x01, // Collection (Application)
    0x09, 0x01, //   Usage (Pointer)
    0xA1, 0x00, //   Collection (Physical)
    0x05, 0x09, //     Usage Page (Buttons)
    0x19, 0x01, //     Usage Minimum (1)
    0x29, 0x03, //     Usage Maximum (3)
    0x15, 0x00, //     Logical Minimum (0)
    0x25, 0x01, //     Logical Maximum (1)
    0x95, 0x03, //     Report Count (3)
    0x75, 0x01, //     Report Size (1)
    0x81, 0x02, //     Input (Data, Variable, Absolute)
    0x95, 0x01, //     Report Count (1)
    0x75, 0x05, //     Report Size (5)
    0x81, 0x01, //     Input (Constant)
    0x05, 0x01, //     Usage Page (Generic Desktop)
    0x09, 0x30, //     Usage (X)
    0x09, 0x31, //     Usage (Y)
    0x15, 0x81, //     Logical Minimum (-127)
    0x25, 0x7F, //     Logical Maximum (127)
    0x75, 0x08, //     Report Size (8)
    0x95, 0x02, //     Report Count (2)
    0x81, 0x06, //     Input (Data, Variable, Relative)
    0xC0, //   End Collection
    0xC0, // End Collection
];

/// One mouse report. Buttons are level state, X/Y are deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseReport {
    pub buttons: u8,
    pub x: i8,
    pub y: i8,
}

impl MouseReport {
    /// Report with the given buttons and no motion
    pub const fn buttons(buttons: u8) -> Self {
        Self { buttons, x: 0, y: 0 }
    }

    /// Set or clear one button
    pub fn with_button(mut self, button: MouseButton, down: bool) -> Self {
        if down {
            self.buttons |= button.mask();
        } else {
            self.buttons &= !button.mask();
        }
        self
    }

    /// Add a displacement; -128 is avoided since the descriptor stops at -127
    pub fn with_motion(mut self, dx: i8, dy: i8) -> Self {
        self.x = dx.max(-127);
        self.y = dy.max(-127);
        self
    }

    pub fn to_bytes(self) -> [u8; MOUSE_REPORT_SIZE] {
        [self.buttons, self.x as u8, self.y as u8]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_bits_follow_boot_layout() {
        let report = MouseReport::default()
            .with_button(MouseButton::Left, true)
            .with_button(MouseButton::Middle, true);
        assert_eq!(report.buttons, 0b101);

        let report = report.with_button(MouseButton::Left, false);
        assert_eq!(report.to_bytes(), [0b100, 0, 0]);
    }

    #[test]
    fn motion_is_twos_complement() {
        let report = MouseReport::buttons(0b010).with_motion(-5, 5);
        assert_eq!(report.to_bytes(), [0b010, 0xFB, 0x05]);
        assert_eq!(MouseReport::default().with_motion(i8::MIN, 0).x, -127);
    }
}
