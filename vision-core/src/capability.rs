//! Hardware capabilities consumed by the control logic.
//!
//! The firmware binds these to the RMT peripheral, esp-wifi/embassy-net and the USB OTG
//! peripheral; the tests bind them to in-memory fakes. Delays go through
//! [`embedded_hal_async::delay::DelayNs`].

use crate::BoardError;
use crate::config::NetworkCredentials;
use smart_leds::RGB8;

/// Addressable LED strip.
///
/// Writes are assumed to succeed; a binding logs transmission problems itself.
pub trait LedStrip {
    /// Stage a pixel colour. Out-of-range indices are ignored.
    fn set_pixel(&mut self, index: usize, color: RGB8);

    /// Push the staged pixels to the strip. Returns once the frame is on the wire.
    fn show(&mut self);
}

/// What the network had for the control loop on one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incoming {
    /// No client, or a client with nothing pending
    Nothing,
    /// A client has been accepted
    ClientConnected,
    /// One command byte from the attached client
    Byte(u8),
    /// The attached client went away
    ClientDisconnected,
}

/// Network join, discovery registration and the single-client command channel.
#[allow(async_fn_in_trait)]
pub trait NetworkStack {
    /// Join the WiFi network and obtain an address.
    async fn join(&mut self, credentials: &NetworkCredentials) -> Result<(), BoardError>;

    /// Announce `name` through mDNS.
    async fn register_discovery(&mut self, name: &str) -> Result<(), BoardError>;

    /// Poll the command channel without waiting for a byte that is not there.
    async fn poll(&mut self) -> Incoming;
}

/// Mouse buttons known to the emulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Middle, MouseButton::Right];

    /// Bit of the button in a boot-protocol mouse report
    pub const fn mask(self) -> u8 {
        match self {
            MouseButton::Left => 0x01,
            MouseButton::Right => 0x02,
            MouseButton::Middle => 0x04,
        }
    }
}

/// HID transport towards the host.
///
/// Calls are assumed to succeed; a binding logs transport problems itself.
#[allow(async_fn_in_trait)]
pub trait HidTransport {
    /// Relative cursor movement
    async fn move_cursor(&mut self, dx: i8, dy: i8);

    /// Press (`down == true`) or release a button
    async fn set_button(&mut self, button: MouseButton, down: bool);
}

/// Hardware switch that enables HID activity.
pub trait ActivitySwitch {
    fn is_enabled(&mut self) -> bool;
}

/// Switch for boards without an enable input
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysEnabled;

impl ActivitySwitch for AlwaysEnabled {
    fn is_enabled(&mut self) -> bool {
        true
    }
}
