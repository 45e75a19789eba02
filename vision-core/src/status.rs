//! Status indication on the LED strip
//!
//! One pixel (the HID pixel) always shows the current [`HidStatus`]; the remaining background
//! pixels show the connection state or the startup animations.

use crate::capability::{LedStrip, MouseButton};
use crate::config::StripConfig;
use crate::supervisor::ConnectionState;
use embedded_hal_async::delay::DelayNs;
use smart_leds::RGB8;

/// Strip colours
pub mod palette {
    use smart_leds::RGB8;

    const fn rgb(r: u8, g: u8, b: u8) -> RGB8 {
        RGB8 { r, g, b }
    }

    pub const OFF: RGB8 = rgb(0, 0, 0);
    pub const PINK: RGB8 = rgb(255, 64, 64);
    pub const WHITE: RGB8 = rgb(255, 255, 255);
    pub const RED: RGB8 = rgb(255, 0, 0);
    pub const GREEN: RGB8 = rgb(0, 255, 0);
    pub const CYAN: RGB8 = rgb(0, 255, 255);

    /// Warm gradient shown at startup
    pub const FIRE: [RGB8; 6] = [
        rgb(255, 64, 0),
        rgb(255, 96, 0),
        rgb(255, 128, 0),
        rgb(255, 96, 32),
        rgb(255, 32, 64),
        rgb(255, 32, 96),
    ];

    /// Cool gradient shown while connecting
    pub const BLUE: [RGB8; 4] = [
        rgb(0, 0, 255),
        rgb(0, 32, 255),
        rgb(0, 64, 255),
        rgb(0, 96, 255),
    ];

    /// Held buttons: left, middle, right
    pub const PURPLE: [RGB8; 3] = [rgb(128, 0, 128), rgb(160, 32, 240), rgb(96, 0, 160)];
}

/// State of the HID side, shown on the HID pixel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HidStatus {
    /// Waiting
    #[default]
    Idle,
    /// A command byte has been taken in
    Receiving,
    /// Explicit pause command
    Delaying,
    /// The cursor is moving
    Motion,
    /// Waiting with a client attached
    IdleConnected,
    PressLeft,
    PressMid,
    PressRight,
}

impl HidStatus {
    pub const fn pressed(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => HidStatus::PressLeft,
            MouseButton::Middle => HidStatus::PressMid,
            MouseButton::Right => HidStatus::PressRight,
        }
    }
}

/// Anything the indicator can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indication {
    Hid(HidStatus),
    Connection(ConnectionState),
}

impl From<HidStatus> for Indication {
    fn from(status: HidStatus) -> Self {
        Indication::Hid(status)
    }
}

impl From<ConnectionState> for Indication {
    fn from(state: ConnectionState) -> Self {
        Indication::Connection(state)
    }
}

/// Colour of the HID pixel for a status
pub const fn hid_color(status: HidStatus) -> RGB8 {
    match status {
        HidStatus::Idle => palette::WHITE,
        HidStatus::IdleConnected => palette::GREEN,
        HidStatus::Receiving => palette::PINK,
        HidStatus::Motion => palette::CYAN,
        HidStatus::Delaying => palette::BLUE[1],
        HidStatus::PressLeft => palette::PURPLE[0],
        HidStatus::PressMid => palette::PURPLE[1],
        HidStatus::PressRight => palette::PURPLE[2],
    }
}

/// Colour of the n-th background pixel for a connection state
pub const fn connection_color(state: ConnectionState, n: usize) -> RGB8 {
    match state {
        ConnectionState::Idle => palette::FIRE[n % palette::FIRE.len()],
        ConnectionState::Connecting => palette::BLUE[n % palette::BLUE.len()],
        ConnectionState::Connected => palette::GREEN,
        ConnectionState::DiscoveryFailed => {
            if n % 2 == 0 {
                palette::RED
            } else {
                palette::PINK
            }
        }
        ConnectionState::Halted => palette::RED,
    }
}

/// Renders statuses onto an [`LedStrip`]
pub struct StatusIndicator<L> {
    strip: L,
    pixel_count: usize,
    hid_pixel: usize,
    hid_shown: Option<HidStatus>,
    connection_shown: Option<ConnectionState>,
}

impl<L: LedStrip> StatusIndicator<L> {
    pub fn new(strip: L, config: &StripConfig) -> Self {
        Self {
            strip,
            pixel_count: config.pixel_count,
            hid_pixel: config.hid_pixel,
            hid_shown: None,
            connection_shown: None,
        }
    }

    /// The underlying strip
    pub fn strip(&self) -> &L {
        &self.strip
    }

    /// Last HID status drawn
    pub fn hid_shown(&self) -> Option<HidStatus> {
        self.hid_shown
    }

    /// Last connection state drawn on the background, if no animation has replaced it since
    pub fn connection_shown(&self) -> Option<ConnectionState> {
        self.connection_shown
    }

    /// Show a status. Repeating the last status of the same kind does nothing.
    pub fn set(&mut self, indication: impl Into<Indication>) {
        match indication.into() {
            Indication::Hid(status) => {
                if self.hid_shown == Some(status) {
                    return;
                }
                self.strip.set_pixel(self.hid_pixel, hid_color(status));
                self.hid_shown = Some(status);
            }
            Indication::Connection(state) => {
                if self.connection_shown == Some(state) {
                    return;
                }
                self.paint_background(|n| connection_color(state, n));
                self.connection_shown = Some(state);
            }
        }
        self.strip.show();
    }

    /// Rotating blue gradient, `frames` frames `frame_ms` apart
    pub async fn connecting_wipe<D: DelayNs>(&mut self, delay: &mut D, frames: u32, frame_ms: u32) {
        self.connection_shown = None;
        for frame in 0..frames as usize {
            self.paint_background(|n| palette::BLUE[(n + frame) % palette::BLUE.len()]);
            self.strip.show();
            delay.delay_ms(frame_ms).await;
        }
    }

    /// Cyan on/off flashes, `flashes` times with `flash_ms` per phase
    pub async fn discovery_flash<D: DelayNs>(&mut self, delay: &mut D, flashes: u32, flash_ms: u32) {
        self.connection_shown = None;
        for _ in 0..flashes {
            self.paint_background(|_| palette::CYAN);
            self.strip.show();
            delay.delay_ms(flash_ms).await;
            self.paint_background(|_| palette::OFF);
            self.strip.show();
            delay.delay_ms(flash_ms).await;
        }
    }

    /// Switch the background pixels off one by one
    pub async fn clear_wipe<D: DelayNs>(&mut self, delay: &mut D, pixel_ms: u32) {
        self.connection_shown = None;
        let hid_pixel = self.hid_pixel;
        for index in (0..self.pixel_count).filter(|i| *i != hid_pixel) {
            self.strip.set_pixel(index, palette::OFF);
            self.strip.show();
            delay.delay_ms(pixel_ms).await;
        }
    }

    fn paint_background(&mut self, color: impl Fn(usize) -> RGB8) {
        let hid_pixel = self.hid_pixel;
        for (n, index) in (0..self.pixel_count).filter(|i| *i != hid_pixel).enumerate() {
            self.strip.set_pixel(index, color(n));
        }
    }
}
