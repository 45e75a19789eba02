//! WS2812 status strip on the RMT peripheral
//!
//! Pixels are staged in a frame buffer and sent as one RMT transmission on `show()`.

use crate::BoardError;
use alloc::vec::Vec;
use esp_hal::gpio::Level;
use esp_hal::rmt::{PulseCode, TxChannel};
use log::warn;
use smart_leds::{RGB8, brightness};
use vision_core::LedStrip;

/// RMT ticks per bit half at 10 MHz: 0-bit = 400 ns high + 800 ns low, 1-bit = 800 ns + 400 ns
const T0H: u16 = 4;
const T0L: u16 = 8;
const T1H: u16 = 8;
const T1L: u16 = 4;

/// Latch time (> 50 us)
const RESET_TICKS: u16 = 800;

/// Status strip with `N` pixels
pub struct RmtLedStrip<TX, const N: usize>
where
    TX: TxChannel,
{
    channel: Option<TX>,
    frame: [RGB8; N],
    brightness: u8,
    pulses: Vec<u32>,
}

impl<TX, const N: usize> RmtLedStrip<TX, N>
where
    TX: TxChannel,
{
    pub fn new(channel: TX, brightness: u8) -> Self {
        Self {
            channel: Some(channel),
            frame: [RGB8::default(); N],
            brightness,
            pulses: Vec::with_capacity(N * 24 + 1),
        }
    }

    /// Send the frame buffer to the strip.
    pub fn write_frame(&mut self) -> Result<(), BoardError> {
        self.pulses.clear();
        for pixel in brightness(self.frame.iter().copied(), self.brightness) {
            // WS2812 expects GRB order
            for byte in [pixel.g, pixel.r, pixel.b] {
                self.pulses.extend_from_slice(&byte_to_pulses(byte));
            }
        }
        self.pulses
            .push(PulseCode::new(Level::Low, RESET_TICKS, Level::Low, 0));

        let channel = self.channel.take().ok_or(BoardError::LedError)?;
        match channel.transmit(&self.pulses) {
            Ok(transaction) => match transaction.wait() {
                Ok(channel) => {
                    self.channel = Some(channel);
                    Ok(())
                }
                Err((_, channel)) => {
                    // The frame usually lands anyway; keep the channel and report it
                    self.channel = Some(channel);
                    Err(BoardError::LedError)
                }
            },
            Err(_) => Err(BoardError::LedError),
        }
    }
}

impl<TX, const N: usize> LedStrip for RmtLedStrip<TX, N>
where
    TX: TxChannel,
{
    fn set_pixel(&mut self, index: usize, color: RGB8) {
        if let Some(pixel) = self.frame.get_mut(index) {
            *pixel = color;
        }
    }

    fn show(&mut self) {
        if let Err(e) = self.write_frame() {
            warn!("[LED] Frame transmission failed: {:?}", e);
        }
    }
}

/// Convert one byte to RMT pulses, MSB first
fn byte_to_pulses(byte: u8) -> [u32; 8] {
    let mut pulses = [0u32; 8];

    for (i, pulse) in pulses.iter_mut().enumerate() {
        *pulse = if (byte >> (7 - i)) & 1 == 1 {
            PulseCode::new(Level::High, T1H, Level::Low, T1L)
        } else {
            PulseCode::new(Level::High, T0H, Level::Low, T0L)
        };
    }

    pulses
}
