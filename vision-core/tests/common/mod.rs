//! In-memory capability fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_hal_async::delay::DelayNs;
use smart_leds::RGB8;
use vision_core::capability::{ActivitySwitch, HidTransport, Incoming, LedStrip, MouseButton, NetworkStack};
use vision_core::config::{DeviceConfig, NetworkCredentials};
use vision_core::{BoardError, ControlLoop};

pub const PIXELS: usize = 8;

/// Strip that remembers its pixels and every shown frame.
pub struct FakeStrip {
    pub pixels: [RGB8; PIXELS],
    pub hid_frames: Vec<RGB8>,
    pub background_frames: Vec<[RGB8; PIXELS - 1]>,
}

impl FakeStrip {
    pub fn new() -> Self {
        Self {
            pixels: [RGB8::default(); PIXELS],
            hid_frames: Vec::new(),
            background_frames: Vec::new(),
        }
    }

    pub fn shows(&self) -> usize {
        self.hid_frames.len()
    }
}

impl LedStrip for FakeStrip {
    fn set_pixel(&mut self, index: usize, color: RGB8) {
        if let Some(pixel) = self.pixels.get_mut(index) {
            *pixel = color;
        }
    }

    fn show(&mut self) {
        let mut background = [RGB8::default(); PIXELS - 1];
        background.copy_from_slice(&self.pixels[1..]);
        self.hid_frames.push(self.pixels[0]);
        self.background_frames.push(background);
    }
}

/// Network whose first `join_failures` joins and `discovery_failures` registrations fail.
#[derive(Default)]
pub struct FakeNetwork {
    pub join_failures: u32,
    pub discovery_failures: u32,
    pub join_attempts: u32,
    pub discovery_attempts: u32,
    pub registered_name: Option<String>,
    pub incoming: VecDeque<Incoming>,
    pub polls: u32,
}

impl FakeNetwork {
    pub fn failing(join_failures: u32, discovery_failures: u32) -> Self {
        Self {
            join_failures,
            discovery_failures,
            ..Default::default()
        }
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.incoming.extend(bytes.iter().map(|b| Incoming::Byte(*b)));
    }
}

impl NetworkStack for FakeNetwork {
    async fn join(&mut self, _credentials: &NetworkCredentials) -> Result<(), BoardError> {
        self.join_attempts += 1;
        if self.join_attempts <= self.join_failures {
            Err(BoardError::WiFiError)
        } else {
            Ok(())
        }
    }

    async fn register_discovery(&mut self, name: &str) -> Result<(), BoardError> {
        self.discovery_attempts += 1;
        if self.discovery_attempts <= self.discovery_failures {
            Err(BoardError::MdnsError)
        } else {
            self.registered_name = Some(name.to_string());
            Ok(())
        }
    }

    async fn poll(&mut self) -> Incoming {
        self.polls += 1;
        self.incoming.pop_front().unwrap_or(Incoming::Nothing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidCall {
    Move(i8, i8),
    Button(MouseButton, bool),
}

#[derive(Default)]
pub struct FakeHid {
    pub calls: Vec<HidCall>,
}

impl HidTransport for FakeHid {
    async fn move_cursor(&mut self, dx: i8, dy: i8) {
        self.calls.push(HidCall::Move(dx, dy));
    }

    async fn set_button(&mut self, button: MouseButton, down: bool) {
        self.calls.push(HidCall::Button(button, down));
    }
}

/// Delay that only adds up the requested time.
#[derive(Default)]
pub struct FakeDelay {
    pub elapsed_ns: u64,
}

impl FakeDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}

pub struct FakeSwitch {
    pub enabled: bool,
}

impl ActivitySwitch for FakeSwitch {
    fn is_enabled(&mut self) -> bool {
        self.enabled
    }
}

pub type Rig = ControlLoop<FakeNetwork, FakeHid, FakeStrip, FakeDelay, FakeSwitch>;

pub fn config() -> DeviceConfig {
    DeviceConfig::new(NetworkCredentials {
        ssid: "Network-Test",
        passphrase: "secret",
    })
}

pub fn rig(network: FakeNetwork) -> Rig {
    ControlLoop::new(
        &config(),
        network,
        FakeHid::default(),
        FakeStrip::new(),
        FakeDelay::default(),
        FakeSwitch { enabled: true },
    )
}
