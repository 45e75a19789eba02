#![no_std]

//! ESP32-S3 Vision HID Emulator Board Library
//!
//! Binds the `vision-core` capabilities to the hardware: WS2812 status strip on the RMT
//! peripheral, WiFi station and TCP command channel on esp-wifi/embassy-net, an mDNS responder,
//! and a USB HID mouse on the OTG peripheral.

extern crate alloc;

pub mod activity;
pub mod led_strip;
pub mod mdns;
pub mod network;
pub mod usb_hid;
pub mod wifi;

pub use vision_core::BoardError;

/// Board configuration
pub mod config {
    use vision_core::config::{DeviceConfig, NetworkCredentials};

    /// LED strip data GPIO pin
    pub const LED_DATA_PIN: u8 = 6;

    /// Activity enable switch GPIO pin
    pub const ACTIVITY_PIN: u8 = 7;

    /// USB vendor and product id of the emulated mouse
    pub const USB_VID: u16 = 0x303a;
    pub const USB_PID: u16 = 0x8142;
    pub const USB_MANUFACTURER: &str = "Vision";
    pub const USB_PRODUCT: &str = "Vision HID Emulator";

    /// WiFi configuration
    /// Read from environment variables at compile time
    pub const WIFI_SSID: &str = env!("WIFI_SSID");
    pub const WIFI_PASSWORD: &str = env!("WIFI_PASSWORD");

    /// Time allowed for DHCP after association
    pub const DHCP_TIMEOUT_MS: u64 = 10_000;

    /// How long a poll of the command channel waits for a byte
    pub const POLL_TIMEOUT_MS: u64 = 5;

    /// TCP keep-alive interval for the command client
    pub const TCP_KEEP_ALIVE_SECS: u64 = 5;

    /// Command socket buffer sizes
    pub const TCP_RX_BUFFER: usize = 256;
    pub const TCP_TX_BUFFER: usize = 256;

    /// Interval between unsolicited mDNS announcements
    pub const MDNS_ANNOUNCE_INTERVAL_SECS: u64 = 30;

    /// Heap for esp-wifi
    pub const HEAP_SIZE: usize = 72 * 1024;

    /// Device configuration with the embedded WiFi credentials
    pub const fn device_config() -> DeviceConfig {
        DeviceConfig::new(NetworkCredentials {
            ssid: WIFI_SSID,
            passphrase: WIFI_PASSWORD,
        })
    }
}
