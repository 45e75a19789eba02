//! Default configuration constants and the [`DeviceConfig`] structure that carries them.
//!
//! Nothing in the control logic reads these constants directly; it only sees the fields of a
//! [`DeviceConfig`], whose [`Default`] is built from them.

use crate::BoardError;

/// TCP port the command server listens on
pub const SERVER_PORT: u16 = 80;

/// mDNS host name; the board answers for `<name>.local`
pub const MDNS_NAME: &str = "piVisionServer";

/// Number of pixels on the status strip
pub const NUM_LEDS: usize = 8;

/// Global strip brightness (0-255)
pub const BRIGHTNESS: u8 = 50;

/// Pixel that always shows the HID status
pub const HID_PIXEL: usize = 0;

/// Hold time of the startup colours
pub const INIT_DELAY_MS: u32 = 500;

/// Frames of the connecting animation after a failed join
pub const CONNECTION_DELAY_LOOP: u32 = 20;

/// Delay between connecting animation frames
pub const CONNECTION_DELAY_MS: u32 = 25;

/// Max mDNS registration attempts before a stable error condition
pub const FLASH_ERROR_LOOP: u32 = 5;

/// Flashes of the discovery animation after a failed registration
pub const CONNECTION_LOOP: u32 = 5;

/// Delay between discovery flashes
pub const CONNECTION_LOOP_DELAY_MS: u32 = 100;

/// Max WiFi join attempts before a stable error condition
pub const MAX_CONNECTION_RETRIES: u32 = 5;

/// Per-pixel delay of the strip wipe
pub const STRIP_WIPE_DELAY_MS: u32 = 200;

/// Hold time of the "initialised" confirmation
pub const INITIALIZED_DELAY_MS: u32 = 1000;

/// Cursor units per motion command
pub const MOUSE_STEPS: i8 = 5;

/// Pause after every executed command
pub const HID_PAUSE_MS: u32 = 25;

/// Period of the halted loop
pub const HALT_RENDER_DELAY_MS: u32 = 500;

/// WiFi network identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkCredentials {
    pub ssid: &'static str,
    pub passphrase: &'static str,
}

/// Status strip geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripConfig {
    pub pixel_count: usize,
    pub brightness: u8,
    pub hid_pixel: usize,
}

/// Attempt bounds for the startup sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// WiFi join attempts
    pub max_connection_retries: u32,
    /// mDNS registration attempts
    pub max_discovery_retries: u32,
}

/// Animation and pacing delays, all in milliseconds except the frame counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub init_delay_ms: u32,
    pub connection_delay_loop: u32,
    pub connection_delay_ms: u32,
    pub connection_loop: u32,
    pub connection_loop_delay_ms: u32,
    pub strip_wipe_delay_ms: u32,
    pub initialized_delay_ms: u32,
    pub hid_pause_ms: u32,
    pub halt_render_delay_ms: u32,
}

/// Complete device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    pub server_port: u16,
    pub credentials: NetworkCredentials,
    pub discovery_name: &'static str,
    pub strip: StripConfig,
    pub retries: RetryPolicy,
    pub timing: Timing,
    pub mouse_step: i8,
}

impl DeviceConfig {
    /// Default configuration for the given network
    pub const fn new(credentials: NetworkCredentials) -> Self {
        Self {
            server_port: SERVER_PORT,
            credentials,
            discovery_name: MDNS_NAME,
            strip: StripConfig {
                pixel_count: NUM_LEDS,
                brightness: BRIGHTNESS,
                hid_pixel: HID_PIXEL,
            },
            retries: RetryPolicy {
                max_connection_retries: MAX_CONNECTION_RETRIES,
                max_discovery_retries: FLASH_ERROR_LOOP,
            },
            timing: Timing {
                init_delay_ms: INIT_DELAY_MS,
                connection_delay_loop: CONNECTION_DELAY_LOOP,
                connection_delay_ms: CONNECTION_DELAY_MS,
                connection_loop: CONNECTION_LOOP,
                connection_loop_delay_ms: CONNECTION_LOOP_DELAY_MS,
                strip_wipe_delay_ms: STRIP_WIPE_DELAY_MS,
                initialized_delay_ms: INITIALIZED_DELAY_MS,
                hid_pause_ms: HID_PAUSE_MS,
                halt_render_delay_ms: HALT_RENDER_DELAY_MS,
            },
            mouse_step: MOUSE_STEPS,
        }
    }

    /// Check the invariants the control logic relies on.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.strip.pixel_count == 0 || self.strip.hid_pixel >= self.strip.pixel_count {
            return Err(BoardError::ConfigError);
        }
        if self.retries.max_connection_retries == 0 || self.retries.max_discovery_retries == 0 {
            return Err(BoardError::ConfigError);
        }
        if self.mouse_step <= 0 {
            return Err(BoardError::ConfigError);
        }
        Ok(())
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new(NetworkCredentials {
            ssid: "",
            passphrase: "",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_board_constants() {
        let config = DeviceConfig::default();
        assert_eq!(config.server_port, 80);
        assert_eq!(config.discovery_name, "piVisionServer");
        assert_eq!(config.strip.pixel_count, 8);
        assert_eq!(config.strip.brightness, 50);
        assert_eq!(config.retries.max_connection_retries, 5);
        assert_eq!(config.retries.max_discovery_retries, 5);
        assert_eq!(config.mouse_step, 5);
        assert_eq!(config.timing.hid_pause_ms, 25);
        assert_eq!(config.timing.connection_delay_loop, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_hid_pixel_outside_strip() {
        let mut config = DeviceConfig::default();
        config.strip.hid_pixel = config.strip.pixel_count;
        assert_eq!(config.validate(), Err(BoardError::ConfigError));
    }

    #[test]
    fn rejects_zero_retry_bound() {
        let mut config = DeviceConfig::default();
        config.retries.max_discovery_retries = 0;
        assert_eq!(config.validate(), Err(BoardError::ConfigError));
    }

    #[test]
    fn rejects_non_positive_step() {
        let mut config = DeviceConfig::default();
        config.mouse_step = -5;
        assert_eq!(config.validate(), Err(BoardError::ConfigError));
    }
}
