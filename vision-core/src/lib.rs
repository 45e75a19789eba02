#![cfg_attr(not(test), no_std)]

//! Vision HID Emulator Control Library
//!
//! Board-independent control logic for a WiFi-connected mouse emulator: the board joins a
//! network, answers mDNS for its host name, accepts one TCP client and turns the client's
//! single-byte commands into USB HID mouse activity while an LED strip shows what is going on.
//!
//! Hardware is reached only through the traits in [`capability`], so the same code runs on the
//! ESP32 and against in-memory fakes on the host.

pub mod actuator;
pub mod capability;
pub mod config;
pub mod control;
pub mod mdns;
pub mod protocol;
pub mod report;
pub mod session;
pub mod status;
pub mod supervisor;

pub use actuator::HidActuator;
pub use capability::{
    ActivitySwitch, AlwaysEnabled, HidTransport, Incoming, LedStrip, MouseButton, NetworkStack,
};
pub use config::DeviceConfig;
pub use control::{ControlLoop, Step};
pub use protocol::{Command, CommandKind, decode};
pub use session::{ButtonState, CursorPosition, ErrorLatch, Session};
pub use status::{HidStatus, Indication, StatusIndicator};
pub use supervisor::{ConnectionState, ConnectionSupervisor};

/// Project version information
pub const VERSION: &str = "0.1.0-dev";

/// Error types for the emulator board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// WiFi association or DHCP failed
    WiFiError,
    /// mDNS registration failed
    MdnsError,
    /// TCP command channel error
    TcpError,
    /// USB HID transport error
    UsbError,
    /// LED strip transmission error
    LedError,
    /// Inconsistent [`DeviceConfig`]
    ConfigError,
}
