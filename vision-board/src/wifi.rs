//! WiFi module for the ESP32-S3 board
//!
//! Joins the network in station mode with esp-wifi and waits for the embassy-net DHCP lease.

use crate::{BoardError, config};
use embassy_net::{Ipv4Address, Stack};
use embassy_time::{Duration, with_timeout};
use esp_wifi::wifi::{AuthMethod, ClientConfiguration, Configuration, WifiController};
use log::{info, warn};
use vision_core::config::NetworkCredentials;

/// WiFi manager for the station interface
pub struct WiFiManager<'a> {
    controller: WifiController<'a>,
    stack: Stack<'a>,
}

impl<'a> WiFiManager<'a> {
    pub fn new(controller: WifiController<'a>, stack: Stack<'a>) -> Self {
        Self { controller, stack }
    }

    /// Associate with the network and wait for an address.
    pub async fn connect(&mut self, credentials: &NetworkCredentials) -> Result<(), BoardError> {
        if self.is_connected() && self.stack.is_config_up() {
            return Ok(());
        }

        let client_config = ClientConfiguration {
            ssid: credentials.ssid.try_into().map_err(|_| BoardError::WiFiError)?,
            password: credentials
                .passphrase
                .try_into()
                .map_err(|_| BoardError::WiFiError)?,
            auth_method: if credentials.passphrase.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        };

        self.controller
            .set_configuration(&Configuration::Client(client_config))
            .map_err(|e| {
                warn!("[WIFI] Invalid configuration: {:?}", e);
                BoardError::WiFiError
            })?;

        if !matches!(self.controller.is_started(), Ok(true)) {
            self.controller.start_async().await.map_err(|e| {
                warn!("[WIFI] Failed to start station: {:?}", e);
                BoardError::WiFiError
            })?;
        }

        self.controller.connect_async().await.map_err(|e| {
            warn!("[WIFI] Association failed: {:?}", e);
            BoardError::WiFiError
        })?;

        with_timeout(
            Duration::from_millis(config::DHCP_TIMEOUT_MS),
            self.stack.wait_config_up(),
        )
        .await
        .map_err(|_| {
            warn!("[WIFI] No DHCP lease within {} ms", config::DHCP_TIMEOUT_MS);
            BoardError::WiFiError
        })?;

        if let Some(ip) = self.get_ip_address() {
            info!("[WIFI] DHCP assigned IP address: {}", ip);
        }
        Ok(())
    }

    /// Current IPv4 address, once DHCP is done
    pub fn get_ip_address(&self) -> Option<Ipv4Address> {
        self.stack.config_v4().map(|config| config.address.address())
    }

    pub fn is_connected(&self) -> bool {
        self.controller.is_connected().unwrap_or(false)
    }
}
