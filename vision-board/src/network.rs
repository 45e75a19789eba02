//! `NetworkStack` binding: WiFi station, mDNS registration and the single-client TCP channel

use crate::mdns;
use crate::wifi::WiFiManager;
use crate::{BoardError, config};
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, Stack};
use embassy_time::{Duration, with_timeout};
use log::{info, warn};
use vision_core::config::NetworkCredentials;
use vision_core::mdns::MDNS_GROUP;
use vision_core::{Incoming, NetworkStack};

/// WiFi station plus the TCP listener for one command client
pub struct BoardNetwork<'a> {
    wifi: WiFiManager<'a>,
    stack: Stack<'a>,
    socket: TcpSocket<'a>,
    port: u16,
    client_attached: bool,
}

impl<'a> BoardNetwork<'a> {
    pub fn new(
        wifi: WiFiManager<'a>,
        stack: Stack<'a>,
        rx_buffer: &'a mut [u8],
        tx_buffer: &'a mut [u8],
        port: u16,
    ) -> Self {
        Self {
            wifi,
            stack,
            socket: TcpSocket::new(stack, rx_buffer, tx_buffer),
            port,
            client_attached: false,
        }
    }

    fn poll_timeout() -> Duration {
        Duration::from_millis(config::POLL_TIMEOUT_MS)
    }

    async fn accept(&mut self) -> Incoming {
        match with_timeout(Self::poll_timeout(), self.socket.accept(self.port)).await {
            Ok(Ok(())) => {
                self.socket
                    .set_keep_alive(Some(Duration::from_secs(config::TCP_KEEP_ALIVE_SECS)));
                self.socket
                    .set_timeout(Some(Duration::from_secs(config::TCP_KEEP_ALIVE_SECS * 3)));
                info!("[TCP] Client {:?} connected", self.socket.remote_endpoint());
                self.client_attached = true;
                Incoming::ClientConnected
            }
            Ok(Err(e)) => {
                warn!("[TCP] Accept failed: {:?}", e);
                self.socket.abort();
                Incoming::Nothing
            }
            Err(_) => Incoming::Nothing,
        }
    }

    async fn drop_client(&mut self) {
        self.client_attached = false;
        self.socket.abort();
        // Let the reset go out before the socket listens again
        let _ = with_timeout(Duration::from_millis(100), self.socket.flush()).await;
    }
}

impl NetworkStack for BoardNetwork<'_> {
    async fn join(&mut self, credentials: &NetworkCredentials) -> Result<(), BoardError> {
        self.wifi.connect(credentials).await
    }

    async fn register_discovery(&mut self, name: &str) -> Result<(), BoardError> {
        if !mdns::is_valid_host(name) {
            warn!("[MDNS] '{}' is not a valid host label", name);
            return Err(BoardError::MdnsError);
        }
        let ip = self.wifi.get_ip_address().ok_or(BoardError::MdnsError)?;
        self.stack
            .join_multicast_group(IpAddress::Ipv4(MDNS_GROUP))
            .map_err(|e| {
                warn!("[MDNS] Failed to join multicast group: {:?}", e);
                BoardError::MdnsError
            })?;
        mdns::HOST_ADDRESS.signal(ip);
        Ok(())
    }

    async fn poll(&mut self) -> Incoming {
        if !self.client_attached {
            return self.accept().await;
        }

        let mut byte = [0u8; 1];
        match with_timeout(Self::poll_timeout(), self.socket.read(&mut byte)).await {
            Ok(Ok(0)) => {
                info!("[TCP] Client closed the connection");
                self.drop_client().await;
                Incoming::ClientDisconnected
            }
            Ok(Ok(_)) => Incoming::Byte(byte[0]),
            Ok(Err(e)) => {
                warn!("[TCP] Read failed: {:?}", e);
                self.drop_client().await;
                Incoming::ClientDisconnected
            }
            Err(_) => Incoming::Nothing,
        }
    }
}
