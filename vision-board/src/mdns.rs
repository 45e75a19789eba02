//! mDNS responder
//!
//! Waits until the network binding publishes the board's address, then answers A queries for
//! `<host>.local` and re-announces the record periodically.

use crate::config;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpAddress, IpEndpoint, Ipv4Address, Stack};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, with_timeout};
use log::{debug, error, info, warn};
use vision_core::mdns::{MDNS_GROUP, MDNS_PORT, build_answer, is_query_for};

/// Largest answer we ever build
pub const ANSWER_BUFFER: usize = 96;

/// Address to advertise, published once registration succeeds
pub static HOST_ADDRESS: Signal<CriticalSectionRawMutex, Ipv4Address> = Signal::new();

/// Whether `host` can be advertised at all
pub fn is_valid_host(host: &str) -> bool {
    let mut scratch = [0u8; ANSWER_BUFFER];
    build_answer(&mut scratch, host, Ipv4Address::UNSPECIFIED).is_some()
}

/// Serve `<host>.local` forever once an address has been published.
pub async fn run_responder(stack: Stack<'static>, host: &'static str) {
    let ip = HOST_ADDRESS.wait().await;

    let mut answer = [0u8; ANSWER_BUFFER];
    let Some(answer_len) = build_answer(&mut answer, host, ip) else {
        error!("[MDNS] Host name '{}' cannot be advertised", host);
        return;
    };
    let answer = &answer[..answer_len];

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; 512];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buffer = [0u8; 512];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if let Err(e) = socket.bind(MDNS_PORT) {
        error!("[MDNS] Failed to bind port {}: {:?}", MDNS_PORT, e);
        return;
    }
    info!("[MDNS] Responding for {}.local at {}", host, ip);

    let group = IpEndpoint::new(IpAddress::Ipv4(MDNS_GROUP), MDNS_PORT);
    let announce_every = Duration::from_secs(config::MDNS_ANNOUNCE_INTERVAL_SECS);

    if let Err(e) = socket.send_to(answer, group).await {
        warn!("[MDNS] Initial announcement failed: {:?}", e);
    }
    let mut last_announcement = Instant::now();

    let mut packet = [0u8; 512];
    loop {
        if last_announcement.elapsed() >= announce_every {
            if let Err(e) = socket.send_to(answer, group).await {
                warn!("[MDNS] Periodic announcement failed: {:?}", e);
            }
            last_announcement = Instant::now();
        }

        match with_timeout(Duration::from_secs(1), socket.recv_from(&mut packet)).await {
            Ok(Ok((len, meta))) => {
                if is_query_for(&packet[..len], host) {
                    debug!("[MDNS] Query from {:?}", meta.endpoint);
                    if let Err(e) = socket.send_to(answer, group).await {
                        warn!("[MDNS] Response failed: {:?}", e);
                    }
                }
            }
            Ok(Err(e)) => warn!("[MDNS] Receive error: {:?}", e),
            Err(_) => {}
        }
    }
}
