//! LAN address detection for the capture-side discovery push.
//!
//! The review client runs on a phone, so `localhost` is useless to it; the
//! hub needs the address a device on the same network would dial.

use std::net::{IpAddr, UdpSocket};

use tracing::debug;

/// Best-effort detection of this host's outbound LAN address.
///
/// Binds a UDP socket and "connects" it to a public address - no packet is
/// sent, but the OS picks the outbound interface, and that interface's
/// address is the one a phone on the same network can reach. Loopback
/// means detection failed.
pub fn detect_lan_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0)).ok()?;
    socket.connect(("8.8.8.8", 80)).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_loopback() {
        None
    } else {
        Some(ip)
    }
}

/// The WebSocket address advertised to capture peers on registration.
pub fn advertise_address(override_addr: Option<&str>, port: u16) -> String {
    if let Some(addr) = override_addr {
        return addr.to_string();
    }
    let host = detect_lan_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "localhost".to_string());
    debug!(host = %host, "detected advertise host");
    format!("ws://{host}:{port}/ws")
}
