//! Local network address discovery
//!
//! Used only to build the shareable URLs printed at startup and embedded
//! in the landing page; timer correctness never depends on it.

use std::net::UdpSocket;

/// Best-effort LAN address of this host.
///
/// Opens a UDP socket toward a public address to learn which local
/// interface the OS would route through; no packet is sent. Falls back to
/// the loopback address when the host has no route.
pub fn lan_ip() -> String {
    probe().unwrap_or_else(|_| "127.0.0.1".to_string())
}

fn probe() -> std::io::Result<String> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    Ok(socket.local_addr()?.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lan_ip_is_a_parseable_address() {
        let ip = lan_ip();
        assert!(ip.parse::<std::net::IpAddr>().is_ok(), "got {ip}");
    }
}
