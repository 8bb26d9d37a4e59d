//! Local-address probe: discover which source IPv4 the kernel would pick
//! to reach a destination, by `connect`-ing a UDP socket (no packet is
//! emitted) and reading back `getsockname`. Grounded on
//! `original_source/src/utils/network.cpp`'s `getLocalIPAddress`.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use tracing::debug;

/// Returns the local IPv4 the kernel would use to reach `dest`, or `None`
/// on any failure (socket creation, connect, or getsockname).
pub fn local_ipv4_for(dest: Ipv4Addr) -> Option<Ipv4Addr> {
    let probe = UdpSocket::bind("0.0.0.0:0").ok()?;
    // Port is arbitrary; UDP connect never emits a packet, it only
    // resolves the kernel's outbound route.
    probe
        .connect(SocketAddr::V4(SocketAddrV4::new(dest, 9)))
        .ok()?;
    let local = probe.local_addr().ok()?;
    match local {
        SocketAddr::V4(v4) => {
            debug!(dest = %dest, local = %v4.ip(), "net: resolved local source address");
            Some(*v4.ip())
        }
        SocketAddr::V6(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_probe_resolves_to_some_address() {
        let result = local_ipv4_for(Ipv4Addr::new(127, 0, 0, 1));
        assert!(result.is_some());
    }
}
