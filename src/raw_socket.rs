//! Raw `AF_INET/SOCK_RAW/IPPROTO_TCP` socket with `IP_HDRINCL` set, so the
//! kernel never touches the IP/TCP headers we build ourselves. Grounded on
//! the teacher's `Socket::new(Domain::IPV4, Type::RAW, None)` usage in
//! `src/bin/sender.rs`/`src/bin/reciever.rs`, wrapped into a reusable type
//! per `original_source/include/haquests/core/socket.hpp`.

use crate::error::{HaquestsError, Result};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::mem::MaybeUninit;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tracing::trace;

pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(5);
const RECV_TIMEOUT: Duration = DEFAULT_RECV_TIMEOUT;

/// Result of a bounded-timeout receive.
pub enum RecvOutcome {
    Data(usize),
    TimedOut,
}

pub struct RawSocket {
    inner: Socket,
}

impl RawSocket {
    /// Open `AF_INET/SOCK_RAW/IPPROTO_TCP` with `IP_HDRINCL=1` and a 5s
    /// receive timeout. Fails if the process lacks `CAP_NET_RAW`/root.
    pub fn open() -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::TCP)).map_err(|e| {
            HaquestsError::Privilege(format!("failed to create raw socket: {e}"))
        })?;
        socket.set_header_included_v4(true)?;
        socket.set_read_timeout(Some(RECV_TIMEOUT))?;
        Ok(RawSocket { inner: socket })
    }

    /// Attempt to create a throwaway raw socket; report whether the
    /// process has the capability to do so.
    pub fn has_capabilities() -> bool {
        Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::TCP)).is_ok()
    }

    /// Adjust the receive timeout. Used to shorten the poll slice during
    /// the handshake and the post-first-payload drain, then restored to
    /// the 5s default.
    pub fn set_read_timeout(&self, timeout: Duration) -> Result<()> {
        self.inner.set_read_timeout(Some(timeout))?;
        Ok(())
    }

    /// Send `bytes` to `(dst_ip, dst_port)`. The port in the `sockaddr` is
    /// informational for the kernel — the real port lives inside the TCP
    /// header we already wrote — but the kernel still requires one.
    pub fn send(&self, bytes: &[u8], dst_ip: Ipv4Addr, dst_port: u16) -> Result<usize> {
        let addr = SockAddr::from(SocketAddr::V4(SocketAddrV4::new(dst_ip, dst_port)));
        let sent = self.inner.send_to(bytes, &addr)?;
        trace!(dst = %dst_ip, port = dst_port, bytes = sent, "raw_socket: sent");
        Ok(sent)
    }

    /// Receive into `buf`, distinguishing a timeout (`RecvOutcome::TimedOut`)
    /// from a hard I/O error.
    pub fn receive(&self, buf: &mut [u8]) -> Result<RecvOutcome> {
        let uninit: &mut [MaybeUninit<u8>] =
            unsafe { std::slice::from_raw_parts_mut(buf.as_mut_ptr().cast(), buf.len()) };

        match self.inner.recv(uninit) {
            Ok(n) => Ok(RecvOutcome::Data(n)),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(RecvOutcome::TimedOut)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_capabilities_does_not_panic() {
        // Result depends on process privilege; just exercise the call.
        let _ = RawSocket::has_capabilities();
    }
}
