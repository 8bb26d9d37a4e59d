//! The raw-socket TCP engine: handshake, ordered send, filtering receive
//! loop, and best-effort close. This is the hardest and most
//! spec-central component — the `Connection::Impl` in
//! `original_source/src/tcp/connection.cpp` describes the shape (a TCB,
//! a raw socket, a state machine) but its on-disk revision is an early
//! stub (no SYN-ACK wait, no filtering, no ack tracking); the full
//! handshake/filter/drain behavior below follows the spec's own
//! prose description of the complete engine instead.

use crate::error::{HaquestsError, Result};
use crate::flags::TcpFlags;
use crate::net::local_ipv4_for;
use crate::packet::{build_segment, parse_segment, Ipv4Header, TcpHeader};
use crate::raw_socket::{RawSocket, RecvOutcome, DEFAULT_RECV_TIMEOUT};
use crate::state_machine::{StateMachine, TcpState};
use rand::Rng;
use std::marker::PhantomData;
use std::net::{Ipv4Addr, ToSocketAddrs};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

const HANDSHAKE_BUDGET: Duration = Duration::from_secs(5);
const HANDSHAKE_POLL_SLICE: Duration = Duration::from_millis(100);
const RECEIVE_DEADLINE: Duration = Duration::from_secs(30);
const RECEIVE_MAX_ATTEMPTS: u32 = 100;
const RECEIVE_DRAIN_ATTEMPTS: u32 = 10;
const RECEIVE_DRAIN_SLICE: Duration = Duration::from_millis(50);
const SRC_PORT_RANGE: std::ops::RangeInclusive<u16> = 10000..=65535;
const MAX_SEGMENT: usize = 65535;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpEndpoint {
    pub addr: Ipv4Addr,
    pub port: u16,
}

struct Tcb {
    state: StateMachine,
    snd_nxt: u32,
    rcv_nxt: u32,
    local: TcpEndpoint,
    remote: TcpEndpoint,
}

/// Result of a single raw-socket read plus 4-tuple filter, distinguishing
/// "nothing arrived before the poll slice elapsed" from "something
/// arrived but wasn't ours" — callers that are draining a flow need to
/// keep polling through the latter without mistaking it for the former.
enum FilterOutcome {
    TimedOut,
    Skipped,
    Data(Vec<u8>),
}

/// A raw-socket-backed TCP connection. Strictly single-threaded: every
/// mutating method takes `&mut self`, and the connection additionally
/// carries a `PhantomData<*const ()>` marker so it is neither `Send` nor
/// `Sync` — concurrent use from multiple threads is a compile error, not
/// just a documented contract.
pub struct TcpConnection {
    tcb: Tcb,
    socket: RawSocket,
    _not_shareable: PhantomData<*const ()>,
}

impl TcpConnection {
    /// Resolve `host`, probe the local source address, pick a random
    /// source port, open the raw socket, and run the three-way handshake.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let remote_ip = resolve_ipv4(host)?;
        let local_ip = local_ipv4_for(remote_ip)
            .ok_or_else(|| HaquestsError::Resolution("could not determine local address".into()))?;
        let src_port = rand::thread_rng().gen_range(SRC_PORT_RANGE);

        let socket = RawSocket::open()?;

        let local = TcpEndpoint {
            addr: local_ip,
            port: src_port,
        };
        let remote = TcpEndpoint {
            addr: remote_ip,
            port,
        };

        let mut tcb = Tcb {
            state: StateMachine::new(),
            snd_nxt: 0,
            rcv_nxt: 0,
            local,
            remote,
        };

        perform_handshake(&socket, &mut tcb)?;

        Ok(TcpConnection {
            tcb,
            socket,
            _not_shareable: PhantomData,
        })
    }

    pub fn state(&self) -> TcpState {
        self.tcb.state.state()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == TcpState::Established
    }

    pub fn local(&self) -> TcpEndpoint {
        self.tcb.local
    }

    pub fn remote(&self) -> TcpEndpoint {
        self.tcb.remote
    }

    /// Send `data` as a single PSH|ACK segment. Legal only in
    /// `ESTABLISHED`. No segmentation, no retransmission — the caller
    /// dictates the exact bytes on the wire, which is the entire point
    /// for smuggling research.
    pub fn send(&mut self, data: &[u8]) -> Result<usize> {
        if self.state() != TcpState::Established {
            return Err(HaquestsError::Connection(
                "send on a connection that is not ESTABLISHED".into(),
            ));
        }

        let segment = build_segment(
            self.tcb.local.addr,
            self.tcb.remote.addr,
            self.tcb.local.port,
            self.tcb.remote.port,
            self.tcb.snd_nxt,
            self.tcb.rcv_nxt,
            TcpFlags::PSH | TcpFlags::ACK,
            data,
        );

        self.socket
            .send(&segment, self.tcb.remote.addr, self.tcb.remote.port)?;
        self.tcb.snd_nxt = self.tcb.snd_nxt.wrapping_add(data.len() as u32);
        Ok(data.len())
    }

    /// Drain the raw socket of segments matching this connection's
    /// 4-tuple, accumulating payload bytes until either some data has
    /// arrived and quiets down, or the 30s deadline/100-attempt bound is
    /// hit. Unrelated segments on the interface are silently dropped.
    pub fn receive(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let deadline = Instant::now() + RECEIVE_DEADLINE;
        let mut accumulator = Vec::new();
        let mut attempts = 0u32;

        while accumulator.is_empty() && attempts < RECEIVE_MAX_ATTEMPTS && Instant::now() < deadline
        {
            attempts += 1;
            match self.recv_and_filter()? {
                FilterOutcome::Data(payload) => accumulator.extend_from_slice(&payload),
                FilterOutcome::TimedOut | FilterOutcome::Skipped => continue,
            }
        }

        if !accumulator.is_empty() {
            self.socket.set_read_timeout(RECEIVE_DRAIN_SLICE)?;
            for _ in 0..RECEIVE_DRAIN_ATTEMPTS {
                if Instant::now() >= deadline {
                    break;
                }
                match self.recv_and_filter()? {
                    FilterOutcome::Data(payload) => accumulator.extend_from_slice(&payload),
                    // A stray foreign or malformed packet interleaved on the
                    // interface doesn't mean the flow has gone quiet — keep
                    // burning through the attempt bound. Only a genuine
                    // timeout (nothing arrived within the quick poll slice)
                    // means draining is actually done.
                    FilterOutcome::Skipped => continue,
                    FilterOutcome::TimedOut => break,
                }
            }
            self.socket.set_read_timeout(DEFAULT_RECV_TIMEOUT)?;
        }

        if accumulator.len() > max_len {
            accumulator.truncate(max_len);
        }
        Ok(accumulator)
    }

    /// One raw-socket read plus 4-tuple filter.
    fn recv_and_filter(&mut self) -> Result<FilterOutcome> {
        let mut buf = [0u8; MAX_SEGMENT];
        let n = match self.socket.receive(&mut buf)? {
            RecvOutcome::TimedOut => return Ok(FilterOutcome::TimedOut),
            RecvOutcome::Data(n) => n,
        };

        let (ip, tcp, payload) = match parse_segment(&buf[..n]) {
            Ok(parsed) => parsed,
            Err(_) => return Ok(FilterOutcome::Skipped),
        };

        Ok(filter_segment(&mut self.tcb, &ip, &tcp, payload))
    }

    /// Best-effort close: emit FIN+ACK if established, then release the
    /// socket. Does not wait for the peer's FIN. Idempotent, never
    /// raises.
    pub fn close(&mut self) {
        if self.state() == TcpState::Established {
            let segment = build_segment(
                self.tcb.local.addr,
                self.tcb.remote.addr,
                self.tcb.local.port,
                self.tcb.remote.port,
                self.tcb.snd_nxt,
                self.tcb.rcv_nxt,
                TcpFlags::FIN | TcpFlags::ACK,
                &[],
            );
            if let Err(e) = self
                .socket
                .send(&segment, self.tcb.remote.addr, self.tcb.remote.port)
            {
                warn!(error = %e, "connection: failed to send FIN on close");
            }
            self.tcb.state.send_fin();
        }
        self.tcb.state.close();
    }
}

impl Drop for TcpConnection {
    fn drop(&mut self) {
        self.close();
    }
}

/// The actual 4-tuple filtering decision, pulled out of
/// `TcpConnection::recv_and_filter` so it can be driven directly in
/// tests without a real socket. A segment that doesn't match this
/// connection's (remote addr, local addr, remote port, local port) is
/// dropped without touching `rcv_nxt`.
fn filter_segment(tcb: &mut Tcb, ip: &Ipv4Header, tcp: &TcpHeader, payload: &[u8]) -> FilterOutcome {
    if ip.src != tcb.remote.addr
        || ip.dst != tcb.local.addr
        || tcp.src_port != tcb.remote.port
        || tcp.dst_port != tcb.local.port
    {
        trace!("connection: dropped segment from foreign 4-tuple");
        return FilterOutcome::Skipped;
    }

    if payload.is_empty() {
        return FilterOutcome::Skipped;
    }

    // Idempotent: a retransmission with the same seq re-sets rcv_nxt to
    // the same absolute value.
    tcb.rcv_nxt = tcp.seq.wrapping_add(payload.len() as u32);
    FilterOutcome::Data(payload.to_vec())
}

fn resolve_ipv4(host: &str) -> Result<Ipv4Addr> {
    (host, 0)
        .to_socket_addrs()
        .map_err(|e| HaquestsError::Resolution(format!("DNS lookup for {host} failed: {e}")))?
        .find_map(|addr| match addr.ip() {
            std::net::IpAddr::V4(v4) => Some(v4),
            std::net::IpAddr::V6(_) => None,
        })
        .ok_or_else(|| HaquestsError::Resolution(format!("no A record for {host}")))
}

fn perform_handshake(socket: &RawSocket, tcb: &mut Tcb) -> Result<()> {
    let isn: u32 = rand::thread_rng().gen();
    tcb.snd_nxt = isn;
    tcb.rcv_nxt = 0;

    let syn = build_segment(
        tcb.local.addr,
        tcb.remote.addr,
        tcb.local.port,
        tcb.remote.port,
        isn,
        0,
        TcpFlags::SYN,
        &[],
    );
    socket.send(&syn, tcb.remote.addr, tcb.remote.port)?;
    tcb.state.send_syn();
    debug!(remote = %tcb.remote.addr, port = tcb.remote.port, "connection: SYN sent");

    socket.set_read_timeout(HANDSHAKE_POLL_SLICE)?;
    let deadline = Instant::now() + HANDSHAKE_BUDGET;
    let mut buf = [0u8; MAX_SEGMENT];

    let result = loop {
        if Instant::now() >= deadline {
            break Err(HaquestsError::Connection(
                "handshake timed out waiting for SYN-ACK".into(),
            ));
        }

        let n = match socket.receive(&mut buf)? {
            RecvOutcome::TimedOut => continue,
            RecvOutcome::Data(n) => n,
        };

        let (ip, tcp, _payload) = match parse_segment(&buf[..n]) {
            Ok(parsed) => parsed,
            Err(_) => continue,
        };

        let matches_four_tuple = ip.src == tcb.remote.addr
            && ip.dst == tcb.local.addr
            && tcp.src_port == tcb.remote.port
            && tcp.dst_port == tcb.local.port;

        if !matches_four_tuple {
            continue;
        }

        if tcp.flags.contains(TcpFlags::RST) {
            break Err(HaquestsError::Connection(
                "connection refused: received RST during handshake".into(),
            ));
        }

        if tcp.flags.contains(TcpFlags::SYN | TcpFlags::ACK) && tcp.ack == isn.wrapping_add(1) {
            tcb.snd_nxt = isn.wrapping_add(1);
            tcb.rcv_nxt = tcp.seq.wrapping_add(1);
            tcb.state.recv_synack();
            break Ok(());
        }
    };

    socket.set_read_timeout(DEFAULT_RECV_TIMEOUT)?;
    result?;

    let ack = build_segment(
        tcb.local.addr,
        tcb.remote.addr,
        tcb.local.port,
        tcb.remote.port,
        tcb.snd_nxt,
        tcb.rcv_nxt,
        TcpFlags::ACK,
        &[],
    );
    socket.send(&ack, tcb.remote.addr, tcb.remote.port)?;
    debug!("connection: handshake complete, ESTABLISHED");

    Ok(())
}
