//! IPv4 + TCP header assembly and parsing. Grounded on the teacher's
//! `Tcp::to_bytes`/`TryFrom<&[u8]> for Tcp` (`src/tcp.rs`), extended with an
//! IPv4 header per `original_source/include/haquests/core/packet.hpp`
//! (the teacher never modeled the IP layer, only TCP).

use crate::checksum::{checksum, tcp_checksum};
use crate::error::{HaquestsError, Result};
use crate::flags::TcpFlags;
use rand::Rng;
use std::net::Ipv4Addr;

pub const IP_HEADER_LEN: usize = 20;
pub const TCP_HEADER_LEN: usize = 20;
const DEFAULT_TTL: u8 = 64;
const DEFAULT_WINDOW: u16 = 65535;
const IPPROTO_TCP: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub id: u16,
    pub total_length: u16,
    pub ttl: u8,
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub checksum: u16,
}

impl Ipv4Header {
    pub fn to_bytes(&self) -> [u8; IP_HEADER_LEN] {
        let mut b = [0u8; IP_HEADER_LEN];
        b[0] = (4 << 4) | 5; // version 4, IHL 5 (20 bytes)
        b[1] = 0; // tos
        b[2..4].copy_from_slice(&self.total_length.to_be_bytes());
        b[4..6].copy_from_slice(&self.id.to_be_bytes());
        b[6..8].copy_from_slice(&0u16.to_be_bytes()); // frag_off
        b[8] = self.ttl;
        b[9] = IPPROTO_TCP;
        b[10..12].copy_from_slice(&self.checksum.to_be_bytes());
        b[12..16].copy_from_slice(&self.src.octets());
        b[16..20].copy_from_slice(&self.dst.octets());
        b
    }

    pub fn parse(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < IP_HEADER_LEN {
            return Err(HaquestsError::Parse("IPv4 header truncated".into()));
        }
        let ihl = ((bytes[0] & 0x0F) as usize) * 4;
        if bytes.len() < ihl {
            return Err(HaquestsError::Parse("IPv4 header length exceeds buffer".into()));
        }
        let total_length = u16::from_be_bytes([bytes[2], bytes[3]]);
        let id = u16::from_be_bytes([bytes[4], bytes[5]]);
        let ttl = bytes[8];
        let checksum = u16::from_be_bytes([bytes[10], bytes[11]]);
        let src = Ipv4Addr::new(bytes[12], bytes[13], bytes[14], bytes[15]);
        let dst = Ipv4Addr::new(bytes[16], bytes[17], bytes[18], bytes[19]);
        Ok((
            Ipv4Header {
                id,
                total_length,
                ttl,
                src,
                dst,
                checksum,
            },
            ihl,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub flags: TcpFlags,
    pub window: u16,
    pub checksum: u16,
}

impl TcpHeader {
    pub fn to_bytes(&self) -> [u8; TCP_HEADER_LEN] {
        let mut b = [0u8; TCP_HEADER_LEN];
        b[0..2].copy_from_slice(&self.src_port.to_be_bytes());
        b[2..4].copy_from_slice(&self.dst_port.to_be_bytes());
        b[4..8].copy_from_slice(&self.seq.to_be_bytes());
        b[8..12].copy_from_slice(&self.ack.to_be_bytes());
        b[12] = (5 << 4) | 0; // data offset 5 (20 bytes), reserved 0
        b[13] = self.flags.bits();
        b[14..16].copy_from_slice(&self.window.to_be_bytes());
        b[16..18].copy_from_slice(&self.checksum.to_be_bytes());
        b[18..20].copy_from_slice(&0u16.to_be_bytes()); // urgent_ptr
        b
    }

    pub fn parse(bytes: &[u8]) -> Result<(Self, usize)> {
        if bytes.len() < TCP_HEADER_LEN {
            return Err(HaquestsError::Parse("TCP header truncated".into()));
        }
        let data_offset = ((bytes[12] >> 4) as usize) * 4;
        if bytes.len() < data_offset {
            return Err(HaquestsError::Parse("TCP data offset exceeds buffer".into()));
        }
        let header = TcpHeader {
            src_port: u16::from_be_bytes([bytes[0], bytes[1]]),
            dst_port: u16::from_be_bytes([bytes[2], bytes[3]]),
            seq: u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            ack: u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            flags: TcpFlags::from_bits_truncate(bytes[13]),
            window: u16::from_be_bytes([bytes[14], bytes[15]]),
            checksum: u16::from_be_bytes([bytes[16], bytes[17]]),
        };
        Ok((header, data_offset))
    }
}

/// Assemble a complete IP+TCP segment: 20-byte IP header, 20-byte TCP
/// header (no options emitted on either), payload. Follows the
/// three-step procedure contract: fill IP fields and checksum them, then
/// fill TCP fields and checksum header+pseudo-header+payload.
pub fn build_segment(
    src_ip: Ipv4Addr,
    dst_ip: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    seq: u32,
    ack: u32,
    flags: TcpFlags,
    payload: &[u8],
) -> Vec<u8> {
    let total_length = (IP_HEADER_LEN + TCP_HEADER_LEN + payload.len()) as u16;
    let id: u16 = rand::thread_rng().gen();

    let mut ip_header = Ipv4Header {
        id,
        total_length,
        ttl: DEFAULT_TTL,
        src: src_ip,
        dst: dst_ip,
        checksum: 0,
    };
    ip_header.checksum = checksum(&ip_header.to_bytes());

    let mut tcp_header = TcpHeader {
        src_port,
        dst_port,
        seq,
        ack,
        flags,
        window: DEFAULT_WINDOW,
        checksum: 0,
    };

    let mut tcp_segment = Vec::with_capacity(TCP_HEADER_LEN + payload.len());
    tcp_segment.extend_from_slice(&tcp_header.to_bytes());
    tcp_segment.extend_from_slice(payload);
    tcp_header.checksum = tcp_checksum(src_ip, dst_ip, &tcp_segment);

    let mut packet = Vec::with_capacity(total_length as usize);
    packet.extend_from_slice(&ip_header.to_bytes());
    packet.extend_from_slice(&tcp_header.to_bytes());
    packet.extend_from_slice(payload);
    packet
}

/// Parse a raw inbound buffer (as delivered whole by the raw socket) into
/// its IP header, TCP header, and trailing payload slice.
pub fn parse_segment(buf: &[u8]) -> Result<(Ipv4Header, TcpHeader, &[u8])> {
    let (ip_header, ip_header_len) = Ipv4Header::parse(buf)?;
    if buf.len() < ip_header_len {
        return Err(HaquestsError::Parse("buffer shorter than IP header".into()));
    }
    let (tcp_header, tcp_header_len) = TcpHeader::parse(&buf[ip_header_len..])?;
    let total_header_len = ip_header_len + tcp_header_len;
    if buf.len() < total_header_len {
        return Err(HaquestsError::Parse(
            "buffer shorter than IP+TCP headers".into(),
        ));
    }
    Ok((ip_header, tcp_header, &buf[total_header_len..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_round_trips_all_fields() {
        let src = Ipv4Addr::new(10, 0, 0, 1);
        let dst = Ipv4Addr::new(10, 0, 0, 2);
        let payload = b"GET / HTTP/1.1\r\n\r\n";
        let packet = build_segment(
            src,
            dst,
            49152,
            80,
            0x1234_5678,
            0x8765_4321,
            TcpFlags::PSH | TcpFlags::ACK,
            payload,
        );

        let (ip, tcp, body) = parse_segment(&packet).unwrap();
        assert_eq!(ip.src, src);
        assert_eq!(ip.dst, dst);
        assert_eq!(tcp.src_port, 49152);
        assert_eq!(tcp.dst_port, 80);
        assert_eq!(tcp.seq, 0x1234_5678);
        assert_eq!(tcp.ack, 0x8765_4321);
        assert!(tcp.flags.contains(TcpFlags::PSH));
        assert!(tcp.flags.contains(TcpFlags::ACK));
        assert_eq!(body, payload);

        assert!(verify_ip_checksum(&packet));
    }

    fn verify_ip_checksum(packet: &[u8]) -> bool {
        crate::checksum::verify(&packet[0..IP_HEADER_LEN])
    }

    #[test]
    fn odd_payload_length_still_checksums_correctly() {
        let src = Ipv4Addr::new(127, 0, 0, 1);
        let dst = Ipv4Addr::new(127, 0, 0, 1);
        let payload = b"odd"; // 3 bytes, odd length
        let packet = build_segment(src, dst, 1, 2, 0, 0, TcpFlags::SYN, payload);
        let (_, _, body) = parse_segment(&packet).unwrap();
        assert_eq!(body, payload);
    }

    #[test]
    fn parse_rejects_truncated_buffer() {
        let buf = [0u8; 10];
        assert!(parse_segment(&buf).is_err());
    }
}
