//! 16-bit one's-complement Internet checksum (RFC 1071), used for both the
//! IPv4 header checksum and, with a prepended pseudo-header, the TCP
//! checksum. Grounded on `Tcp::calculate_checksum` in the teacher's
//! `src/tcp.rs`, generalized to a standalone function usable over an IP
//! header buffer too.

use std::net::Ipv4Addr;

/// Sum `bytes` as big-endian 16-bit words, folding carries, and return the
/// one's complement. An odd trailing byte is treated as the high byte of a
/// final word whose low byte is zero.
pub fn checksum(bytes: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut chunks = bytes.chunks_exact(2);

    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }
    if let [last] = chunks.remainder() {
        sum += (*last as u32) << 8;
    }

    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !(sum as u16)
}

/// Returns true iff the checksum of `bytes` (with the checksum field
/// already folded in) sums to zero.
pub fn verify(bytes: &[u8]) -> bool {
    checksum(bytes) == 0
}

/// TCP checksum: pseudo-header (src|dst|0|6|tcp_length) prefixed to the
/// full TCP segment (header + payload), summed as one buffer.
pub fn tcp_checksum(src_ip: Ipv4Addr, dst_ip: Ipv4Addr, tcp_segment: &[u8]) -> u16 {
    let tcp_length = tcp_segment.len() as u16;
    let mut pseudo = Vec::with_capacity(12 + tcp_segment.len());
    pseudo.extend_from_slice(&src_ip.octets());
    pseudo.extend_from_slice(&dst_ip.octets());
    pseudo.push(0);
    pseudo.push(6); // IPPROTO_TCP
    pseudo.extend_from_slice(&tcp_length.to_be_bytes());
    pseudo.extend_from_slice(tcp_segment);

    checksum(&pseudo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_of_self_plus_complement_folds_to_zero() {
        let data = [0x45u8, 0x00, 0x00, 0x3c, 0x1c, 0x46, 0x40, 0x00, 0x40, 0x06];
        let mut buf = data.to_vec();
        buf.extend_from_slice(&[0, 0]); // checksum field, zeroed
        let sum = checksum(&buf);
        buf[10] = (sum >> 8) as u8;
        buf[11] = (sum & 0xFF) as u8;
        assert!(verify(&buf));
    }

    #[test]
    fn odd_length_buffer_is_handled() {
        let data = [0x00u8, 0x50, 0x1F];
        // Must not panic and must be deterministic.
        let a = checksum(&data);
        let b = checksum(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn tcp_checksum_reference_is_nonzero_and_verifies() {
        let src = Ipv4Addr::new(127, 0, 0, 1);
        let dst = Ipv4Addr::new(127, 0, 0, 1);
        let segment = [0x00u8, 0x50, 0x1F, 0x90];
        let sum = tcp_checksum(src, dst, &segment);
        assert_ne!(sum, 0);

        // Placed into a zeroed checksum field, the header must verify.
        let mut pseudo = Vec::new();
        pseudo.extend_from_slice(&src.octets());
        pseudo.extend_from_slice(&dst.octets());
        pseudo.push(0);
        pseudo.push(6);
        pseudo.extend_from_slice(&(segment.len() as u16).to_be_bytes());
        pseudo.extend_from_slice(&segment);
        // segment itself has no checksum field here; verify via recomputation
        assert_eq!(checksum(&pseudo), !sum);
    }

    #[test]
    fn checksum_is_commutative_over_word_order_independent_of_grouping() {
        let a = [0x12u8, 0x34, 0x56, 0x78];
        let b = [0x56u8, 0x78, 0x12, 0x34];
        assert_eq!(checksum(&a), checksum(&b));
    }
}
