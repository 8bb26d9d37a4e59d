//! Chunked transfer-coding (RFC 7230 §4.1). Grounded on
//! `original_source/src/http/chunked.cpp`'s `encode`/`decode`/
//! `parseChunkSize`, kept equally permissive on decode: a truncated
//! final chunk is dropped silently rather than raising, since this
//! module exists to build and inspect smuggling payloads, not to reject
//! malformed ones.

/// Wrap `data` as a single chunk followed by the terminating zero-chunk.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 16);
    out.extend_from_slice(format!("{:x}\r\n", data.len()).as_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(b"0\r\n\r\n");
    out
}

/// Decode a full chunked body into its concatenated chunk data. Any
/// chunk whose declared size runs past the end of `data` is dropped
/// rather than erroring — matches the original's silent-truncation
/// behavior.
pub fn decode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut pos = 0usize;

    while pos < data.len() {
        let (chunk_size, consumed) = match parse_chunk_size(&data[pos..]) {
            Some(v) => v,
            None => break,
        };
        pos += consumed;

        if chunk_size == 0 {
            break;
        }

        if pos + chunk_size <= data.len() {
            out.extend_from_slice(&data[pos..pos + chunk_size]);
            pos += chunk_size;
        } else {
            break;
        }

        if pos + 2 <= data.len() {
            pos += 2;
        }
    }

    out
}

/// Parse one `<hex-size>[;ext]\r\n` line. Returns `(chunk_size,
/// bytes_consumed)`, where `bytes_consumed` includes the trailing `\n`.
/// Returns `None` if no hex digits were found at all.
fn parse_chunk_size(data: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i < data.len() && data[i].is_ascii_hexdigit() {
        i += 1;
    }
    if i == 0 {
        return None;
    }

    let hex_str = std::str::from_utf8(&data[..i]).ok()?;
    let chunk_size = usize::from_str_radix(hex_str, 16).ok()?;

    while i < data.len() && data[i] != b'\n' {
        i += 1;
    }
    if i < data.len() {
        i += 1;
    }

    Some((chunk_size, i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_wraps_single_chunk_with_terminator() {
        let encoded = encode(b"hello");
        assert_eq!(encoded, b"5\r\nhello\r\n0\r\n\r\n");
    }

    #[test]
    fn decode_reconstructs_single_chunk() {
        let decoded = decode(b"5\r\nhello\r\n0\r\n\r\n");
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn decode_concatenates_multiple_chunks() {
        let decoded = decode(b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n");
        assert_eq!(decoded, b"Wikipedia");
    }

    #[test]
    fn decode_drops_truncated_final_chunk_without_erroring() {
        let decoded = decode(b"a\r\nshort");
        assert!(decoded.is_empty());
    }
}
