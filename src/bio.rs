//! Byte-stream façade over a `TcpConnection`, so a standard TLS stack can
//! drive it through `std::io::{Read, Write}`. Grounded on
//! `original_source/src/tls/bio_adapter.cpp`'s `BIOAdapter::bioRead`
//! pull-ahead-buffer logic — `TcpConnection::receive` can hand back more
//! bytes than the TLS engine asked for (it reads whole packet payloads),
//! so the adapter holds the remainder for the next call.

use crate::connection::TcpConnection;
use std::io::{self, Read, Write};

/// Borrows the connection rather than owning it: dropping the adapter
/// does not close the connection underneath it.
pub struct BioAdapter<'a> {
    conn: &'a mut TcpConnection,
    pending: Vec<u8>,
    offset: usize,
}

impl<'a> BioAdapter<'a> {
    pub fn new(conn: &'a mut TcpConnection) -> Self {
        BioAdapter {
            conn,
            pending: Vec::new(),
            offset: 0,
        }
    }
}

impl Read for BioAdapter<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let buffered = self.pending.len() - self.offset;
        if buffered > 0 {
            let n = buffered.min(out.len());
            out[..n].copy_from_slice(&self.pending[self.offset..self.offset + n]);
            self.offset += n;
            if self.offset >= self.pending.len() {
                self.pending.clear();
                self.offset = 0;
            }
            return Ok(n);
        }

        let received = self
            .conn
            .receive(out.len())
            .map_err(|e| io::Error::other(e.to_string()))?;

        if received.is_empty() {
            // TcpConnection::receive already waited out its own bounded
            // deadline; no more data is coming right now. `Ok(0)` is the
            // blocking-stream convention rustls expects here, standing in
            // for the C++ source's BIO_set_retry_read signal.
            return Ok(0);
        }

        if received.len() <= out.len() {
            out[..received.len()].copy_from_slice(&received);
            Ok(received.len())
        } else {
            out.copy_from_slice(&received[..out.len()]);
            self.pending = received[out.len()..].to_vec();
            self.offset = 0;
            Ok(out.len())
        }
    }
}

impl Write for BioAdapter<'_> {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.conn
            .send(data)
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
