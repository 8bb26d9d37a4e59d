//! TLS session persistence as an opaque byte blob. Grounded on
//! `original_source/src/tls/session.cpp`'s `Session` class
//! (`save`/`load`/`saveToFile`/`loadFromFile`), translated from
//! OpenSSL's `SSL_SESSION*` handle into a plain owned buffer — rustls
//! exposes session tickets as opaque bytes to begin with, so there's no
//! pointer lifetime to manage here.

use crate::error::{HaquestsError, Result};
use std::fs;
use std::path::Path;

/// An opaque, resumable TLS session ticket. Carries no interpretation of
/// its own bytes; callers obtain one from wherever their TLS stack
/// exposes ticket material and feed it back in on a later connection
/// attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTicket {
    data: Vec<u8>,
}

impl SessionTicket {
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        SessionTicket { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_valid(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.data.is_empty() {
            return Err(HaquestsError::Tls("no session data to save".into()));
        }
        fs::write(path, &self.data)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path)?;
        if data.is_empty() {
            return Err(HaquestsError::Tls("session file is empty".into()));
        }
        Ok(SessionTicket { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ticket_is_invalid() {
        let ticket = SessionTicket::default();
        assert!(!ticket.is_valid());
    }

    #[test]
    fn round_trips_through_a_file() {
        let dir = std::env::temp_dir().join(format!("haquests-session-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ticket.bin");

        let ticket = SessionTicket::from_bytes(vec![1, 2, 3, 4]);
        ticket.save_to_file(&path).unwrap();

        let loaded = SessionTicket::load_from_file(&path).unwrap();
        assert_eq!(loaded, ticket);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn saving_an_empty_ticket_is_an_error() {
        let ticket = SessionTicket::default();
        let path = std::env::temp_dir().join("haquests-session-test-empty.bin");
        assert!(ticket.save_to_file(&path).is_err());
    }
}
