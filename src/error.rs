use thiserror::Error;

/// Errors surfaced by the crate, one variant per the failure categories
/// the engine actually distinguishes. Silent drops (foreign packets,
/// header-filtering rejects) never become an `Err`; they are logged at
/// `trace` level and skipped by the caller's loop.
#[derive(Error, Debug)]
pub enum HaquestsError {
    /// Raw socket creation failed because the process lacks `CAP_NET_RAW`.
    #[error("insufficient privilege to open a raw socket: {0}")]
    Privilege(String),

    /// DNS lookup or local-address probe produced no IPv4 address.
    #[error("address resolution failed: {0}")]
    Resolution(String),

    /// A send/recv syscall failed for a reason other than timeout.
    #[error("raw socket I/O error: {0}")]
    Socket(#[from] std::io::Error),

    /// An operation was attempted outside its legal TCB state, or the
    /// handshake failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// TLS context creation, verification, handshake, or record I/O failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// HTTP response parsing failed, optionally carrying a status code
    /// the server itself reported.
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        status: Option<u16>,
    },

    /// A header line, chunk length, or response structure was malformed.
    #[error("parse error: {0}")]
    Parse(String),
}

impl HaquestsError {
    pub fn http(message: impl Into<String>) -> Self {
        HaquestsError::Http {
            message: message.into(),
            status: None,
        }
    }

    pub fn http_status(message: impl Into<String>, status: u16) -> Self {
        HaquestsError::Http {
            message: message.into(),
            status: Some(status),
        }
    }
}

pub type Result<T> = std::result::Result<T, HaquestsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_displays_message() {
        let err = HaquestsError::Connection("not connected".into());
        assert_eq!(err.to_string(), "connection error: not connected");
    }

    #[test]
    fn http_error_carries_status() {
        let err = HaquestsError::http_status("bad gateway", 502);
        match err {
            HaquestsError::Http { status, .. } => assert_eq!(status, Some(502)),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err: HaquestsError = io_err.into();
        assert!(matches!(err, HaquestsError::Socket(_)));
    }
}
