//! Thin wrapper over `rustls`, the standard Rust TLS stack, driven through
//! the `BioAdapter` byte-stream façade instead of a real socket. Grounded
//! on `original_source/src/tls/connection.cpp` (context creation,
//! verification mode, SNI, handshake, record read/write) and
//! `original_source/include/haquests/tls/certificate.hpp` for the
//! diagnostics getters.

use crate::bio::BioAdapter;
use crate::connection::TcpConnection;
use crate::error::{HaquestsError, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, RootCertStore};
use std::io::{Read, Write};
use std::sync::{Arc, Once};
use tracing::debug;

static CRYPTO_PROVIDER_INIT: Once = Once::new();

/// Installs the default `ring` crypto provider exactly once per process.
/// Rustls has no OpenSSL-style `SSL_library_init`; this `Once` is the
/// closest Rust-ecosystem analogue of the C++ source's one-shot global
/// initializer (spec.md §9 "Global TLS init").
fn ensure_crypto_provider() {
    CRYPTO_PROVIDER_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

#[derive(Debug)]
struct NoVerification;

impl ServerCertVerifier for NoVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// TLS client session layered over a `TcpConnection` through a
/// `BioAdapter`. Owns the underlying `TcpConnection`.
pub struct TlsSession {
    conn: ClientConnection,
    tcp: TcpConnection,
}

impl TlsSession {
    /// Connect at the TCP layer, then run the TLS handshake to
    /// completion with SNI set to `host`. `verify_peer = false` disables
    /// certificate verification entirely — intended for lab targets with
    /// self-signed certificates, never the default.
    pub fn connect(host: &str, port: u16, verify_peer: bool) -> Result<Self> {
        ensure_crypto_provider();

        let tcp = TcpConnection::connect(host, port)
            .map_err(|e| HaquestsError::Connection(format!("TCP layer failed: {e}")))?;

        let config = build_client_config(verify_peer)?;
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| HaquestsError::Tls(format!("invalid SNI hostname: {host}")))?;

        let conn = ClientConnection::new(Arc::new(config), server_name)
            .map_err(|e| HaquestsError::Tls(format!("failed to create TLS client: {e}")))?;

        let mut session = TlsSession { conn, tcp };
        session.run_handshake()?;
        Ok(session)
    }

    fn run_handshake(&mut self) -> Result<()> {
        let mut bio = BioAdapter::new(&mut self.tcp);
        while self.conn.is_handshaking() {
            self.conn
                .complete_io(&mut bio)
                .map_err(|e| HaquestsError::Tls(format!("TLS handshake failed: {e}")))?;
        }
        debug!(
            version = ?self.conn.protocol_version(),
            "tls: handshake complete"
        );
        Ok(())
    }

    pub fn send(&mut self, data: &[u8]) -> Result<usize> {
        let mut bio = BioAdapter::new(&mut self.tcp);
        let mut stream = rustls::Stream::new(&mut self.conn, &mut bio);
        stream
            .write(data)
            .map_err(|e| HaquestsError::Tls(format!("TLS write failed: {e}")))
    }

    pub fn receive(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; max_len];
        let mut bio = BioAdapter::new(&mut self.tcp);
        let mut stream = rustls::Stream::new(&mut self.conn, &mut bio);
        match stream.read(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Ok(buf)
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(Vec::new()),
            Err(e) => Err(HaquestsError::Tls(format!("TLS read failed: {e}"))),
        }
    }

    pub fn protocol_version(&self) -> String {
        self.conn
            .protocol_version()
            .map(|v| format!("{v:?}"))
            .unwrap_or_default()
    }

    pub fn negotiated_cipher_suite(&self) -> String {
        self.conn
            .negotiated_cipher_suite()
            .map(|cs| format!("{:?}", cs.suite()))
            .unwrap_or_default()
    }

    /// Bidirectional TLS shutdown, then close the underlying TCP
    /// connection. Never raises.
    pub fn close(&mut self) {
        self.conn.send_close_notify();
        let mut bio = BioAdapter::new(&mut self.tcp);
        let _ = self.conn.complete_io(&mut bio);
        self.tcp.close();
    }
}

fn build_client_config(verify_peer: bool) -> Result<ClientConfig> {
    let builder = ClientConfig::builder();

    let config = if verify_peer {
        let mut roots = RootCertStore::empty();
        let native_certs = rustls_native_certs::load_native_certs()
            .map_err(|e| HaquestsError::Tls(format!("failed to load native certs: {e}")))?;
        for cert in native_certs {
            let _ = roots.add(cert);
        }
        builder
            .with_root_certificates(roots)
            .with_no_client_auth()
    } else {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerification))
            .with_no_client_auth()
    };

    Ok(config)
}
