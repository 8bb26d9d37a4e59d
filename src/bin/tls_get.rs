//! HTTPS GET over the raw-socket TCP engine, TLS terminated locally via
//! [`haquests::TlsSession`]. Replaces the teacher's tokio-based
//! `bin/client.rs` demo, which spoke to a toy echo server and had no
//! TLS or HTTP layer at all.

use haquests::config::CliConfig;
use haquests::http::{Request, Response};
use std::process::ExitCode;
use tracing::{error, info};

fn parse_url(url: &str) -> Option<(String, u16, String)> {
    let rest = url.strip_prefix("https://")?;
    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, "/"),
    };
    let (host, port) = match authority.rsplit_once(':') {
        Some((h, p)) => (h.to_string(), p.parse().ok()?),
        None => (authority.to_string(), 443),
    };
    Some((host, port, path.to_string()))
}

fn run(url: &str, insecure: bool) -> haquests::Result<()> {
    let mut cfg = CliConfig::load().unwrap_or_default();
    if insecure {
        cfg.verify_peer = false;
    }
    let (host, port, path) = parse_url(url)
        .ok_or_else(|| haquests::HaquestsError::Parse(format!("invalid URL: {url}")))?;

    info!(%host, port, %path, verify_peer = cfg.verify_peer, "tls_get: connecting");
    let mut session = haquests::TlsSession::connect(&host, port, cfg.verify_peer)?;
    info!(
        version = %session.protocol_version(),
        cipher = %session.negotiated_cipher_suite(),
        "tls_get: handshake complete"
    );

    let mut req = Request::get(&path);
    req.set_header("Host", &host);
    req.set_header("Connection", "close");
    session.send(&req.build_raw())?;

    let mut raw = Vec::new();
    let mut resp = Response::new();
    let deadline_attempts = (cfg.timeout_secs.max(1) * 20) as usize;
    for _ in 0..deadline_attempts {
        let chunk = session.receive(4096)?;
        if chunk.is_empty() {
            if resp.is_complete() || !raw.is_empty() {
                break;
            }
            continue;
        }
        raw.extend_from_slice(&chunk);
        if resp.parse(&raw)? {
            break;
        }
    }

    if !resp.is_complete() {
        return Err(haquests::HaquestsError::http("response never completed"));
    }

    println!("{} {}", resp.status_code(), resp.status_message());
    for (k, v) in resp.headers().iter() {
        println!("{k}: {v}");
    }
    println!();
    println!("{}", resp.body_as_string());

    session.close();
    Ok(())
}

fn main() -> ExitCode {
    haquests::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let insecure = args.iter().any(|a| a == "--insecure");
    let url = match args.iter().find(|a| !a.starts_with("--")) {
        Some(u) => u.clone(),
        None => {
            eprintln!("usage: tls_get [--insecure] <https-url>");
            return ExitCode::FAILURE;
        }
    };

    match run(&url, insecure) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "tls_get: failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_defaults_to_port_443() {
        assert_eq!(
            parse_url("https://example.com/path"),
            Some(("example.com".to_string(), 443, "/path".to_string()))
        );
    }

    #[test]
    fn parse_url_rejects_plain_http() {
        assert_eq!(parse_url("http://example.com"), None);
    }
}
