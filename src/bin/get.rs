//! Plaintext raw-socket HTTP GET. Replaces the teacher's
//! `bin/sender.rs`/`bin/reciever.rs` demo pair with a single real client
//! built on [`haquests::connection::TcpConnection`].

use haquests::config::CliConfig;
use haquests::http::Request;
use haquests::http::Response;
use std::process::ExitCode;
use tracing::{error, info};

fn parse_url(url: &str) -> Option<(String, u16, String)> {
    let rest = url.strip_prefix("http://")?;
    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, "/"),
    };
    let (host, port) = match authority.rsplit_once(':') {
        Some((h, p)) => (h.to_string(), p.parse().ok()?),
        None => (authority.to_string(), 80),
    };
    Some((host, port, path.to_string()))
}

fn run(url: &str) -> haquests::Result<()> {
    let cfg = CliConfig::load().unwrap_or_default();
    let (host, port, path) =
        parse_url(url).ok_or_else(|| haquests::HaquestsError::Parse(format!("invalid URL: {url}")))?;

    info!(%host, port, %path, "get: connecting");
    let mut conn = haquests::TcpConnection::connect(&host, port)?;

    let mut req = Request::get(&path);
    req.set_header("Host", &host);
    req.set_header("Connection", "close");

    conn.send(&req.build_raw())?;

    let mut raw = Vec::new();
    let mut resp = Response::new();
    let deadline_attempts = (cfg.timeout_secs.max(1) * 20) as usize;
    for _ in 0..deadline_attempts {
        let chunk = conn.receive(4096)?;
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

    conn.close();
    Ok(())
}

fn main() -> ExitCode {
    haquests::logging::init();

    let url = match std::env::args().nth(1) {
        Some(u) => u,
        None => {
            eprintln!("usage: get <http-url>");
            return ExitCode::FAILURE;
        }
    };

    match run(&url) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "get: failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_splits_host_port_and_path() {
        assert_eq!(
            parse_url("http://example.com:8080/foo"),
            Some(("example.com".to_string(), 8080, "/foo".to_string()))
        );
    }

    #[test]
    fn parse_url_defaults_port_and_path() {
        assert_eq!(
            parse_url("http://example.com"),
            Some(("example.com".to_string(), 80, "/".to_string()))
        );
    }

    #[test]
    fn parse_url_rejects_non_http_scheme() {
        assert_eq!(parse_url("https://example.com"), None);
    }
}
