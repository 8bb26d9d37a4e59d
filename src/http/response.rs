//! HTTP/1.1 response parsing. Grounded on
//! `original_source/src/http/response.cpp`'s `Response::parse`, kept
//! permissive in the same places the original is permissive (it's
//! exercising request-smuggling targets, not validating well-formed
//! servers) but using [`Headers`] so a response with duplicate headers —
//! itself sometimes a smuggling signal — is observable instead of
//! silently collapsed to one value.

use crate::error::{HaquestsError, Result};
use super::headers::Headers;

#[derive(Debug, Clone, Default)]
pub struct Response {
    version: String,
    status_code: u16,
    status_message: String,
    headers: Headers,
    body: Vec<u8>,
    complete: bool,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly incomplete) byte buffer. Returns `Ok(false)` if
    /// the header section hasn't arrived yet in full — not an error, the
    /// caller should read more and retry. Returns `Err` only for a
    /// malformed status line once the header section is present.
    pub fn parse(&mut self, raw: &[u8]) -> Result<bool> {
        let header_end = match find_subslice(raw, b"\r\n\r\n") {
            Some(idx) => idx,
            None => return Ok(false),
        };

        let header_section = String::from_utf8_lossy(&raw[..header_end]);
        let mut lines = header_section.split("\r\n");

        let status_line = lines
            .next()
            .ok_or_else(|| HaquestsError::Parse("empty response".into()))?;
        self.parse_status_line(status_line)?;

        self.headers = Headers::new();
        for line in lines {
            if line.is_empty() {
                continue;
            }
            if let Some(colon) = line.find(':') {
                let key = line[..colon].to_string();
                let value = line[colon + 1..].trim_start().to_string();
                self.headers.add(key, value);
            }
        }

        let body_start = header_end + 4;
        self.body = raw[body_start..].to_vec();
        self.complete = true;
        Ok(true)
    }

    fn parse_status_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim_end_matches('\r');
        let mut parts = line.splitn(3, ' ');
        let version = parts
            .next()
            .ok_or_else(|| HaquestsError::Parse("missing HTTP version".into()))?;
        let code = parts
            .next()
            .ok_or_else(|| HaquestsError::Parse("missing status code".into()))?;
        let message = parts.next().unwrap_or("");

        let code: u16 = code
            .parse()
            .map_err(|_| HaquestsError::Parse(format!("invalid status code: {code}")))?;

        self.version = version.to_string();
        self.status_code = code;
        self.status_message = message.to_string();
        Ok(())
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get_last(key)
    }

    pub fn has_header(&self, key: &str) -> bool {
        self.headers.has(key)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_as_string(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_chunked(&self) -> bool {
        self.get_header("Transfer-Encoding")
            .map(|te| te.to_ascii_lowercase().contains("chunked"))
            .unwrap_or(false)
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_line_headers_and_body() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nX-Test: a\r\n\r\nhello";
        let mut resp = Response::new();
        assert!(resp.parse(raw).unwrap());
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.status_message(), "OK");
        assert_eq!(resp.get_header("Content-Length"), Some("5"));
        assert_eq!(resp.body_as_string(), "hello");
        assert!(resp.is_complete());
    }

    #[test]
    fn incomplete_headers_return_ok_false_not_error() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n";
        let mut resp = Response::new();
        assert!(!resp.parse(raw).unwrap());
        assert!(!resp.is_complete());
    }

    #[test]
    fn detects_chunked_transfer_encoding() {
        let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n";
        let mut resp = Response::new();
        resp.parse(raw).unwrap();
        assert!(resp.is_chunked());
    }

    #[test]
    fn duplicate_headers_preserved_last_wins_on_get() {
        let raw = b"HTTP/1.1 200 OK\r\nX-Foo: 1\r\nX-Foo: 2\r\n\r\n";
        let mut resp = Response::new();
        resp.parse(raw).unwrap();
        assert_eq!(resp.headers().get_all("X-Foo"), vec!["1", "2"]);
        assert_eq!(resp.get_header("X-Foo"), Some("2"));
    }

    #[test]
    fn malformed_status_code_is_an_error() {
        let raw = b"HTTP/1.1 notanumber OK\r\n\r\n";
        let mut resp = Response::new();
        assert!(resp.parse(raw).is_err());
    }
}
