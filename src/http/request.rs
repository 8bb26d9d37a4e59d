//! HTTP/1.1 request construction. Grounded on
//! `original_source/src/http/request.cpp`'s `Request` class, with one
//! deliberate deviation: the original keeps headers in a `std::map`,
//! which silently drops duplicates and reorders them alphabetically —
//! exactly the bug that defeats CL.TE/TE.CL smuggling payloads, which
//! depend on sending two `Content-Length` or `Transfer-Encoding` headers
//! in a specific order. [`Headers`] is used instead, so callers get
//! byte-for-byte control over what hits the wire.

use super::headers::Headers;

#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    path: String,
    version: String,
    headers: Headers,
    body: Vec<u8>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Request {
            method: method.into(),
            path: path.into(),
            version: "HTTP/1.1".to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = method.into();
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Append a header without removing an existing one of the same name
    /// — the hook smuggling payloads use to send a header twice.
    pub fn add_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.add(key, value);
    }

    /// Replace any existing value(s) for `key`.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.headers.set(key, value);
    }

    pub fn get_header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn has_header(&self, key: &str) -> bool {
        self.headers.has(key)
    }

    pub fn remove_header(&mut self, key: &str) {
        self.headers.remove(key);
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Set the body and rewrite `Content-Length` to match. Callers
    /// building smuggling payloads that need a *wrong* Content-Length
    /// should call `set_header("Content-Length", ...)` afterwards.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
        self.headers.set("Content-Length", self.body.len().to_string());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Render the request line + headers + blank line + body as bytes.
    pub fn build_raw(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.headers.len() * 32 + self.body.len());
        out.extend_from_slice(self.method.as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.path.as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.version.as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(self.headers.build().as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }

    /// Render as a UTF-8 string, lossily, for logging/display. Prefer
    /// [`Request::build_raw`] for anything that goes on the wire.
    pub fn build(&self) -> String {
        String::from_utf8_lossy(&self.build_raw()).into_owned()
    }

    pub fn get(url: impl Into<String>) -> Self {
        let mut req = Request::new("GET", url);
        req.set_header("User-Agent", "haquests/0.1");
        req
    }

    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let mut req = Request::new("POST", url);
        req.set_header("User-Agent", "haquests/0.1");
        req.set_body(body);
        req
    }

    pub fn put(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let mut req = Request::new("PUT", url);
        req.set_header("User-Agent", "haquests/0.1");
        req.set_body(body);
        req
    }

    pub fn delete(url: impl Into<String>) -> Self {
        let mut req = Request::new("DELETE", url);
        req.set_header("User-Agent", "haquests/0.1");
        req
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_builds_request_line_and_user_agent() {
        let req = Request::get("/index.html");
        let raw = req.build();
        assert!(raw.starts_with("GET /index.html HTTP/1.1\r\n"));
        assert!(raw.contains("User-Agent: haquests/0.1\r\n"));
        assert!(raw.ends_with("\r\n\r\n"));
    }

    #[test]
    fn post_sets_content_length_from_body() {
        let req = Request::post("/submit", "abc");
        assert_eq!(req.get_header("Content-Length"), Some("3"));
        assert!(req.build().ends_with("\r\n\r\nabc"));
    }

    #[test]
    fn duplicate_headers_are_preserved_in_order() {
        let mut req = Request::new("GET", "/");
        req.add_header("X-Dup", "1");
        req.add_header("X-Dup", "2");
        let raw = req.build();
        let first = raw.find("X-Dup: 1").unwrap();
        let second = raw.find("X-Dup: 2").unwrap();
        assert!(first < second);
    }

    #[test]
    fn set_header_after_set_body_can_override_content_length() {
        let mut req = Request::post("/submit", "abcdef");
        req.set_header("Content-Length", "3");
        assert_eq!(req.get_header("Content-Length"), Some("3"));
        assert_eq!(req.body().len(), 6);
    }
}
