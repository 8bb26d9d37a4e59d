//! Ordered, duplicate-permitting header multimap. Grounded on
//! `original_source/src/http/headers.cpp`'s `Headers` class, but backed
//! by a `Vec<(String, String)>` instead of `std::multimap` — spec.md §9
//! calls this out explicitly: the smuggling feature needs both duplicate
//! keys *and* caller insertion order, which a keyed container cannot
//! give for free, while a vector of pairs gives both for free.

/// Case-preserving, insertion-order-preserving, duplicate-permitting
/// header list. Matching by key is ASCII case-insensitive (per HTTP),
/// but stored keys keep the caller's original casing — smuggling attacks
/// often depend on the literal bytes (`Transfer-encoding` vs
/// `Transfer-Encoding`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append without removing any existing value for `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Replace all prior values for `key` with a single new value,
    /// preserving the position of the first existing occurrence if any.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(pos) = self.entries.iter().position(|(k, _)| eq_ci(k, &key)) {
            self.entries.retain(|(k, _)| !eq_ci(k, &key));
            self.entries.insert(pos.min(self.entries.len()), (key, value));
        } else {
            self.entries.push((key, value));
        }
    }

    /// First value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| eq_ci(k, key))
            .map(|(_, v)| v.as_str())
    }

    /// Last value for `key` — used by response parsing, where
    /// "last-value-wins on duplicate" is the documented rule.
    pub fn get_last(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| eq_ci(k, key))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| eq_ci(k, key))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| eq_ci(k, key))
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| !eq_ci(k, key));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, String)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Serialize as `KEY: VALUE\r\n` lines, in insertion order, with
    /// duplicates emitted every time they occur.
    pub fn build(&self) -> String {
        let mut out = String::new();
        for (k, v) in &self.entries {
            out.push_str(k);
            out.push_str(": ");
            out.push_str(v);
            out.push_str("\r\n");
        }
        out
    }
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_preserves_duplicates_and_order() {
        let mut h = Headers::new();
        h.add("Transfer-Encoding", "chunked");
        h.add("Transfer-Encoding", "identity");
        assert_eq!(h.get_all("transfer-encoding"), vec!["chunked", "identity"]);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn set_replaces_all_prior_values() {
        let mut h = Headers::new();
        h.add("X-Foo", "1");
        h.add("X-Foo", "2");
        h.set("X-Foo", "3");
        assert_eq!(h.get_all("X-Foo"), vec!["3"]);
    }

    #[test]
    fn keys_are_matched_case_insensitively_but_stored_verbatim() {
        let mut h = Headers::new();
        h.add("Content-Length", "5");
        assert_eq!(h.get("content-length"), Some("5"));
        assert_eq!(h.iter().next().unwrap().0, "Content-Length");
    }

    #[test]
    fn get_last_returns_final_duplicate() {
        let mut h = Headers::new();
        h.add("X-Foo", "first");
        h.add("X-Foo", "second");
        assert_eq!(h.get_last("X-Foo"), Some("second"));
    }
}
