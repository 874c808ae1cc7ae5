//! Header store
//!
//! Ordered, case-insensitive name/value pairs. Names keep the casing of
//! their first insertion and serialize in insertion order.

use smallvec::SmallVec;
use std::fmt;

pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const CONTENT_LANGUAGE: &str = "Content-Language";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const CONTENT_LOCATION: &str = "Content-Location";
pub const CONTENT_MD5: &str = "Content-MD5";
pub const CONTENT_RANGE: &str = "Content-Range";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const COOKIE: &str = "Cookie";
pub const USER_AGENT: &str = "User-Agent";

/// Case-insensitive header map (stack-allocated for small header counts)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: SmallVec<[(String, String); 16]>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Get a header value (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Set a header value.
    ///
    /// With `overwrite` false an existing header is left untouched. Returns
    /// whether the map changed.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>, overwrite: bool) -> bool {
        let name = name.into();
        match self.position(&name) {
            Some(_) if !overwrite => false,
            Some(idx) => {
                self.entries[idx].1 = value.into();
                true
            }
            None => {
                self.entries.push((name, value.into()));
                true
            }
        }
    }

    /// Set a header value, replacing any existing one
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, value, true);
    }

    /// Remove a header, returning its value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|idx| self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate headers in insertion order, with their stored casing
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// Serializes as header lines, each terminated by CRLF
impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "text/plain");

        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        assert!(headers.contains("Content-type"));
    }

    #[test]
    fn test_overwrite_semantics() {
        let mut headers = HeaderMap::new();
        assert!(headers.set("X", "a", true));
        assert!(!headers.set("x", "b", false));
        assert_eq!(headers.get("X"), Some("a"));

        assert!(headers.set("x", "b", true));
        assert_eq!(headers.get("X"), Some("b"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_first_casing_and_order_preserved() {
        let mut headers = HeaderMap::new();
        headers.insert("X-First", "1");
        headers.insert("Accept", "*/*");
        headers.insert("x-first", "2");

        let collected: Vec<_> = headers.iter().collect();
        assert_eq!(collected, vec![("X-First", "2"), ("Accept", "*/*")]);
        assert_eq!(headers.to_string(), "X-First: 2\r\nAccept: */*\r\n");
    }

    #[test]
    fn test_remove() {
        let mut headers: HeaderMap = [("A", "1"), ("B", "2")].into_iter().collect();

        assert_eq!(headers.remove("a"), Some("1".to_string()));
        assert_eq!(headers.remove("a"), None);
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec![("B", "2")]);
    }
}
