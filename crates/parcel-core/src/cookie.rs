//! Cookie store
//!
//! Flat name/value cookies owned by one message. Attributes such as
//! `Path` or `Max-Age` are not modelled.

use indexmap::IndexMap;

/// Cookie jar for managing the cookies of a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: IndexMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse cookies from a Cookie header value
    pub fn parse(header: &str) -> Self {
        let mut jar = Self::new();

        for part in header.split(';') {
            if let Some((name, value)) = part.trim().split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    jar.set(name, value.trim().trim_matches('"'));
                }
            }
        }

        jar
    }

    /// Get cookie value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(|v| v.as_str())
    }

    /// Set a cookie, returning the previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.cookies.insert(name.into(), value.into())
    }

    /// Remove a cookie
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.cookies.shift_remove(name)
    }

    /// Check if jar has a cookie
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize to a Cookie header value
    pub fn to_header_value(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
