//! Content-Range header values
//!
//! Format: `bytes 0-499/1234`, `bytes */1234` (unsatisfied), `bytes 0-499/*`
//! (unknown length). Several values may be joined with commas.

use std::fmt;

/// A single byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// Start byte (inclusive)
    pub start: u64,
    /// End byte (inclusive)
    pub end: u64,
}

impl Range {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of bytes covered by this range, 0 when `start > end`
    pub fn content_length(&self) -> u64 {
        self.end.checked_sub(self.start).map_or(0, |n| n.saturating_add(1))
    }
}

/// One `Content-Range` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRange {
    /// Covered bytes, `None` for `*`
    pub range: Option<Range>,
    /// Complete length, `None` for `*`
    pub length: Option<u64>,
}

impl ContentRange {
    /// `bytes start-end/length`
    pub fn new(start: u64, end: u64, length: u64) -> Self {
        Self {
            range: Some(Range::new(start, end)),
            length: Some(length),
        }
    }

    /// `bytes */length`
    pub fn unsatisfied(length: u64) -> Self {
        Self { range: None, length: Some(length) }
    }

    /// `bytes start-end/*`
    pub fn unknown_length(start: u64, end: u64) -> Self {
        Self {
            range: Some(Range::new(start, end)),
            length: None,
        }
    }

    /// Whether the value is consistent: start <= end < length
    pub fn is_valid(&self) -> bool {
        match (self.range, self.length) {
            (None, None) => false,
            (Some(r), Some(len)) => r.start <= r.end && r.end < len,
            (Some(r), None) => r.start <= r.end,
            (None, Some(_)) => true,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        let spec = value.trim().strip_prefix("bytes")?;
        if !spec.starts_with(char::is_whitespace) {
            return None;
        }
        let (range, length) = spec.trim_start().split_once('/')?;

        let range = match range.trim() {
            "*" => None,
            range => {
                let (start, end) = range.split_once('-')?;
                Some(Range::new(parse_digits(start)?, parse_digits(end)?))
            }
        };
        let length = match length.trim() {
            "*" => None,
            length => Some(parse_digits(length)?),
        };

        Some(Self { range, length })
    }
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bytes ")?;
        match self.range {
            Some(r) => write!(f, "{}-{}", r.start, r.end)?,
            None => f.write_str("*")?,
        }
        match self.length {
            Some(len) => write!(f, "/{}", len),
            None => f.write_str("/*"),
        }
    }
}

/// Parse a Content-Range header, dropping malformed and inconsistent values
pub fn parse_content_ranges(header: &str) -> Vec<ContentRange> {
    header
        .split(',')
        .filter_map(ContentRange::parse)
        .filter(ContentRange::is_valid)
        .collect()
}

/// Render values as a Content-Range header
pub fn format_content_ranges(ranges: &[ContentRange]) -> String {
    ranges.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ")
}
