//! Content-Encoding codec and negotiation
//!
//! Supports the `gzip`, `deflate` and `identity` content codings. `deflate`
//! is the zlib format of RFC 1950; raw deflate streams from non-conforming
//! senders are still accepted when decoding.

use crate::config::CompressionLevel;
use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;
use thiserror::Error;

/// Content-encoding errors
#[derive(Debug, Error)]
pub enum EncodingError {
    /// Token is not one of gzip, deflate, identity
    #[error("unsupported content encoding: {0}")]
    Unsupported(String),

    /// `level` parameter is not an integer in 0..=9
    #[error("invalid compression level: {0}")]
    InvalidLevel(String),

    /// Compressed input is corrupt or truncated
    #[error("malformed {coding} stream: {source}")]
    Decode {
        coding: Coding,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {coding} stream: {source}")]
    Encode {
        coding: Coding,
        #[source]
        source: io::Error,
    },
}

impl EncodingError {
    /// Whether the error was caused by malformed compressed input
    pub fn is_decode(&self) -> bool {
        matches!(self, EncodingError::Decode { .. })
    }
}

/// A content coding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coding {
    Gzip,
    Deflate,
    Identity,
}

impl Coding {
    /// HTTP token for this coding
    pub fn as_str(&self) -> &'static str {
        match self {
            Coding::Gzip => "gzip",
            Coding::Deflate => "deflate",
            Coding::Identity => "identity",
        }
    }

    /// Parse an HTTP token (case-insensitive, `x-gzip` is an alias of `gzip`)
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("gzip") || token.eq_ignore_ascii_case("x-gzip") {
            Some(Coding::Gzip)
        } else if token.eq_ignore_ascii_case("deflate") {
            Some(Coding::Deflate)
        } else if token.eq_ignore_ascii_case("identity") {
            Some(Coding::Identity)
        } else {
            None
        }
    }
}

impl fmt::Display for Coding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content coding plus its parameters (e.g. `level`).
///
/// Two encodings are equal iff coding and parameters match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEncoding {
    coding: Coding,
    params: BTreeMap<String, String>,
}

impl ContentEncoding {
    pub fn new(coding: Coding) -> Self {
        Self {
            coding,
            params: BTreeMap::new(),
        }
    }

    pub fn gzip() -> Self {
        Self::new(Coding::Gzip)
    }

    pub fn deflate() -> Self {
        Self::new(Coding::Deflate)
    }

    pub fn identity() -> Self {
        Self::new(Coding::Identity)
    }

    /// Add a parameter (names are case-insensitive)
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn coding(&self) -> Coding {
        self.coding
    }

    pub fn is_identity(&self) -> bool {
        self.coding == Coding::Identity
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(&name.to_ascii_lowercase()).map(|v| v.as_str())
    }

    /// Serialize including parameters (`gzip;level=9`)
    pub fn to_string_with_params(&self) -> String {
        let mut out = self.coding.as_str().to_string();
        for (name, value) in &self.params {
            out.push(';');
            out.push_str(name);
            out.push('=');
            out.push_str(value);
        }
        out
    }

    /// Compression level from the `level` parameter, if any
    fn level(&self) -> Result<Option<CompressionLevel>, EncodingError> {
        match self.param("level") {
            None => Ok(None),
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(level) if level <= 9 => Ok(Some(CompressionLevel::Exact(level))),
                _ => Err(EncodingError::InvalidLevel(raw.to_string())),
            },
        }
    }

    /// Encode with the `level` parameter, or the default level
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>, EncodingError> {
        self.encode_with_level(data, CompressionLevel::Default)
    }

    /// Encode with the `level` parameter, or `fallback` if there is none
    pub fn encode_with_level(&self, data: &[u8], fallback: CompressionLevel) -> Result<Vec<u8>, EncodingError> {
        let level = self.level()?.unwrap_or(fallback).flate2();
        let coding = self.coding;
        let wrap = |source| EncodingError::Encode { coding, source };

        match coding {
            Coding::Gzip => {
                let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), level);
                encoder.write_all(data).map_err(wrap)?;
                encoder.finish().map_err(wrap)
            }
            Coding::Deflate => {
                let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), level);
                encoder.write_all(data).map_err(wrap)?;
                encoder.finish().map_err(wrap)
            }
            Coding::Identity => Ok(data.to_vec()),
        }
    }

    /// Reverse the coding
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>, EncodingError> {
        let coding = self.coding;
        let mut out = Vec::with_capacity(data.len() * 2);

        match coding {
            Coding::Gzip => {
                MultiGzDecoder::new(data)
                    .read_to_end(&mut out)
                    .map_err(|source| EncodingError::Decode { coding, source })?;
            }
            Coding::Deflate => {
                if let Err(zlib_err) = ZlibDecoder::new(data).read_to_end(&mut out) {
                    log::debug!("deflate body is not a zlib stream ({zlib_err}), trying raw deflate");
                    out.clear();
                    DeflateDecoder::new(data)
                        .read_to_end(&mut out)
                        .map_err(|source| EncodingError::Decode { coding, source })?;
                }
            }
            Coding::Identity => out.extend_from_slice(data),
        }

        Ok(out)
    }
}

impl From<Coding> for ContentEncoding {
    fn from(coding: Coding) -> Self {
        ContentEncoding::new(coding)
    }
}

/// Parses `token[;name=value]*`
impl FromStr for ContentEncoding {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(';');
        let token = parts.next().unwrap_or_default();
        let coding = Coding::from_token(token).ok_or_else(|| EncodingError::Unsupported(token.trim().to_string()))?;

        let mut encoding = ContentEncoding::new(coding);
        for param in parts {
            if let Some((name, value)) = param.split_once('=') {
                encoding = encoding.with_param(name.trim(), value.trim());
            }
        }
        Ok(encoding)
    }
}

/// Serializes the token only
impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.coding.as_str())
    }
}

/// Encode `data` with `encoding`
pub fn encode(data: &[u8], encoding: &ContentEncoding) -> Result<Vec<u8>, EncodingError> {
    encoding.encode(data)
}

/// Decode `data` that was encoded with `encoding`
pub fn decode(data: &[u8], encoding: &ContentEncoding) -> Result<Vec<u8>, EncodingError> {
    encoding.decode(data)
}

/// What an Accept-Encoding entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingRange {
    Coding(Coding),
    /// `*`: any coding not listed explicitly
    Any,
}

/// One weighted entry of an Accept-Encoding list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcceptedEncoding {
    pub range: EncodingRange,
    /// Quality in `0.0..=1.0`; 0 means "not acceptable"
    pub quality: f32,
}

impl AcceptedEncoding {
    pub fn new(coding: Coding, quality: f32) -> Self {
        Self {
            range: EncodingRange::Coding(coding),
            quality: quality.clamp(0.0, 1.0),
        }
    }

    pub fn any(quality: f32) -> Self {
        Self {
            range: EncodingRange::Any,
            quality: quality.clamp(0.0, 1.0),
        }
    }
}

/// Parse an Accept-Encoding list (`gzip;q=1.0, deflate;q=0.5, *;q=0`).
///
/// Unknown codings and entries with an unparsable quality are skipped.
pub fn parse_accept_encoding(header: &str) -> Vec<AcceptedEncoding> {
    let mut accepted = Vec::new();

    for item in header.split(',') {
        let mut parts = item.split(';');
        let token = parts.next().unwrap_or_default().trim();
        if token.is_empty() {
            continue;
        }

        let mut quality = 1.0;
        let mut valid = true;
        for param in parts {
            if let Some((name, value)) = param.split_once('=') {
                if name.trim().eq_ignore_ascii_case("q") {
                    match value.trim().parse::<f32>() {
                        Ok(q) if q.is_finite() => quality = q,
                        _ => valid = false,
                    }
                }
            }
        }
        if !valid {
            continue;
        }

        if token == "*" {
            accepted.push(AcceptedEncoding::any(quality));
        } else if let Some(coding) = Coding::from_token(token) {
            accepted.push(AcceptedEncoding::new(coding, quality));
        }
    }

    accepted
}

/// Pick the best encoding from `available` (server preference order).
///
/// Each available coding gets the quality of its explicit entry, or of `*`
/// when not listed. The highest quality wins, ties go to the earlier
/// available coding, and identity is returned when nothing is acceptable.
pub fn negotiate(accepted: &[AcceptedEncoding], available: &[Coding]) -> ContentEncoding {
    let wildcard = accepted
        .iter()
        .filter(|a| a.range == EncodingRange::Any)
        .map(|a| a.quality)
        .reduce(f32::max);

    let mut best: Option<(Coding, f32)> = None;
    for &coding in available {
        let explicit = accepted
            .iter()
            .filter(|a| a.range == EncodingRange::Coding(coding))
            .map(|a| a.quality)
            .reduce(f32::max);

        let Some(quality) = explicit.or(wildcard) else {
            continue;
        };
        if quality <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, q)| quality > q) {
            best = Some((coding, quality));
        }
    }

    let chosen = best.map(|(coding, _)| coding).unwrap_or(Coding::Identity);
    log::trace!("negotiated content encoding {chosen}");
    ContentEncoding::new(chosen)
}
