//! HTTP message - headers, cookies and a body with its transformation pipeline
//!
//! The body exists in three representations:
//! - raw bytes, as stored and as sent on the wire
//! - decoded bytes, with the Content-Encoding reversed
//! - a parsed object, produced by the codec registered for the Content-Type
//!
//! The parsed object is cached and dropped whenever the content, the
//! Content-Type or the Content-Encoding changes.

use crate::codec::{ParsedContent, Serialized};
use crate::config::ContentConfig;
use crate::cookie::CookieJar;
use crate::encoding::{negotiate, AcceptedEncoding, Coding, ContentEncoding};
use crate::headers::{
    HeaderMap, CONTENT_ENCODING, CONTENT_LANGUAGE, CONTENT_LENGTH, CONTENT_LOCATION, CONTENT_MD5, CONTENT_RANGE,
    CONTENT_TYPE, USER_AGENT,
};
use crate::range::{format_content_ranges, parse_content_ranges, ContentRange};
use crate::registry::ParserRegistry;
use crate::{Error, Result};
use base64::prelude::*;
use bytes::{Bytes, BytesMut};
use http::Version;
use md5::{Digest, Md5};
use mime::Mime;
use smallvec::SmallVec;
use std::borrow::Cow;

/// An HTTP message with a content pipeline
#[derive(Debug, Clone)]
pub struct Message {
    version: Version,
    headers: HeaderMap,
    cookies: CookieJar,
    content: Option<Bytes>,
    parsed: Option<ParsedContent>,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            version: Version::HTTP_10,
            headers: HeaderMap::new(),
            cookies: CookieJar::new(),
            content: None,
            parsed: None,
        }
    }
}

impl Message {
    /// Create an empty message (HTTP/1.0, no headers, no content)
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Version
    // ------------------------------------------------------------------

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    // ------------------------------------------------------------------
    // Headers
    // ------------------------------------------------------------------

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Set a header. With `overwrite` false an existing value is kept.
    ///
    /// Returns whether the header changed.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>, overwrite: bool) -> bool {
        let changed = self.headers.set(name, value, overwrite);
        if changed {
            self.invalidate_for(name);
        }
        changed
    }

    /// Remove a header, returning its value
    pub fn delete_header(&mut self, name: &str) -> Option<String> {
        let removed = self.headers.remove(name);
        if removed.is_some() {
            self.invalidate_for(name);
        }
        removed
    }

    fn invalidate_for(&mut self, name: &str) {
        if name.eq_ignore_ascii_case(CONTENT_TYPE) || name.eq_ignore_ascii_case(CONTENT_ENCODING) {
            if self.parsed.take().is_some() {
                log::trace!("{name} changed, dropped parsed content");
            }
        }
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Raw content, as stored
    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// Replace the raw content.
    ///
    /// `encoding` describes how `content` is already encoded; identity,
    /// `None` or an empty body removes Content-Encoding. Content-Length follows the byte
    /// count and Content-MD5 is regenerated if present.
    pub fn set_content(&mut self, content: Option<Bytes>, encoding: Option<&ContentEncoding>) {
        match encoding {
            Some(encoding) if content.as_ref().is_some_and(|c| !c.is_empty()) && !encoding.is_identity() => {
                self.headers.insert(CONTENT_ENCODING, encoding.to_string());
            }
            _ => {
                self.headers.remove(CONTENT_ENCODING);
            }
        }
        self.store_content(content);
    }

    /// Remove the content and the headers derived from it
    pub fn delete_content(&mut self) {
        self.set_content(None, None);
    }

    /// Append raw bytes, keeping the declared Content-Encoding
    pub fn append_content(&mut self, data: &[u8]) {
        let mut buf = BytesMut::with_capacity(self.content.as_ref().map_or(0, Bytes::len) + data.len());
        if let Some(content) = &self.content {
            buf.extend_from_slice(content);
        }
        buf.extend_from_slice(data);
        self.store_content(Some(buf.freeze()));
    }

    /// Prepend raw bytes, keeping the declared Content-Encoding
    pub fn prepend_content(&mut self, data: &[u8]) {
        let mut buf = BytesMut::with_capacity(self.content.as_ref().map_or(0, Bytes::len) + data.len());
        buf.extend_from_slice(data);
        if let Some(content) = &self.content {
            buf.extend_from_slice(content);
        }
        self.store_content(Some(buf.freeze()));
    }

    /// Store raw content and refresh the derived headers, leaving
    /// Content-Encoding alone
    fn store_content(&mut self, content: Option<Bytes>) {
        self.content = content;
        self.parsed = None;

        match &self.content {
            Some(content) if !content.is_empty() => {
                self.headers.insert(CONTENT_LENGTH, content.len().to_string());
            }
            _ => {
                self.headers.remove(CONTENT_LENGTH);
            }
        }

        if self.content.is_none() {
            self.headers.remove(CONTENT_ENCODING);
            self.headers.remove(CONTENT_MD5);
        } else if self.headers.contains(CONTENT_MD5) {
            self.generate_md5_digest();
        }
    }

    /// Declared Content-Length
    pub fn content_length(&self) -> Result<Option<u64>> {
        match self.headers.get(CONTENT_LENGTH) {
            None => Ok(None),
            Some(value) => value.trim().parse::<u64>().map(Some).map_err(|_| Error::InvalidHeader {
                name: CONTENT_LENGTH,
                value: value.to_string(),
            }),
        }
    }

    // ------------------------------------------------------------------
    // Content encoding
    // ------------------------------------------------------------------

    /// Declared Content-Encoding, `None` when absent
    pub fn content_encoding(&self) -> Result<Option<ContentEncoding>> {
        match self.headers.get(CONTENT_ENCODING) {
            None => Ok(None),
            Some(value) => Ok(Some(value.parse::<ContentEncoding>()?)),
        }
    }

    /// Content with the declared Content-Encoding reversed
    pub fn decoded_content(&self) -> Result<Option<Cow<'_, [u8]>>> {
        let Some(content) = &self.content else {
            return Ok(None);
        };
        match self.content_encoding()? {
            Some(encoding) if !encoding.is_identity() && !content.is_empty() => {
                Ok(Some(Cow::Owned(encoding.decode(content)?)))
            }
            _ => Ok(Some(Cow::Borrowed(&content[..]))),
        }
    }

    /// Content re-encoded with `encoding`, without changing the message
    pub fn encoded_content(&self, encoding: &ContentEncoding) -> Result<Option<Vec<u8>>> {
        match self.decoded_content()? {
            None => Ok(None),
            Some(decoded) => Ok(Some(encoding.encode(&decoded)?)),
        }
    }

    /// Re-encode the content with the best encoding the peer accepts.
    ///
    /// Returns the chosen encoding.
    pub fn encode_content(&mut self, accepted: &[AcceptedEncoding]) -> Result<ContentEncoding> {
        self.encode_content_with(accepted, &ContentConfig::default())
    }

    /// Like [`encode_content`](Self::encode_content), offering the
    /// encodings and level from `config`
    pub fn encode_content_with(&mut self, accepted: &[AcceptedEncoding], config: &ContentConfig) -> Result<ContentEncoding> {
        let mut available: SmallVec<[Coding; 4]> = config.supported.clone();
        available.push(Coding::Identity);
        let chosen = negotiate(accepted, &available);

        let Some(decoded) = self.decoded_content()? else {
            log::debug!("no content to encode");
            return Ok(chosen);
        };
        let encoded = chosen.encode_with_level(&decoded, config.level)?;
        drop(decoded);

        log::debug!("encoded content as {chosen} ({} bytes)", encoded.len());
        self.set_content(Some(encoded.into()), Some(&chosen));
        Ok(chosen)
    }

    /// Replace the content with its decoded form. Idempotent.
    pub fn decode_content(&mut self) -> Result<()> {
        match self.content_encoding()? {
            Some(encoding) if !encoding.is_identity() => {
                let decoded = match &self.content {
                    Some(content) if content.is_empty() => Vec::new(),
                    Some(content) => encoding.decode(content)?,
                    None => return Ok(()),
                };
                self.set_content(Some(decoded.into()), None);
            }
            Some(_) => {
                self.delete_header(CONTENT_ENCODING);
            }
            None => {}
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Parsed content
    // ------------------------------------------------------------------

    /// The content parsed by the codec registered for its media type.
    ///
    /// Without a Content-Type the content is treated as
    /// `application/octet-stream`. When no codec is registered the decoded
    /// bytes are returned as [`ParsedContent::Bytes`]. The result is cached
    /// until the content or its media type changes.
    pub fn parsed_content(&mut self, registry: &ParserRegistry) -> Result<&ParsedContent> {
        if self.parsed.is_none() {
            let parsed = self.parse_content(registry)?;
            self.parsed = Some(parsed);
        } else {
            log::trace!("parsed content cache hit");
        }
        self.parsed.as_ref().ok_or(Error::NoContent)
    }

    fn parse_content(&self, registry: &ParserRegistry) -> Result<ParsedContent> {
        let decoded = self.decoded_content()?.ok_or(Error::NoContent)?;
        let media_type = self.content_type()?.unwrap_or(mime::APPLICATION_OCTET_STREAM);

        let Some(codec) = registry.lookup(&media_type) else {
            log::debug!("no codec for {}, passing content through", media_type.essence_str());
            let bytes = match decoded {
                Cow::Borrowed(_) => self.content.clone().unwrap_or_default(),
                Cow::Owned(owned) => Bytes::from(owned),
            };
            return Ok(ParsedContent::Bytes(bytes));
        };

        log::trace!("parsing {} bytes as {}", decoded.len(), media_type.essence_str());
        codec
            .parse(&decoded, &media_type)
            .map_err(|source| Error::MalformedContent {
                media_type: media_type.essence_str().to_string(),
                source,
            })
    }

    /// Serialize `content` into the message body.
    ///
    /// `media_type`, when given, selects the codec; otherwise the current
    /// Content-Type does. The codec produces the body and may refine the
    /// media type (e.g. a generated multipart boundary). On error the
    /// message is left untouched. The body is stored without content
    /// encoding and `content` seeds the parse cache.
    pub fn set_parsed_content(
        &mut self,
        registry: &ParserRegistry,
        content: ParsedContent,
        media_type: Option<Mime>,
    ) -> Result<()> {
        let declared = media_type.is_some();
        let target = match media_type {
            Some(media_type) => media_type,
            None => self.content_type()?.unwrap_or(mime::APPLICATION_OCTET_STREAM),
        };

        // Nothing is written until the body is ready
        let (body, effective) = match registry.lookup(&target) {
            Some(codec) => {
                let Serialized { body, media_type } =
                    codec.serialize(&content, &target).map_err(|source| Error::Serialize {
                        media_type: target.essence_str().to_string(),
                        source,
                    })?;
                (Bytes::from(body), media_type)
            }
            None => match &content {
                ParsedContent::Bytes(bytes) => (bytes.clone(), target.clone()),
                _ => return Err(Error::NoCodec(target.essence_str().to_string())),
            },
        };

        if declared || effective != target {
            self.set_content_type(&effective);
        }
        self.set_content(Some(body), None);
        self.parsed = Some(content);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Content headers
    // ------------------------------------------------------------------

    /// Declared media type
    pub fn content_type(&self) -> Result<Option<Mime>> {
        match self.headers.get(CONTENT_TYPE) {
            None => Ok(None),
            Some(value) => value
                .parse::<Mime>()
                .map(Some)
                .map_err(|_| Error::InvalidMediaType(value.to_string())),
        }
    }

    pub fn set_content_type(&mut self, media_type: &Mime) {
        self.set_header(CONTENT_TYPE, media_type.to_string(), true);
    }

    pub fn delete_content_type(&mut self) {
        self.delete_header(CONTENT_TYPE);
    }

    /// Declared content languages
    pub fn content_language(&self) -> Vec<String> {
        self.headers
            .get(CONTENT_LANGUAGE)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|lang| !lang.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_content_language<I, S>(&mut self, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let value = languages
            .into_iter()
            .map(|lang| lang.as_ref().trim().to_string())
            .filter(|lang| !lang.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        if value.is_empty() {
            self.delete_content_language();
        } else {
            self.set_header(CONTENT_LANGUAGE, value, true);
        }
    }

    pub fn delete_content_language(&mut self) {
        self.delete_header(CONTENT_LANGUAGE);
    }

    /// Valid Content-Range values; malformed ones are skipped
    pub fn content_ranges(&self) -> Vec<ContentRange> {
        self.headers
            .get(CONTENT_RANGE)
            .map(parse_content_ranges)
            .unwrap_or_default()
    }

    pub fn set_content_range(&mut self, ranges: &[ContentRange]) {
        if ranges.is_empty() {
            self.delete_content_range();
        } else {
            self.set_header(CONTENT_RANGE, format_content_ranges(ranges), true);
        }
    }

    pub fn delete_content_range(&mut self) {
        self.delete_header(CONTENT_RANGE);
    }

    /// Content-Location reference, unparsed
    pub fn content_location(&self) -> Option<&str> {
        self.headers.get(CONTENT_LOCATION)
    }

    pub fn set_content_location(&mut self, location: impl Into<String>) {
        self.set_header(CONTENT_LOCATION, location, true);
    }

    pub fn delete_content_location(&mut self) {
        self.delete_header(CONTENT_LOCATION);
    }

    pub fn md5_digest(&self) -> Option<&str> {
        self.headers.get(CONTENT_MD5)
    }

    /// Set Content-MD5 to the base64 MD5 of the raw content.
    ///
    /// Returns false when there is no content.
    pub fn generate_md5_digest(&mut self) -> bool {
        let Some(content) = &self.content else {
            return false;
        };
        let digest = BASE64_STANDARD.encode(Md5::digest(content));
        self.headers.insert(CONTENT_MD5, digest);
        true
    }

    pub fn delete_md5_digest(&mut self) {
        self.delete_header(CONTENT_MD5);
    }

    // ------------------------------------------------------------------
    // User agent
    // ------------------------------------------------------------------

    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get(USER_AGENT)
    }

    pub fn set_user_agent(&mut self, agent: impl Into<String>) {
        self.set_header(USER_AGENT, agent, true);
    }

    pub fn delete_user_agent(&mut self) {
        self.delete_header(USER_AGENT);
    }

    // ------------------------------------------------------------------
    // Cookies
    // ------------------------------------------------------------------

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name)
    }

    pub fn set_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.set(name, value);
    }

    pub fn delete_cookie(&mut self, name: &str) {
        self.cookies.remove(name);
    }

    /// Replace the cookies with those of a Cookie header value
    pub fn load_cookies(&mut self, header: &str) {
        self.cookies = CookieJar::parse(header);
    }
}
