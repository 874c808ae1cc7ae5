//! HTTP Response

use crate::message::Message;
use bytes::Bytes;
use http::{StatusCode, Version};
use std::ops::{Deref, DerefMut};

/// HTTP Response: a status around a [`Message`]
#[derive(Debug, Clone)]
pub struct Response {
    /// Status code
    pub status: StatusCode,
    message: Message,
}

impl Response {
    /// Create a new response
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            message: Message::new(),
        }
    }

    /// Create a 200 OK response
    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Status line, e.g. `HTTP/1.0 404 Not Found`
    pub fn status_line(&self) -> String {
        format!(
            "{:?} {} {}",
            self.version(),
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Unknown")
        )
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

impl Deref for Response {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.message
    }
}

impl DerefMut for Response {
    fn deref_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

/// Builder for constructing responses
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    /// Create a new builder
    pub fn new(status: StatusCode) -> Self {
        Self {
            response: Response::new(status),
        }
    }

    pub fn version(mut self, version: Version) -> Self {
        self.response.set_version(version);
        self
    }

    /// Add a header, replacing any existing value
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.response.set_header(name, value, true);
        self
    }

    /// Set raw (unencoded) content
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.response.set_content(Some(body.into()), None);
        self
    }

    /// Build the response
    pub fn build(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::parse_accept_encoding;
    use crate::ParserRegistry;

    #[test]
    fn test_status_line() {
        let resp = Response::new(StatusCode::NOT_FOUND);
        assert_eq!(resp.status_line(), "HTTP/1.0 404 Not Found");

        let resp = ResponseBuilder::new(StatusCode::OK).version(Version::HTTP_11).build();
        assert_eq!(resp.status_line(), "HTTP/1.1 200 OK");
    }

    #[test]
    fn test_compressed_body() {
        let mut resp = ResponseBuilder::new(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .body("compress me, compress me, compress me")
            .build();

        let chosen = resp.encode_content(&parse_accept_encoding("gzip")).unwrap();
        assert_eq!(chosen.to_string(), "gzip");
        assert_eq!(resp.header("content-encoding"), Some("gzip"));

        let registry = ParserRegistry::with_builtins();
        let parsed = resp.parsed_content(&registry).unwrap();
        assert_eq!(
            parsed.as_bytes().map(|b| &b[..]),
            Some(&b"compress me, compress me, compress me"[..])
        );
    }

    #[test]
    fn test_malformed_content_not_escalated() {
        let registry = ParserRegistry::with_builtins();
        let mut resp = ResponseBuilder::new(StatusCode::OK)
            .header("Content-Type", "multipart/form-data; boundary=b")
            .body("garbage")
            .build();

        let err = resp.parsed_content(&registry).unwrap_err();
        assert!(matches!(err, crate::Error::MalformedContent { .. }));
    }
}
