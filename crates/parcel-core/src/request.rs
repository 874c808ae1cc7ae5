//! HTTP Request

use crate::codec::ParsedContent;
use crate::message::Message;
use crate::registry::ParserRegistry;
use crate::Result;
use bytes::Bytes;
use http::{Method, Version};
use parcel_form::{urlencoded, FormData};
use std::ops::{Deref, DerefMut};

/// HTTP Request: a method and target around a [`Message`]
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Request target (path and optional query)
    pub target: String,
    message: Message,
}

impl Request {
    /// Create a new request
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            message: Message::new(),
        }
    }

    /// Path part of the target
    pub fn path(&self) -> &str {
        self.target.split_once('?').map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Query string (without leading ?)
    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, query)| query)
    }

    /// Query string parsed as URL-encoded form fields
    pub fn query_form(&self) -> FormData {
        self.query()
            .map(|query| urlencoded::parse(query.as_bytes()))
            .unwrap_or_default()
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

    /// Parsed request content.
    ///
    /// Content the peer got wrong (a corrupt compressed stream or a body
    /// its codec rejects) is reported as [`Error::BadRequest`](crate::Error::BadRequest).
    pub fn parsed_content(&mut self, registry: &ParserRegistry) -> Result<&ParsedContent> {
        let method = &self.method;
        let target = &self.target;
        self.message.parsed_content(registry).map_err(|err| {
            let err = err.into_bad_request();
            if err.is_malformed_input() {
                log::warn!("rejected {method} {target} content: {err}");
            }
            err
        })
    }
}

impl Deref for Request {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.message
    }
}

impl DerefMut for Request {
    fn deref_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

/// Builder for constructing requests
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    /// Create a new builder
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            request: Request::new(method, target),
        }
    }

    pub fn version(mut self, version: Version) -> Self {
        self.request.set_version(version);
        self
    }

    /// Add a header, replacing any existing value
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.request.set_header(name, value, true);
        self
    }

    /// Set raw (unencoded) content
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request.set_content(Some(body.into()), None);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.set_cookie(name, value);
        self
    }

    /// Build the request
    pub fn build(self) -> Request {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ContentEncoding;
    use crate::headers::CONTENT_TYPE;
    use crate::Error;
    use http::StatusCode;

    #[test]
    fn test_target_parts() {
        let req = Request::new(Method::GET, "/search?q=rust+lang&page=2");
        assert_eq!(req.path(), "/search");
        assert_eq!(req.query(), Some("q=rust+lang&page=2"));

        let query = req.query_form();
        assert_eq!(query.text("q"), Some("rust lang"));
        assert_eq!(query.text("page"), Some("2"));

        let req = Request::new(Method::GET, "/");
        assert_eq!(req.path(), "/");
        assert!(req.query_form().is_empty());
    }

    #[test]
    fn test_builder() {
        let req = RequestBuilder::new(Method::POST, "/submit")
            .version(Version::HTTP_11)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("a=1&b=2")
            .cookie("sid", "abc")
            .build();

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.version(), Version::HTTP_11);
        assert_eq!(req.header("content-length"), Some("7"));
        assert_eq!(req.cookie("sid"), Some("abc"));
    }

    #[test]
    fn test_parsed_form() {
        let registry = ParserRegistry::with_builtins();
        let mut req = RequestBuilder::new(Method::POST, "/submit")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("a=1&b=two+words")
            .build();

        let form = req.parsed_content(&registry).unwrap().as_form().unwrap();
        assert_eq!(form.text("b"), Some("two words"));
    }

    #[test]
    fn test_malformed_content_is_bad_request() {
        let registry = ParserRegistry::with_builtins();
        let mut req = RequestBuilder::new(Method::POST, "/upload")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=xyz")
            .body("no delimiter here")
            .build();

        let err = req.parsed_content(&registry).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_corrupt_encoding_is_bad_request() {
        let registry = ParserRegistry::with_builtins();
        let mut req = Request::new(Method::POST, "/");
        req.set_content(Some(Bytes::from_static(b"not gzip")), Some(&ContentEncoding::gzip()));

        let err = req.parsed_content(&registry).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_unsupported_encoding_is_not_bad_request() {
        let registry = ParserRegistry::with_builtins();
        let mut req = RequestBuilder::new(Method::POST, "/")
            .body("data")
            .header("Content-Encoding", "br")
            .build();

        let err = req.parsed_content(&registry).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
