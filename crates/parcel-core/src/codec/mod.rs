//! Content codecs - convert decoded bodies to and from structured objects
//!
//! A codec is registered in a [`ParserRegistry`](crate::ParserRegistry) for
//! one or more media types. Codecs are stateless and may be shared freely.

pub mod form;
#[cfg(feature = "html")]
pub mod html;
#[cfg(feature = "xml")]
pub mod xml;

use bytes::Bytes;
use mime::Mime;
use parcel_form::{FormData, FormError, MultipartError};
use std::any::Any;
use std::sync::Arc;
use thiserror::Error;

pub use form::{MultipartFormCodec, UrlEncodedFormCodec};
#[cfg(feature = "html")]
pub use html::{HtmlCodec, HtmlDocument};
#[cfg(feature = "xml")]
pub use xml::{XmlCodec, XmlDocument};

/// Errors raised by content codecs
#[derive(Debug, Error)]
pub enum CodecError {
    /// The body is structurally invalid for the media type
    #[error("{0}")]
    Malformed(String),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Form(#[from] FormError),

    /// The body is not valid UTF-8 where text is required
    #[error("content is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The codec was handed an object it cannot serialize
    #[error("expected {expected} content, got {found}")]
    UnexpectedContent {
        expected: &'static str,
        found: &'static str,
    },
}

/// A structured view of a message body
#[derive(Debug, Clone)]
pub enum ParsedContent {
    /// Opaque decoded bytes, used when no codec is registered
    Bytes(Bytes),
    /// Form fields (multipart or URL-encoded)
    Form(FormData),
    #[cfg(feature = "xml")]
    Xml(XmlDocument),
    #[cfg(feature = "html")]
    Html(HtmlDocument),
    /// Object produced by an application-registered codec
    Custom(Arc<dyn Any + Send + Sync>),
}

impl ParsedContent {
    /// Variant name, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ParsedContent::Bytes(_) => "bytes",
            ParsedContent::Form(_) => "form",
            #[cfg(feature = "xml")]
            ParsedContent::Xml(_) => "xml",
            #[cfg(feature = "html")]
            ParsedContent::Html(_) => "html",
            ParsedContent::Custom(_) => "custom",
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ParsedContent::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&FormData> {
        match self {
            ParsedContent::Form(form) => Some(form),
            _ => None,
        }
    }

    #[cfg(feature = "xml")]
    pub fn as_xml(&self) -> Option<&XmlDocument> {
        match self {
            ParsedContent::Xml(doc) => Some(doc),
            _ => None,
        }
    }

    #[cfg(feature = "html")]
    pub fn as_html(&self) -> Option<&HtmlDocument> {
        match self {
            ParsedContent::Html(doc) => Some(doc),
            _ => None,
        }
    }

    /// Downcast a custom object
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            ParsedContent::Custom(value) => value.downcast_ref(),
            _ => None,
        }
    }
}

impl From<FormData> for ParsedContent {
    fn from(form: FormData) -> Self {
        ParsedContent::Form(form)
    }
}

impl From<Bytes> for ParsedContent {
    fn from(bytes: Bytes) -> Self {
        ParsedContent::Bytes(bytes)
    }
}

/// Output of [`ContentCodec::serialize`]
#[derive(Debug, Clone)]
pub struct Serialized {
    pub body: Vec<u8>,
    /// Media type describing `body`, e.g. with a generated boundary added
    pub media_type: Mime,
}

/// Parse/serialize pair for one family of media types
pub trait ContentCodec: Send + Sync {
    /// Parse a decoded body
    fn parse(&self, body: &[u8], media_type: &Mime) -> Result<ParsedContent, CodecError>;

    /// Serialize an object into a body for `media_type`
    fn serialize(&self, content: &ParsedContent, media_type: &Mime) -> Result<Serialized, CodecError>;
}

impl CodecError {
    pub(crate) fn unexpected(expected: &'static str, found: &ParsedContent) -> Self {
        CodecError::UnexpectedContent {
            expected,
            found: found.kind(),
        }
    }
}
