//! parcel-core: HTTP message content pipeline
//!
//! A [`Message`] holds headers, cookies and a body. The body moves between
//! raw bytes, decoded bytes (Content-Encoding reversed) and a parsed object
//! produced by the codec that a [`ParserRegistry`] holds for its media type.
//!
//! ## Features
//! - `xml` - XML codec via quick-xml (default)
//! - `html` - HTML codec via scraper (default)
//!
//! ## Example
//! ```
//! use parcel_core::{Message, ParsedContent, ParserRegistry};
//! use parcel_form::FormData;
//!
//! let registry = ParserRegistry::with_builtins();
//!
//! let mut form = FormData::new();
//! form.insert_text("greeting", "hello");
//!
//! let mut msg = Message::new();
//! msg.set_parsed_content(&registry, ParsedContent::Form(form), Some(mime::MULTIPART_FORM_DATA))
//!     .unwrap();
//! assert!(msg.header("content-type").unwrap().contains("boundary="));
//!
//! let parsed = msg.parsed_content(&registry).unwrap();
//! assert_eq!(parsed.as_form().unwrap().text("greeting"), Some("hello"));
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod cookie;
pub mod encoding;
pub mod error;
pub mod headers;
pub mod message;
pub mod range;
pub mod registry;
pub mod request;
pub mod response;

// Re-exports
pub use codec::{CodecError, ContentCodec, ParsedContent, Serialized};
pub use config::{CompressionLevel, ContentConfig};
pub use cookie::CookieJar;
pub use encoding::{
    negotiate, parse_accept_encoding, AcceptedEncoding, Coding, ContentEncoding, EncodingError, EncodingRange,
};
pub use error::{Error, Result};
pub use headers::HeaderMap;
pub use message::Message;
pub use range::{ContentRange, Range};
pub use registry::ParserRegistry;
pub use request::{Request, RequestBuilder};
pub use response::{Response, ResponseBuilder};

pub use parcel_form::{FileEntry, FormData, FormEntry};
