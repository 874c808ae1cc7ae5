//! Error types for parcel-core

use crate::codec::CodecError;
use crate::encoding::EncodingError;
use http::StatusCode;
use thiserror::Error;

/// Result type alias for parcel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the content pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Content-encoding failure (unsupported token, corrupt stream)
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// A registered codec rejected the decoded body
    #[error("malformed {media_type} content: {source}")]
    MalformedContent {
        media_type: String,
        #[source]
        source: CodecError,
    },

    /// A registered codec could not serialize the given object
    #[error("cannot serialize content as {media_type}: {source}")]
    Serialize {
        media_type: String,
        #[source]
        source: CodecError,
    },

    /// No codec can serialize a structured object for this media type
    #[error("no content codec registered for {0}")]
    NoCodec(String),

    /// The message has no body
    #[error("message has no content")]
    NoContent,

    /// A media type header could not be parsed
    #[error("invalid media type: {0}")]
    InvalidMediaType(String),

    /// A header holds a value of the wrong shape
    #[error("invalid {name} header: {value}")]
    InvalidHeader { name: &'static str, value: String },

    /// Untrusted request content was rejected
    #[error("bad request: {0}")]
    BadRequest(#[source] Box<Error>),
}

impl Error {
    /// Whether the fault lies with the content supplied by the peer
    pub fn is_malformed_input(&self) -> bool {
        match self {
            Error::MalformedContent { .. } | Error::BadRequest(_) => true,
            Error::Encoding(e) => e.is_decode(),
            _ => false,
        }
    }

    /// HTTP status a server should answer with for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) | Error::MalformedContent { .. } | Error::InvalidHeader { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::Encoding(e) if e.is_decode() => StatusCode::BAD_REQUEST,
            Error::Encoding(_) | Error::NoCodec(_) | Error::InvalidMediaType(_) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            Error::Serialize { .. } | Error::NoContent => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify as a client fault if the error stems from malformed input
    pub(crate) fn into_bad_request(self) -> Self {
        if self.is_malformed_input() && !matches!(self, Error::BadRequest(_)) {
            Error::BadRequest(Box::new(self))
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Coding;

    #[test]
    fn test_status_mapping() {
        let decode = Error::Encoding(EncodingError::Decode {
            coding: Coding::Gzip,
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "bad header"),
        });
        assert!(decode.is_malformed_input());
        assert_eq!(decode.status(), StatusCode::BAD_REQUEST);

        let unsupported = Error::Encoding(EncodingError::Unsupported("br".to_string()));
        assert!(!unsupported.is_malformed_input());
        assert_eq!(unsupported.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(Error::NoContent.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_into_bad_request() {
        let err = Error::MalformedContent {
            media_type: "application/xml".to_string(),
            source: CodecError::Malformed("unexpected end".to_string()),
        };
        let wrapped = err.into_bad_request();

        assert!(matches!(wrapped, Error::BadRequest(_)));
        assert_eq!(wrapped.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(Error::NoContent.into_bad_request(), Error::NoContent));
    }
}
