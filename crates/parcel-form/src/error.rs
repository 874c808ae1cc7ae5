//! Error types for parcel-form

use thiserror::Error;

/// Errors raised while tokenizing a `multipart/form-data` body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultipartError {
    /// The media type carries no `boundary` parameter
    #[error("multipart media type has no boundary parameter")]
    MissingBoundary,

    /// The body never contains the boundary delimiter
    #[error("multipart body does not contain the boundary delimiter")]
    MissingDelimiter,

    /// A delimiter is followed by something other than CRLF or `--`
    #[error("malformed multipart delimiter at byte {offset}")]
    MalformedDelimiter { offset: usize },

    /// The body ends before the closing delimiter
    #[error("multipart body is not terminated by a closing delimiter")]
    Unterminated,

    /// A part has no blank line between its headers and its body
    #[error("part {index} has no header terminator")]
    MissingHeaderTerminator { index: usize },

    /// A part's `Content-Disposition` has no `name` parameter
    #[error("part {index} has a form-data disposition without a name")]
    MissingName { index: usize },

    /// A file part declares an unparsable `Content-Type`
    #[error("part {index} has an invalid content type: {value}")]
    InvalidContentType { index: usize, value: String },
}

/// Errors raised by the URL-encoded form codec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// File entries have no URL-encoded representation
    #[error("field {name:?} is a file and cannot be URL-encoded")]
    FileInUrlEncoded { name: String },
}
