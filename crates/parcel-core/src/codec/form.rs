//! Form codecs: `multipart/form-data` and `application/x-www-form-urlencoded`

use super::{CodecError, ContentCodec, ParsedContent, Serialized};
use mime::Mime;
use parcel_form::{multipart, urlencoded, MultipartError};

/// `multipart/form-data` codec
#[derive(Debug, Clone)]
pub struct MultipartFormCodec {
    boundary_len: usize,
}

impl Default for MultipartFormCodec {
    fn default() -> Self {
        Self::new(multipart::DEFAULT_BOUNDARY_LEN)
    }
}

impl MultipartFormCodec {
    /// Create a codec generating boundaries with `boundary_len` random characters
    pub fn new(boundary_len: usize) -> Self {
        Self {
            boundary_len: boundary_len.max(1),
        }
    }
}

impl ContentCodec for MultipartFormCodec {
    fn parse(&self, body: &[u8], media_type: &Mime) -> Result<ParsedContent, CodecError> {
        let boundary = multipart::boundary_of(media_type).ok_or(MultipartError::MissingBoundary)?;
        let form = multipart::parse(body, &boundary)?;
        log::trace!("parsed multipart body with {} fields", form.len());
        Ok(ParsedContent::Form(form))
    }

    fn serialize(&self, content: &ParsedContent, media_type: &Mime) -> Result<Serialized, CodecError> {
        let ParsedContent::Form(form) = content else {
            return Err(CodecError::unexpected("form", content));
        };

        if let Some(boundary) = multipart::boundary_of(media_type) {
            return Ok(Serialized {
                body: multipart::serialize(form, &boundary),
                media_type: media_type.clone(),
            });
        }

        let boundary = multipart::generate_boundary(form, self.boundary_len);
        let mut raw = format!("{}; boundary={}", media_type.essence_str(), boundary);
        for (name, value) in media_type.params() {
            if name.as_str() != "boundary" {
                raw.push_str(&format!("; {}={}", name.as_str(), value.as_str()));
            }
        }
        let media_type = raw
            .parse::<Mime>()
            .map_err(|e| CodecError::Malformed(format!("cannot build media type {raw:?}: {e}")))?;

        Ok(Serialized {
            body: multipart::serialize(form, &boundary),
            media_type,
        })
    }
}

/// `application/x-www-form-urlencoded` codec
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlEncodedFormCodec;

impl ContentCodec for UrlEncodedFormCodec {
    fn parse(&self, body: &[u8], _media_type: &Mime) -> Result<ParsedContent, CodecError> {
        Ok(ParsedContent::Form(urlencoded::parse(body)))
    }

    fn serialize(&self, content: &ParsedContent, media_type: &Mime) -> Result<Serialized, CodecError> {
        let ParsedContent::Form(form) = content else {
            return Err(CodecError::unexpected("form", content));
        };
        Ok(Serialized {
            body: urlencoded::serialize(form)?.into_bytes(),
            media_type: media_type.clone(),
        })
    }
}
