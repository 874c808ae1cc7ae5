//! multipart/form-data codec
//!
//! Body layout:
//! ```text
//! --boundary CRLF headers CRLF CRLF body
//! CRLF --boundary CRLF headers CRLF CRLF body
//! CRLF --boundary-- CRLF
//! ```
//! Text before the first delimiter and after the closing one is ignored.

use crate::{FileEntry, FormData, FormEntry, MultipartError};
use bytes::Bytes;
use memchr::memmem;
use mime::Mime;
use rand::distr::Alphanumeric;
use rand::Rng;
use smallvec::SmallVec;

const CRLF: &[u8] = b"\r\n";
const DASHES: &[u8] = b"--";

/// Default length of the random part of a generated boundary
pub const DEFAULT_BOUNDARY_LEN: usize = 32;

/// Get the `boundary` parameter of a media type
pub fn boundary_of(media_type: &Mime) -> Option<String> {
    media_type
        .get_param(mime::BOUNDARY)
        .map(|value| value.as_str().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Parse a decoded multipart body into form data
pub fn parse(body: &[u8], boundary: &str) -> Result<FormData, MultipartError> {
    if boundary.is_empty() {
        return Err(MultipartError::MissingBoundary);
    }

    let mut form = FormData::new();
    for (index, part) in split_parts(body, boundary)?.into_iter().enumerate() {
        if let Some((name, entry)) = parse_part(part, index)? {
            form.insert(name, entry);
        }
    }
    Ok(form)
}

/// Serialize form data with the given boundary
pub fn serialize(form: &FormData, boundary: &str) -> Vec<u8> {
    let payload: usize = form.iter().map(|(_, entry)| entry.payload().len() + 128).sum();
    let mut out = Vec::with_capacity(payload + boundary.len() * (form.len() + 1));

    for (name, entry) in form.iter() {
        out.extend_from_slice(DASHES);
        out.extend_from_slice(boundary.as_bytes());
        out.extend_from_slice(CRLF);

        out.extend_from_slice(b"Content-Disposition: form-data; name=\"");
        out.extend_from_slice(escape(name).as_bytes());
        out.push(b'"');
        if let FormEntry::File(file) = entry {
            out.extend_from_slice(b"; filename=\"");
            out.extend_from_slice(escape(&file.filename).as_bytes());
            out.push(b'"');
            out.extend_from_slice(CRLF);
            out.extend_from_slice(b"Content-Type: ");
            out.extend_from_slice(file.media_type.to_string().as_bytes());
        }
        out.extend_from_slice(CRLF);
        out.extend_from_slice(CRLF);
        out.extend_from_slice(entry.payload());
        out.extend_from_slice(CRLF);
    }

    out.extend_from_slice(DASHES);
    out.extend_from_slice(boundary.as_bytes());
    out.extend_from_slice(DASHES);
    out.extend_from_slice(CRLF);
    out
}

/// Generate a random boundary that does not occur in any field of `form`
pub fn generate_boundary(form: &FormData, len: usize) -> String {
    let mut rng = rand::rng();
    loop {
        let token: String = (&mut rng)
            .sample_iter(Alphanumeric)
            .take(len.max(1))
            .map(char::from)
            .collect();
        let boundary = format!("------------------------{token}");

        let finder = memmem::Finder::new(boundary.as_bytes());
        let collides = form.iter().any(|(name, entry)| {
            finder.find(name.as_bytes()).is_some() || finder.find(entry.payload()).is_some()
        });
        if !collides {
            return boundary;
        }
        log::trace!("generated boundary collides with form content, retrying");
    }
}

/// Split the body into raw parts (headers + body), dropping empty ones
fn split_parts<'a>(body: &'a [u8], boundary: &str) -> Result<Vec<&'a [u8]>, MultipartError> {
    let mut delimiter = Vec::with_capacity(boundary.len() + 4);
    delimiter.extend_from_slice(CRLF);
    delimiter.extend_from_slice(DASHES);
    delimiter.extend_from_slice(boundary.as_bytes());
    let finder = memmem::Finder::new(&delimiter);

    // The first delimiter may sit at the very start, without its leading CRLF.
    let mut cursor = if body.starts_with(&delimiter[2..]) {
        delimiter.len() - 2
    } else {
        finder.find(body).ok_or(MultipartError::MissingDelimiter)? + delimiter.len()
    };

    let mut parts = Vec::new();
    loop {
        let rest = &body[cursor..];
        if rest.starts_with(DASHES) {
            return Ok(parts);
        }
        if !rest.starts_with(CRLF) {
            return Err(MultipartError::MalformedDelimiter { offset: cursor });
        }

        let start = cursor + CRLF.len();
        let len = finder.find(&body[start..]).ok_or(MultipartError::Unterminated)?;
        let part = &body[start..start + len];
        if !part.is_empty() {
            parts.push(part);
        }
        cursor = start + len + delimiter.len();
    }
}

/// Parse one part; `None` when it is not a form-data field
fn parse_part(part: &[u8], index: usize) -> Result<Option<(String, FormEntry)>, MultipartError> {
    let (head, content) = if let Some(content) = part.strip_prefix(CRLF) {
        (&[][..], content)
    } else {
        let end = memmem::find(part, b"\r\n\r\n").ok_or(MultipartError::MissingHeaderTerminator { index })?;
        (&part[..end], &part[end + 4..])
    };

    let headers = parse_headers(head);
    let Some(disposition) = header(&headers, "content-disposition").and_then(parse_disposition) else {
        log::debug!("skipping multipart part {index} without a form-data disposition");
        return Ok(None);
    };
    let name = disposition.param("name").ok_or(MultipartError::MissingName { index })?;

    let entry = match disposition.param("filename") {
        Some(filename) if !filename.is_empty() => {
            let media_type = match header(&headers, "content-type") {
                Some(value) => value.parse::<Mime>().map_err(|_| MultipartError::InvalidContentType {
                    index,
                    value: value.to_string(),
                })?,
                None => mime::TEXT_PLAIN,
            };
            FormEntry::File(FileEntry {
                filename: filename.to_string(),
                media_type,
                content: Bytes::copy_from_slice(content),
            })
        }
        _ => FormEntry::Text(String::from_utf8_lossy(content).into_owned()),
    };

    Ok(Some((name.to_string(), entry)))
}

type PartHeaders = SmallVec<[(String, String); 4]>;

/// Parse `name: value` lines; lines without a colon are ignored
fn parse_headers(head: &[u8]) -> PartHeaders {
    let head = String::from_utf8_lossy(head);
    head.split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn header<'a>(headers: &'a PartHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Parameters of a `form-data` disposition, names lowercased
struct Disposition {
    params: SmallVec<[(String, String); 2]>,
}

impl Disposition {
    fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// Parse `form-data; name="a"; filename=b.txt`
fn parse_disposition(value: &str) -> Option<Disposition> {
    let (kind, mut rest) = match value.find(';') {
        Some(idx) => (&value[..idx], &value[idx..]),
        None => (value, ""),
    };
    if !kind.trim().eq_ignore_ascii_case("form-data") {
        return None;
    }

    let mut params = SmallVec::new();
    while let Some(after) = rest.trim_start().strip_prefix(';') {
        let after = after.trim_start();
        let Some(idx) = after.find(['=', ';']) else {
            break;
        };
        if after.as_bytes()[idx] == b';' {
            // flag parameter without a value
            rest = &after[idx..];
            continue;
        }

        let key = after[..idx].trim().to_ascii_lowercase();
        let tail = after[idx + 1..].trim_start();
        let (value, remaining) = match tail.strip_prefix('"') {
            Some(quoted) => match quoted.find('"') {
                Some(end) => (&quoted[..end], &quoted[end + 1..]),
                None => (quoted, ""),
            },
            None => match tail.find(';') {
                Some(end) => (tail[..end].trim_end(), &tail[end..]),
                None => (tail.trim_end(), ""),
            },
        };
        params.push((key, unescape(value)));
        rest = remaining;
    }

    Some(Disposition { params })
}

/// Escape the characters that cannot appear inside a quoted disposition value
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            '"' => out.push_str("%22"),
            '\r' => out.push_str("%0D"),
            '\n' => out.push_str("%0A"),
            c => out.push(c),
        }
    }
    out
}

/// Inverse of [`escape`]; other `%` sequences are kept as written
fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let decoded = match tail.get(1..3).map(str::to_ascii_uppercase).as_deref() {
            Some("25") => Some('%'),
            Some("22") => Some('"'),
            Some("0D") => Some('\r'),
            Some("0A") => Some('\n'),
            _ => None,
        };
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &tail[3..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
