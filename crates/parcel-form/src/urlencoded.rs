//! application/x-www-form-urlencoded codec

use crate::{FormData, FormEntry, FormError};

/// Parse a URL-encoded body (`a=1&b=two+words&flag`).
///
/// `+` decodes to a space, a key without `=` gets an empty value, and later
/// pairs replace earlier ones with the same key.
pub fn parse(body: &[u8]) -> FormData {
    let mut form = FormData::new();
    for pair in body.split(|&b| b == b'&') {
        if pair.is_empty() {
            continue;
        }
        let (key, value) = match pair.iter().position(|&b| b == b'=') {
            Some(idx) => (&pair[..idx], &pair[idx + 1..]),
            None => (pair, &[][..]),
        };
        form.insert_text(decode_component(key), decode_component(value));
    }
    form
}

/// Serialize text fields as a URL-encoded body
pub fn serialize(form: &FormData) -> Result<String, FormError> {
    let mut out = String::new();
    for (name, entry) in form.iter() {
        let FormEntry::Text(value) = entry else {
            return Err(FormError::FileInUrlEncoded { name: name.to_string() });
        };
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&urlencoding::encode(name));
        out.push('=');
        out.push_str(&urlencoding::encode(value));
    }
    Ok(out)
}

fn decode_component(raw: &[u8]) -> String {
    let spaced: Vec<u8> = raw.iter().map(|&b| if b == b'+' { b' ' } else { b }).collect();
    String::from_utf8_lossy(&urlencoding::decode_binary(&spaced)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileEntry;

    #[test]
    fn test_parse_pairs() {
        let form = parse(b"name=Larry+Page&city=S%C3%A3o%20Paulo&flag&&name2=a%2Bb");

        assert_eq!(form.text("name"), Some("Larry Page"));
        assert_eq!(form.text("city"), Some("São Paulo"));
        assert_eq!(form.text("flag"), Some(""));
        assert_eq!(form.text("name2"), Some("a+b"));
        assert_eq!(form.len(), 4);
    }

    #[test]
    fn test_parse_last_wins() {
        let form = parse(b"a=1&a=2");
        assert_eq!(form.text("a"), Some("2"));
    }

    #[test]
    fn test_serialize_round_trip() {
        let form: FormData = [("q", "rust & go"), ("n", "1+1=2")].into_iter().collect();
        let body = serialize(&form).unwrap();

        assert_eq!(body, "q=rust%20%26%20go&n=1%2B1%3D2");
        assert_eq!(parse(body.as_bytes()), form);
    }

    #[test]
    fn test_serialize_rejects_files() {
        let mut form = FormData::new();
        form.insert_file("f", FileEntry::new("x.txt", mime::TEXT_PLAIN, "hi"));

        assert_eq!(
            serialize(&form),
            Err(FormError::FileInUrlEncoded { name: "f".to_string() })
        );
    }
}
