use bytes::Bytes;
use mime::Mime;
use parcel_core::{
    parse_accept_encoding, CodecError, ContentCodec, ContentEncoding, Error, FileEntry, FormData, Message,
    ParsedContent, ParserRegistry, Serialized,
};
use std::sync::Arc;

/// Parses `key: value` lines into a list of pairs
struct KeyValueCodec;

#[derive(Debug, PartialEq)]
struct Pairs(Vec<(String, String)>);

impl ContentCodec for KeyValueCodec {
    fn parse(&self, body: &[u8], _media_type: &Mime) -> Result<ParsedContent, CodecError> {
        let text = std::str::from_utf8(body)?;
        let mut pairs = Vec::new();
        for line in text.lines().filter(|line| !line.is_empty()) {
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| CodecError::Malformed(format!("missing ':' in {line:?}")))?;
            pairs.push((key.trim().to_string(), value.trim().to_string()));
        }
        Ok(ParsedContent::Custom(Arc::new(Pairs(pairs))))
    }

    fn serialize(&self, content: &ParsedContent, media_type: &Mime) -> Result<Serialized, CodecError> {
        let pairs = content.downcast_ref::<Pairs>().ok_or(CodecError::UnexpectedContent {
            expected: "pairs",
            found: content.kind(),
        })?;
        let body = pairs.0.iter().map(|(k, v)| format!("{k}: {v}\n")).collect::<String>();
        Ok(Serialized {
            body: body.into_bytes(),
            media_type: media_type.clone(),
        })
    }
}

fn key_value_type() -> Mime {
    "text/x-key-value".parse().unwrap()
}

#[test]
fn test_multipart_round_trip_through_message() {
    let registry = ParserRegistry::with_builtins();

    let mut form = FormData::new();
    form.insert_text("title", "Report");
    form.insert_file("doc", FileEntry::new("r.csv", mime::TEXT_CSV, "a,b\r\n1,2\r\n"));

    let mut sender = Message::new();
    sender
        .set_parsed_content(&registry, ParsedContent::Form(form.clone()), Some(mime::MULTIPART_FORM_DATA))
        .unwrap();
    let content_type = sender.header("Content-Type").unwrap().to_string();
    assert!(content_type.starts_with("multipart/form-data; boundary="));

    let mut receiver = Message::new();
    receiver.set_header("content-type", content_type, true);
    receiver.set_content(sender.content().cloned(), None);

    let parsed = receiver.parsed_content(&registry).unwrap();
    assert_eq!(parsed.as_form(), Some(&form));
}

#[test]
fn test_compressed_multipart_body() {
    let registry = ParserRegistry::with_builtins();

    let mut form = FormData::new();
    form.insert_text("q", "x".repeat(500));

    let mut msg = Message::new();
    msg.set_parsed_content(&registry, ParsedContent::Form(form.clone()), Some(mime::MULTIPART_FORM_DATA))
        .unwrap();
    let plain_len = msg.content().map(Bytes::len).unwrap();

    msg.encode_content(&parse_accept_encoding("gzip")).unwrap();
    assert!(msg.content().map(Bytes::len).unwrap() < plain_len);

    let parsed = msg.parsed_content(&registry).unwrap();
    assert_eq!(parsed.as_form(), Some(&form));
}

#[test]
fn test_codec_miss_passthrough() {
    let registry = ParserRegistry::with_builtins();
    let mut msg = Message::new();
    msg.set_header("Content-Type", "image/png", true);
    msg.set_content(Some(Bytes::from_static(b"\x89PNG")), None);

    let parsed = msg.parsed_content(&registry).unwrap();
    assert_eq!(parsed.as_bytes().map(|b| &b[..]), Some(&b"\x89PNG"[..]));

    let mut untyped = Message::new();
    untyped.set_content(Some(Bytes::from_static(b"blob")), None);
    assert!(untyped.parsed_content(&registry).unwrap().as_bytes().is_some());
}

#[test]
fn test_cache_follows_content() {
    let registry = ParserRegistry::new();
    registry.register(&key_value_type(), Arc::new(KeyValueCodec));

    let mut msg = Message::new();
    msg.set_content_type(&key_value_type());
    msg.set_content(Some(Bytes::from_static(b"a: 1\n")), None);

    let first = msg.parsed_content(&registry).unwrap();
    assert_eq!(first.downcast_ref::<Pairs>(), Some(&Pairs(vec![("a".into(), "1".into())])));

    msg.set_content(Some(Bytes::from_static(b"b: 2\n")), None);
    let second = msg.parsed_content(&registry).unwrap();
    assert_eq!(second.downcast_ref::<Pairs>(), Some(&Pairs(vec![("b".into(), "2".into())])));
}

#[test]
fn test_set_parsed_content_seeds_cache() {
    let registry = ParserRegistry::new();
    registry.register(&key_value_type(), Arc::new(KeyValueCodec));

    let pairs = ParsedContent::Custom(Arc::new(Pairs(vec![("k".into(), "v".into())])));
    let mut msg = Message::new();
    msg.set_parsed_content(&registry, pairs, Some(key_value_type())).unwrap();

    assert_eq!(msg.content().map(|c| &c[..]), Some(&b"k: v\n"[..]));
    assert_eq!(msg.header("content-length"), Some("5"));

    // Registering a replacement codec does not affect the cached object
    registry.register(&key_value_type(), Arc::new(KeyValueCodec));
    let cached = msg.parsed_content(&registry).unwrap();
    assert!(cached.downcast_ref::<Pairs>().is_some());
}

#[test]
fn test_custom_codec_rejection() {
    let registry = ParserRegistry::new();
    registry.register(&key_value_type(), Arc::new(KeyValueCodec));

    let mut msg = Message::new();
    msg.set_content_type(&key_value_type());
    msg.set_content(Some(Bytes::from_static(b"no separator")), None);

    let err = msg.parsed_content(&registry).unwrap_err();
    assert!(err.is_malformed_input());
    assert!(matches!(err, Error::MalformedContent { ref media_type, .. } if media_type == "text/x-key-value"));
}

#[test]
fn test_serialize_rejection() {
    let registry = ParserRegistry::with_builtins();
    let mut msg = Message::new();

    let err = msg
        .set_parsed_content(
            &registry,
            ParsedContent::Bytes(Bytes::from_static(b"raw")),
            Some(mime::APPLICATION_WWW_FORM_URLENCODED),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Serialize { .. }));
    assert!(msg.content().is_none());
    assert_eq!(msg.header("Content-Type"), None);
}

#[test]
fn test_decode_content_idempotent() {
    let mut msg = Message::new();
    let deflate = ContentEncoding::deflate();
    msg.set_content(Some(deflate.encode(b"once").unwrap().into()), Some(&deflate));

    msg.decode_content().unwrap();
    let after_first = msg.clone();
    msg.decode_content().unwrap();

    assert_eq!(msg.content(), after_first.content());
    assert_eq!(msg.headers(), after_first.headers());
    assert_eq!(msg.content().map(|c| &c[..]), Some(&b"once"[..]));
}

#[test]
fn test_multi_member_gzip() {
    let gzip = ContentEncoding::gzip();
    let mut body = gzip.encode(b"first ").unwrap();
    body.extend(gzip.encode(b"second").unwrap());

    let mut msg = Message::new();
    msg.set_content(Some(body.into()), Some(&gzip));
    assert_eq!(msg.decoded_content().unwrap().as_deref(), Some(&b"first second"[..]));
}

#[cfg(feature = "xml")]
#[test]
fn test_xml_content() {
    let registry = ParserRegistry::with_builtins();
    let mut msg = Message::new();
    msg.set_header("Content-Type", "application/atom+xml", true);
    msg.set_content(Some(Bytes::from_static(b"<feed><title>t</title></feed>")), None);

    // No codec for atom: passthrough
    assert!(msg.parsed_content(&registry).unwrap().as_bytes().is_some());

    msg.set_header("Content-Type", "application/xml; charset=utf-8", true);
    let doc = msg.parsed_content(&registry).unwrap().as_xml().unwrap();
    assert_eq!(doc.root_name().as_deref(), Some("feed"));
    assert_eq!(doc.text(), "t");
}

#[cfg(feature = "xml")]
#[test]
fn test_xml_trailing_text_is_malformed() {
    let registry = ParserRegistry::with_builtins();
    let mut msg = Message::new();
    msg.set_header("Content-Type", "application/xml", true);
    msg.set_content(Some(Bytes::from_static(b"<a/>trailing junk")), None);

    let err = msg.parsed_content(&registry).unwrap_err();
    assert!(err.is_malformed_input());
    assert!(matches!(err, Error::MalformedContent { ref media_type, .. } if media_type == "application/xml"));
}
