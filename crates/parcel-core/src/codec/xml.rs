//! XML codec (quick-xml)
//!
//! The document is kept as an owned event stream. Parsing checks
//! well-formedness; serializing re-emits the events with indentation.

use super::{CodecError, ContentCodec, ParsedContent, Serialized};
use mime::Mime;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

/// A well-formed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    events: Vec<Event<'static>>,
}

impl XmlDocument {
    /// Parse and check a document
    pub fn parse(text: &str) -> Result<Self, CodecError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut events = Vec::new();
        let mut depth = 0usize;
        let mut roots = 0usize;

        loop {
            let event = reader.read_event().map_err(|e| {
                CodecError::Malformed(format!("XML error at byte {}: {e}", reader.buffer_position()))
            })?;

            match &event {
                Event::Eof => break,
                Event::Start(_) | Event::Empty(_) if depth == 0 => {
                    roots += 1;
                    if roots > 1 {
                        return Err(CodecError::Malformed("multiple root elements".to_string()));
                    }
                }
                Event::Text(text) if depth == 0 && !text.iter().all(u8::is_ascii_whitespace) => {
                    return Err(CodecError::Malformed("text outside the root element".to_string()));
                }
                Event::CData(_) if depth == 0 => {
                    return Err(CodecError::Malformed("CDATA outside the root element".to_string()));
                }
                _ => {}
            }
            match &event {
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                _ => {}
            }
            events.push(event.into_owned());
        }

        if depth > 0 {
            return Err(CodecError::Malformed(format!("{depth} unclosed element(s)")));
        }
        if roots == 0 {
            return Err(CodecError::Malformed("no root element".to_string()));
        }
        Ok(Self { events })
    }

    pub fn events(&self) -> &[Event<'static>] {
        &self.events
    }

    /// Name of the document element
    pub fn root_name(&self) -> Option<String> {
        self.events.iter().find_map(|event| match event {
            Event::Start(tag) | Event::Empty(tag) => Some(String::from_utf8_lossy(tag.name().as_ref()).into_owned()),
            _ => None,
        })
    }

    /// Concatenated, unescaped character data
    pub fn text(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            match event {
                Event::Text(text) => match text.unescape() {
                    Ok(unescaped) => out.push_str(&unescaped),
                    Err(_) => out.push_str(&String::from_utf8_lossy(text)),
                },
                Event::CData(data) => out.push_str(&String::from_utf8_lossy(data)),
                _ => {}
            }
        }
        out
    }

    /// Render with two-space indentation
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        for event in &self.events {
            writer
                .write_event(event.clone())
                .map_err(|e| CodecError::Malformed(e.to_string()))?;
        }
        Ok(writer.into_inner())
    }
}

/// Codec for `text/xml`, `application/xml` and `+xml` media types
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl ContentCodec for XmlCodec {
    fn parse(&self, body: &[u8], _media_type: &Mime) -> Result<ParsedContent, CodecError> {
        let text = std::str::from_utf8(body)?;
        Ok(ParsedContent::Xml(XmlDocument::parse(text)?))
    }

    fn serialize(&self, content: &ParsedContent, media_type: &Mime) -> Result<Serialized, CodecError> {
        let ParsedContent::Xml(doc) = content else {
            return Err(CodecError::unexpected("xml", content));
        };
        Ok(Serialized {
            body: doc.to_bytes()?,
            media_type: media_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0"?>
<catalog>
    <item id="1">a &amp; b</item>
    <empty/>
</catalog>"#;

    #[test]
    fn test_parse() {
        let doc = XmlDocument::parse(DOC).unwrap();
        assert_eq!(doc.root_name().as_deref(), Some("catalog"));
        assert_eq!(doc.text(), "a & b");
    }

    #[test]
    fn test_serialize_round_trip() {
        let codec = XmlCodec;
        let parsed = codec.parse(DOC.as_bytes(), &mime::TEXT_XML).unwrap();
        let out = codec.serialize(&parsed, &mime::TEXT_XML).unwrap();

        let rendered = String::from_utf8(out.body.clone()).unwrap();
        assert!(rendered.contains(r#"<item id="1">a &amp; b</item>"#));
        assert!(rendered.contains("\n  <item"));

        let reparsed = codec.parse(&out.body, &mime::TEXT_XML).unwrap();
        assert_eq!(reparsed.as_xml(), parsed.as_xml());
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "<root><a></root>",
            "<root>",
            "",
            "<a/><b/>",
            "<a/>junk",
            "junk<a/>",
            "<a></a><![CDATA[x]]>",
        ] {
            let err = XmlDocument::parse(bad).unwrap_err();
            assert!(matches!(err, CodecError::Malformed(_)), "{bad:?} gave {err:?}");
        }
    }

    #[test]
    fn test_whitespace_around_root_is_allowed() {
        let doc = XmlDocument::parse("\n  <a>x</a>\n\n").unwrap();
        assert_eq!(doc.root_name().as_deref(), Some("a"));
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        let err = XmlCodec.parse(b"<a>\xff</a>", &mime::TEXT_XML).unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8(_)));
    }

    #[test]
    fn test_rejects_other_content() {
        let err = XmlCodec
            .serialize(&ParsedContent::Bytes("x".into()), &mime::TEXT_XML)
            .unwrap_err();
        assert!(matches!(err, CodecError::UnexpectedContent { expected: "xml", .. }));
    }
}
