//! HTML codec (scraper)
//!
//! HTML5 parsing never fails: broken markup is repaired the way a browser
//! would repair it.

use super::{CodecError, ContentCodec, ParsedContent, Serialized};
use mime::Mime;
use scraper::{Html, Selector};

/// A parsed HTML document, stored as normalized markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlDocument {
    markup: String,
}

impl HtmlDocument {
    pub fn parse(text: &str) -> Self {
        Self {
            markup: Html::parse_document(text).html(),
        }
    }

    /// Normalized markup
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Text of every element matching a CSS selector.
    ///
    /// An invalid selector matches nothing.
    pub fn select_text(&self, selector: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        Html::parse_document(&self.markup)
            .select(&selector)
            .map(|element| element.text().collect::<String>())
            .collect()
    }

    pub fn title(&self) -> Option<String> {
        self.select_text("title").into_iter().next()
    }
}

/// Codec for `text/html`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlCodec;

impl ContentCodec for HtmlCodec {
    fn parse(&self, body: &[u8], _media_type: &Mime) -> Result<ParsedContent, CodecError> {
        Ok(ParsedContent::Html(HtmlDocument::parse(&String::from_utf8_lossy(body))))
    }

    fn serialize(&self, content: &ParsedContent, media_type: &Mime) -> Result<Serialized, CodecError> {
        let ParsedContent::Html(doc) = content else {
            return Err(CodecError::unexpected("html", content));
        };
        Ok(Serialized {
            body: doc.markup.as_bytes().to_vec(),
            media_type: media_type.clone(),
        })
    }
}
