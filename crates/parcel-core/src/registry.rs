//! Parser registry - maps media types to content codecs
//!
//! Lookup uses the lowercased essence of a media type (`type/subtype`,
//! including any `+suffix`); parameters are ignored for lookup and handed
//! to the codec.
//!
//! ## Example
//! ```
//! use parcel_core::ParserRegistry;
//!
//! let registry = ParserRegistry::with_builtins();
//! assert!(registry.lookup(&mime::MULTIPART_FORM_DATA).is_some());
//! assert!(registry.lookup(&mime::IMAGE_PNG).is_none());
//! ```

use crate::codec::{ContentCodec, MultipartFormCodec, UrlEncodedFormCodec};
use crate::config::ContentConfig;
use mime::Mime;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Registry of content codecs, keyed by media type
pub struct ParserRegistry {
    codecs: RwLock<HashMap<String, Arc<dyn ContentCodec>>>,
}

impl ParserRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            codecs: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the built-in codecs
    pub fn with_builtins() -> Self {
        Self::with_config(&ContentConfig::default())
    }

    /// Create a registry with the built-in codecs, configured by `config`
    pub fn with_config(config: &ContentConfig) -> Self {
        let registry = Self::new();

        #[cfg(feature = "xml")]
        {
            let xml: Arc<dyn ContentCodec> = Arc::new(crate::codec::XmlCodec);
            registry.register_essence("text/xml", Arc::clone(&xml));
            registry.register_essence("application/xml", Arc::clone(&xml));
            registry.register_essence("application/xhtml+xml", xml);
        }
        #[cfg(feature = "html")]
        registry.register_essence("text/html", Arc::new(crate::codec::HtmlCodec));

        registry.register_essence(
            "multipart/form-data",
            Arc::new(MultipartFormCodec::new(config.boundary_len)),
        );
        registry.register_essence("application/x-www-form-urlencoded", Arc::new(UrlEncodedFormCodec));

        registry
    }

    /// Register a codec for a media type, replacing any previous one.
    ///
    /// Returns the replaced codec.
    pub fn register(&self, media_type: &Mime, codec: Arc<dyn ContentCodec>) -> Option<Arc<dyn ContentCodec>> {
        self.register_essence(media_type.essence_str(), codec)
    }

    fn register_essence(&self, essence: &str, codec: Arc<dyn ContentCodec>) -> Option<Arc<dyn ContentCodec>> {
        let key = essence.to_ascii_lowercase();
        let previous = self.codecs.write().insert(key.clone(), codec);
        if previous.is_some() {
            log::warn!("replaced content codec for {key}");
        } else {
            log::debug!("registered content codec for {key}");
        }
        previous
    }

    /// Remove the codec for a media type
    pub fn unregister(&self, media_type: &Mime) -> Option<Arc<dyn ContentCodec>> {
        self.codecs.write().remove(&media_type.essence_str().to_ascii_lowercase())
    }

    /// Find the codec for a media type
    pub fn lookup(&self, media_type: &Mime) -> Option<Arc<dyn ContentCodec>> {
        self.codecs
            .read()
            .get(&media_type.essence_str().to_ascii_lowercase())
            .cloned()
    }

    pub fn contains(&self, media_type: &Mime) -> bool {
        self.codecs
            .read()
            .contains_key(&media_type.essence_str().to_ascii_lowercase())
    }

    /// Registered essences, sorted
    pub fn media_types(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.codecs.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserRegistry")
            .field("media_types", &self.media_types())
            .finish()
    }
}
