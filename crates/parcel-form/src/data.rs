//! Form data model

use bytes::Bytes;
use indexmap::IndexMap;
use mime::Mime;

/// An uploaded file carried by a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Client-side file name
    pub filename: String,
    /// Declared media type of the file content
    pub media_type: Mime,
    /// Raw file content
    pub content: Bytes,
}

impl FileEntry {
    pub fn new(filename: impl Into<String>, media_type: Mime, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            media_type,
            content: content.into(),
        }
    }
}

/// A single form field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEntry {
    Text(String),
    File(FileEntry),
}

impl FormEntry {
    /// Get the text value, if this is a plain field
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormEntry::Text(value) => Some(value),
            FormEntry::File(_) => None,
        }
    }

    /// Get the file, if this is a file field
    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            FormEntry::File(file) => Some(file),
            FormEntry::Text(_) => None,
        }
    }

    /// Bytes that end up in the body for this entry
    pub(crate) fn payload(&self) -> &[u8] {
        match self {
            FormEntry::Text(value) => value.as_bytes(),
            FormEntry::File(file) => &file.content,
        }
    }
}

impl From<String> for FormEntry {
    fn from(value: String) -> Self {
        FormEntry::Text(value)
    }
}

impl From<&str> for FormEntry {
    fn from(value: &str) -> Self {
        FormEntry::Text(value.to_string())
    }
}

impl From<FileEntry> for FormEntry {
    fn from(file: FileEntry) -> Self {
        FormEntry::File(file)
    }
}

/// Ordered form fields keyed by name.
///
/// Names are unique: inserting an existing name replaces its value and keeps
/// the position of the first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: IndexMap<String, FormEntry>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the value it replaced
    pub fn insert(&mut self, name: impl Into<String>, entry: impl Into<FormEntry>) -> Option<FormEntry> {
        self.entries.insert(name.into(), entry.into())
    }

    /// Insert a plain text field
    pub fn insert_text(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<FormEntry> {
        self.insert(name, FormEntry::Text(value.into()))
    }

    /// Insert a file field
    pub fn insert_file(&mut self, name: impl Into<String>, file: FileEntry) -> Option<FormEntry> {
        self.insert(name, FormEntry::File(file))
    }

    pub fn get(&self, name: &str) -> Option<&FormEntry> {
        self.entries.get(name)
    }

    /// Get a text field by name
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FormEntry::as_text)
    }

    /// Get a file field by name
    pub fn file(&self, name: &str) -> Option<&FileEntry> {
        self.get(name).and_then(FormEntry::as_file)
    }

    /// Remove a field, preserving the order of the remaining ones
    pub fn remove(&mut self, name: &str) -> Option<FormEntry> {
        self.entries.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate fields in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Get all field names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }
}

impl<K: Into<String>, V: Into<FormEntry>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormData::new();
        for (name, entry) in iter {
            form.insert(name, entry);
        }
        form
    }
}
