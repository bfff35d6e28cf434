//! Embedded binary objects (pictures, OLE blobs).

use serde::{Deserialize, Serialize};

/// An embedded binary object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryObject {
    /// Raw binary data
    #[serde(default)]
    pub data: Vec<u8>,

    /// MIME type (e.g., "image/pict")
    pub mime_type: String,

    /// Replacement text when the object cannot be shown
    #[serde(default)]
    pub alt_text: Option<String>,
}

impl BinaryObject {
    /// Create a new binary object.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            alt_text: None,
        }
    }

    /// Create a Macintosh PICT picture.
    pub fn pict(data: Vec<u8>) -> Self {
        Self::new(data, "image/pict")
    }

    /// Create a PNG picture.
    pub fn png(data: Vec<u8>) -> Self {
        Self::new(data, "image/png")
    }

    /// Set the alternative text and return self.
    pub fn with_alt_text(mut self, alt: impl Into<String>) -> Self {
        self.alt_text = Some(alt.into());
        self
    }

    /// Check if this is an image.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Data size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
