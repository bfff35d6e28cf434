//! Document-level types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Document metadata forwarded to the sink when the document opens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Application that created the source file (e.g., "MacWrite II")
    pub creator: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// Source format name as reported by the decoder
    pub source_format: Option<String>,
}

impl DocumentMetadata {
    /// Create metadata tagged with a source format name.
    pub fn with_format(format: impl Into<String>) -> Self {
        Self {
            source_format: Some(format.into()),
            ..Default::default()
        }
    }

    /// Set the title and return self.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the author and return self.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Check if no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Timestamp used when rendering date/time fields.
    ///
    /// Prefers the modification date, then the creation date.
    pub fn reference_date(&self) -> Option<DateTime<Utc>> {
        self.modified.or(self.created)
    }
}
