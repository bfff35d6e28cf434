//! Notes and fields.

use serde::{Deserialize, Serialize};

/// Properties of a footnote or endnote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteProperties {
    /// Ordinal assigned by the assembler (1-indexed, per note kind)
    pub number: u32,

    /// Custom label replacing the number, if the source supplies one
    pub label: Option<String>,
}

impl NoteProperties {
    /// Text of the note reference mark.
    pub fn mark(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.number.to_string())
    }
}

/// Kind of a field inserted in the text flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Current page number
    PageNumber,
    /// Total page count
    PageCount,
    /// Current date, formatted with a strftime-style pattern
    Date { format: String },
    /// Current time, formatted with a strftime-style pattern
    Time { format: String },
    /// Document title
    Title,
    /// Merge field from a database
    Database { name: String },
}

impl FieldKind {
    /// A date field with the default `%m/%d/%y` format.
    pub fn date() -> Self {
        FieldKind::Date {
            format: "%m/%d/%y".to_string(),
        }
    }

    /// A time field with the default `%I:%M:%S %p` format.
    pub fn time() -> Self {
        FieldKind::Time {
            format: "%I:%M:%S %p".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_mark() {
        let note = NoteProperties {
            number: 3,
            label: None,
        };
        assert_eq!(note.mark(), "3");

        let custom = NoteProperties {
            number: 3,
            label: Some("*".into()),
        };
        assert_eq!(custom.mark(), "*");
    }

    #[test]
    fn test_field_serde() {
        let json = serde_json::to_string(&FieldKind::PageNumber).unwrap();
        assert_eq!(json, r#"{"type":"page_number"}"#);

        let field: FieldKind =
            serde_json::from_str(r#"{"type":"date","format":"%Y"}"#).unwrap();
        assert_eq!(
            field,
            FieldKind::Date {
                format: "%Y".into()
            }
        );
    }
}
