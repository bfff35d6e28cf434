//! Text buffer splitting and normalization.

use unicode_normalization::UnicodeNormalization;

/// Piece of buffered text as sent to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text, passed to `insert_text`
    Text(&'a str),
    /// A run of two or more spaces, passed as one `insert_space`
    Space,
}

/// Split buffered text on runs of two or more U+0020 spaces.
///
/// A single space stays part of the surrounding text.
pub fn split_space_runs(text: &str) -> Vec<Segment<'_>> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b' ' {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        if i - run_start >= 2 {
            if start < run_start {
                segments.push(Segment::Text(&text[start..run_start]));
            }
            segments.push(Segment::Space);
            start = i;
        }
    }
    if start < text.len() {
        segments.push(Segment::Text(&text[start..]));
    }
    segments
}

/// NFC-normalize text, borrowing when it is already normalized.
pub fn normalize(text: &str) -> std::borrow::Cow<'_, str> {
    if unicode_normalization::is_nfc(text) {
        std::borrow::Cow::Borrowed(text)
    } else {
        std::borrow::Cow::Owned(text.nfc().collect())
    }
}

/// Character for a code point, if it is a valid Unicode scalar value.
///
/// Control characters other than tab are rejected too; they never carry
/// text in the source formats.
pub fn scalar(code: u32) -> Option<char> {
    let c = char::from_u32(code)?;
    if c.is_control() && c != '\t' {
        return None;
    }
    Some(c)
}
