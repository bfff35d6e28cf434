//! # unlegacy
//!
//! Document assembly for legacy word-processor and drawing formats.
//!
//! Format decoders rarely produce a clean document structure: they open
//! paragraphs twice, forget to close lists, put page breaks in the middle
//! of tables. The [`DocumentAssembler`] sits between such a decoder and a
//! writer ([`DocumentSink`]) and turns whatever it is fed into a well-nested
//! stream of open/close/insert calls.
//!
//! ## Quick Start
//!
//! ```
//! use unlegacy::{DocumentAssembler, PageSpan, TextSink};
//!
//! fn main() -> unlegacy::Result<()> {
//!     let mut sink = TextSink::new();
//!     let mut assembler = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
//!
//!     assembler.insert_text("Dear reader,")?;
//!     assembler.insert_eol()?;
//!     assembler.insert_tab()?;
//!     assembler.insert_text("hello.")?;
//!     assembler.end_document()?;
//!     drop(assembler);
//!
//!     assert_eq!(sink.into_text(), "Dear reader,\n\thello.\n");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Lazy structure**: page spans, sections, paragraphs and spans open on demand
//! - **Lists**: level definitions, numbering continuation, depth changes
//! - **Tables and frames**: nesting guards, anchor-based frame placement
//! - **Sub-documents**: headers, footers, notes, text boxes replayed with cycle detection
//! - **Sinks**: event recording with JSON export, plain text, statistics, nesting validation

pub mod assembler;
pub mod decode;
pub mod error;
pub mod model;
pub mod sink;

// Re-export commonly used types
pub use assembler::{
    AssemblerOptions, BreakKind, Diagnostics, DocumentAssembler, SubDocument,
    SubDocumentContent, SubDocumentId, TablePageBreaks,
};
pub use decode::{assemble, Decoder, Script, ScriptDecoder};
pub use error::{Error, Result};
pub use model::{
    DocumentMetadata, FramePosition, ListId, ListLevel, PageGeometry, PageSpan,
    ParagraphProperties, SpanProperties, TextAttributes,
};
pub use sink::{
    DocumentSink, JsonFormat, NestingValidator, RecordingSink, SinkEvent, StatsSink, TextSink,
};

use std::path::Path;

/// Replay an event script file and return the recorded events.
///
/// # Example
///
/// ```no_run
/// use unlegacy::replay_file;
///
/// let events = replay_file("letter.json").unwrap();
/// println!("{} events", events.len());
/// ```
pub fn replay_file<P: AsRef<Path>>(path: P) -> Result<Vec<SinkEvent>> {
    replay_file_with_options(path, AssemblerOptions::default())
}

/// Replay an event script file with custom options.
pub fn replay_file_with_options<P: AsRef<Path>>(
    path: P,
    options: AssemblerOptions,
) -> Result<Vec<SinkEvent>> {
    let decoder = ScriptDecoder::open(path)?;
    let mut sink = RecordingSink::new();
    assemble(&decoder, &mut sink, options)?;
    Ok(sink.into_events())
}

/// Replay an event script given as JSON text.
pub fn replay_json(json: &str) -> Result<Vec<SinkEvent>> {
    let decoder = ScriptDecoder::from_json(json)?;
    let mut sink = RecordingSink::new();
    assemble(&decoder, &mut sink, AssemblerOptions::default())?;
    Ok(sink.into_events())
}

/// Extract the plain text of an event script file.
///
/// # Example
///
/// ```no_run
/// use unlegacy::extract_text;
///
/// let text = extract_text("letter.json").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let decoder = ScriptDecoder::open(path)?;
    let mut sink = TextSink::new();
    assemble(&decoder, &mut sink, AssemblerOptions::default())?;
    Ok(sink.into_text())
}

/// Check an event script file for nesting violations in the assembled stream.
///
/// Returns the violations found; an empty list means the stream is well formed.
pub fn check_file<P: AsRef<Path>>(path: P) -> Result<Vec<sink::NestingViolation>> {
    let decoder = ScriptDecoder::open(path)?;
    let mut validator = NestingValidator::new();
    assemble(&decoder, &mut validator, AssemblerOptions::default())?;
    Ok(validator.finish().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_json() {
        let events = replay_json(r#"{"body": [{"op": "text", "text": "x"}]}"#).unwrap();
        assert_eq!(events.first(), Some(&SinkEvent::OpenDocument));
        assert_eq!(events.last(), Some(&SinkEvent::CloseDocument));
    }

    #[test]
    fn test_replay_json_rejects_garbage() {
        assert!(matches!(replay_json("not json"), Err(Error::Json(_))));
    }
}
