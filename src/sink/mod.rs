//! Downstream consumers of the assembled event stream.
//!
//! A sink receives the well-nested open/close/insert vocabulary produced by
//! [`DocumentAssembler`](crate::assembler::DocumentAssembler). Every method
//! has a no-op default so that a sink only implements what it cares about.
//!
//! # Example
//!
//! ```
//! use unlegacy::sink::DocumentSink;
//!
//! struct WordCounter {
//!     words: usize,
//! }
//!
//! impl DocumentSink for WordCounter {
//!     fn insert_text(&mut self, text: &str) {
//!         self.words += text.split_whitespace().count();
//!     }
//! }
//! ```

mod composite;
mod recording;
mod stats;
mod text;
mod validate;

pub use composite::CompositeSink;
pub use recording::{to_json, JsonFormat, RecordingSink, SinkEvent};
pub use stats::{AssemblyStats, StatsSink};
pub use text::TextSink;
pub use validate::{Container, NestingValidator, NestingViolation};

use crate::model::{
    BinaryObject, CellProperties, DocumentMetadata, FieldKind, FrameStyle,
    HeaderFooterProperties, ListLevelProperties, NoteProperties, PageSpanProperties,
    ParagraphProperties, Placement, RowProperties, SectionProperties, SpanProperties,
    TableProperties,
};

/// Trait for consumers of the assembled document vocabulary.
///
/// Calls arrive well nested: every `open_*` is matched by the corresponding
/// `close_*`, spans only occur inside paragraphs or list elements, and
/// cells only inside rows.
pub trait DocumentSink {
    /// Called once, before `open_document`, when metadata is known.
    fn set_document_metadata(&mut self, metadata: &DocumentMetadata) {
        let _ = metadata;
    }

    /// Start of the document.
    fn open_document(&mut self) {}

    /// End of the document.
    fn close_document(&mut self) {}

    /// Start of a run of pages sharing geometry.
    fn open_page_span(&mut self, props: &PageSpanProperties) {
        let _ = props;
    }

    /// End of a page span.
    fn close_page_span(&mut self) {}

    /// Start of a header, inside a page span.
    fn open_header(&mut self, props: &HeaderFooterProperties) {
        let _ = props;
    }

    /// End of a header.
    fn close_header(&mut self) {}

    /// Start of a footer, inside a page span.
    fn open_footer(&mut self, props: &HeaderFooterProperties) {
        let _ = props;
    }

    /// End of a footer.
    fn close_footer(&mut self) {}

    /// Start of a section.
    fn open_section(&mut self, props: &SectionProperties) {
        let _ = props;
    }

    /// End of a section.
    fn close_section(&mut self) {}

    /// Start of a paragraph. Margins are already resolved.
    fn open_paragraph(&mut self, props: &ParagraphProperties) {
        let _ = props;
    }

    /// End of a paragraph.
    fn close_paragraph(&mut self) {}

    /// Start of a run of uniformly formatted text.
    fn open_span(&mut self, props: &SpanProperties) {
        let _ = props;
    }

    /// End of a span.
    fn close_span(&mut self) {}

    /// Literal text.
    fn insert_text(&mut self, text: &str) {
        let _ = text;
    }

    /// A significant space that must not be collapsed.
    fn insert_space(&mut self) {}

    /// A tab character.
    fn insert_tab(&mut self) {}

    /// A line break inside a paragraph.
    fn insert_line_break(&mut self) {}

    /// Definition of a list level, sent before its first use.
    fn define_list_level(&mut self, props: &ListLevelProperties) {
        let _ = props;
    }

    /// Start of a numbered list level.
    fn open_ordered_list_level(&mut self, props: &ListLevelProperties) {
        let _ = props;
    }

    /// End of a numbered list level.
    fn close_ordered_list_level(&mut self) {}

    /// Start of a bulleted list level.
    fn open_unordered_list_level(&mut self, props: &ListLevelProperties) {
        let _ = props;
    }

    /// End of a bulleted list level.
    fn close_unordered_list_level(&mut self) {}

    /// Start of a list element. Margins are already resolved.
    fn open_list_element(&mut self, props: &ParagraphProperties) {
        let _ = props;
    }

    /// End of a list element.
    fn close_list_element(&mut self) {}

    /// Start of a footnote body.
    fn open_footnote(&mut self, props: &NoteProperties) {
        let _ = props;
    }

    /// End of a footnote body.
    fn close_footnote(&mut self) {}

    /// Start of an endnote body.
    fn open_endnote(&mut self, props: &NoteProperties) {
        let _ = props;
    }

    /// End of an endnote body.
    fn close_endnote(&mut self) {}

    /// Start of an annotation.
    fn open_comment(&mut self) {}

    /// End of an annotation.
    fn close_comment(&mut self) {}

    /// Start of a text box, inside a frame.
    fn open_text_box(&mut self) {}

    /// End of a text box.
    fn close_text_box(&mut self) {}

    /// Start of a table.
    fn open_table(&mut self, props: &TableProperties) {
        let _ = props;
    }

    /// Start of a table row.
    fn open_table_row(&mut self, props: &RowProperties) {
        let _ = props;
    }

    /// Start of a table cell.
    fn open_table_cell(&mut self, props: &CellProperties) {
        let _ = props;
    }

    /// A cell hidden by a neighbour's row or column span.
    fn insert_covered_table_cell(&mut self, props: &CellProperties) {
        let _ = props;
    }

    /// End of a table cell.
    fn close_table_cell(&mut self) {}

    /// End of a table row.
    fn close_table_row(&mut self) {}

    /// End of a table.
    fn close_table(&mut self) {}

    /// Start of a positioned frame.
    fn open_frame(&mut self, placement: &Placement, style: &FrameStyle) {
        let _ = (placement, style);
    }

    /// End of a frame.
    fn close_frame(&mut self) {}

    /// Embedded object, inside a frame.
    fn insert_binary_object(&mut self, object: &BinaryObject) {
        let _ = object;
    }

    /// A field (page number, date, ...).
    fn insert_field(&mut self, field: &FieldKind) {
        let _ = field;
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DocumentSink for NullSink {}
