//! Event recording sink.
//!
//! [`RecordingSink`] stores every call it receives as a [`SinkEvent`]. The
//! recorded stream can be inspected in tests or dumped as JSON.
//!
//! # Example
//!
//! ```
//! use unlegacy::assembler::DocumentAssembler;
//! use unlegacy::model::PageSpan;
//! use unlegacy::sink::{RecordingSink, SinkEvent};
//!
//! fn main() -> unlegacy::Result<()> {
//!     let mut sink = RecordingSink::new();
//!     let mut assembler = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
//!     assembler.insert_text("Hello")?;
//!     assembler.end_document()?;
//!     drop(assembler);
//!
//!     assert!(sink.events().contains(&SinkEvent::InsertText {
//!         text: "Hello".to_string()
//!     }));
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::DocumentSink;
use crate::error::{Error, Result};
use crate::model::{
    BinaryObject, CellProperties, DocumentMetadata, FieldKind, FrameStyle,
    HeaderFooterProperties, ListLevelProperties, NoteProperties, PageSpanProperties,
    ParagraphProperties, Placement, RowProperties, SectionProperties, SpanProperties,
    TableProperties,
};

/// One call received by a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SinkEvent {
    SetDocumentMetadata(DocumentMetadata),
    OpenDocument,
    CloseDocument,
    OpenPageSpan(PageSpanProperties),
    ClosePageSpan,
    OpenHeader(HeaderFooterProperties),
    CloseHeader,
    OpenFooter(HeaderFooterProperties),
    CloseFooter,
    OpenSection(SectionProperties),
    CloseSection,
    OpenParagraph(ParagraphProperties),
    CloseParagraph,
    OpenSpan(SpanProperties),
    CloseSpan,
    InsertText { text: String },
    InsertSpace,
    InsertTab,
    InsertLineBreak,
    DefineListLevel(ListLevelProperties),
    OpenOrderedListLevel(ListLevelProperties),
    CloseOrderedListLevel,
    OpenUnorderedListLevel(ListLevelProperties),
    CloseUnorderedListLevel,
    OpenListElement(ParagraphProperties),
    CloseListElement,
    OpenFootnote(NoteProperties),
    CloseFootnote,
    OpenEndnote(NoteProperties),
    CloseEndnote,
    OpenComment,
    CloseComment,
    OpenTextBox,
    CloseTextBox,
    OpenTable(TableProperties),
    OpenTableRow(RowProperties),
    OpenTableCell(CellProperties),
    InsertCoveredTableCell(CellProperties),
    CloseTableCell,
    CloseTableRow,
    CloseTable,
    OpenFrame {
        placement: Placement,
        style: FrameStyle,
    },
    CloseFrame,
    InsertBinaryObject(BinaryObject),
    InsertField { field: FieldKind },
}

impl SinkEvent {
    /// Name of the sink method that produced this event.
    pub fn name(&self) -> &'static str {
        match self {
            SinkEvent::SetDocumentMetadata(_) => "set_document_metadata",
            SinkEvent::OpenDocument => "open_document",
            SinkEvent::CloseDocument => "close_document",
            SinkEvent::OpenPageSpan(_) => "open_page_span",
            SinkEvent::ClosePageSpan => "close_page_span",
            SinkEvent::OpenHeader(_) => "open_header",
            SinkEvent::CloseHeader => "close_header",
            SinkEvent::OpenFooter(_) => "open_footer",
            SinkEvent::CloseFooter => "close_footer",
            SinkEvent::OpenSection(_) => "open_section",
            SinkEvent::CloseSection => "close_section",
            SinkEvent::OpenParagraph(_) => "open_paragraph",
            SinkEvent::CloseParagraph => "close_paragraph",
            SinkEvent::OpenSpan(_) => "open_span",
            SinkEvent::CloseSpan => "close_span",
            SinkEvent::InsertText { .. } => "insert_text",
            SinkEvent::InsertSpace => "insert_space",
            SinkEvent::InsertTab => "insert_tab",
            SinkEvent::InsertLineBreak => "insert_line_break",
            SinkEvent::DefineListLevel(_) => "define_list_level",
            SinkEvent::OpenOrderedListLevel(_) => "open_ordered_list_level",
            SinkEvent::CloseOrderedListLevel => "close_ordered_list_level",
            SinkEvent::OpenUnorderedListLevel(_) => "open_unordered_list_level",
            SinkEvent::CloseUnorderedListLevel => "close_unordered_list_level",
            SinkEvent::OpenListElement(_) => "open_list_element",
            SinkEvent::CloseListElement => "close_list_element",
            SinkEvent::OpenFootnote(_) => "open_footnote",
            SinkEvent::CloseFootnote => "close_footnote",
            SinkEvent::OpenEndnote(_) => "open_endnote",
            SinkEvent::CloseEndnote => "close_endnote",
            SinkEvent::OpenComment => "open_comment",
            SinkEvent::CloseComment => "close_comment",
            SinkEvent::OpenTextBox => "open_text_box",
            SinkEvent::CloseTextBox => "close_text_box",
            SinkEvent::OpenTable(_) => "open_table",
            SinkEvent::OpenTableRow(_) => "open_table_row",
            SinkEvent::OpenTableCell(_) => "open_table_cell",
            SinkEvent::InsertCoveredTableCell(_) => "insert_covered_table_cell",
            SinkEvent::CloseTableCell => "close_table_cell",
            SinkEvent::CloseTableRow => "close_table_row",
            SinkEvent::CloseTable => "close_table",
            SinkEvent::OpenFrame { .. } => "open_frame",
            SinkEvent::CloseFrame => "close_frame",
            SinkEvent::InsertBinaryObject(_) => "insert_binary_object",
            SinkEvent::InsertField { .. } => "insert_field",
        }
    }

    /// Check if this event opens a container.
    pub fn is_open(&self) -> bool {
        self.name().starts_with("open_")
    }

    /// Check if this event closes a container.
    pub fn is_close(&self) -> bool {
        self.name().starts_with("close_")
    }

    /// Text carried by an `insert_text` event.
    pub fn text(&self) -> Option<&str> {
        match self {
            SinkEvent::InsertText { text } => Some(text),
            _ => None,
        }
    }

    /// Replay this event against another sink.
    pub fn replay(&self, sink: &mut dyn DocumentSink) {
        match self {
            SinkEvent::SetDocumentMetadata(m) => sink.set_document_metadata(m),
            SinkEvent::OpenDocument => sink.open_document(),
            SinkEvent::CloseDocument => sink.close_document(),
            SinkEvent::OpenPageSpan(p) => sink.open_page_span(p),
            SinkEvent::ClosePageSpan => sink.close_page_span(),
            SinkEvent::OpenHeader(p) => sink.open_header(p),
            SinkEvent::CloseHeader => sink.close_header(),
            SinkEvent::OpenFooter(p) => sink.open_footer(p),
            SinkEvent::CloseFooter => sink.close_footer(),
            SinkEvent::OpenSection(p) => sink.open_section(p),
            SinkEvent::CloseSection => sink.close_section(),
            SinkEvent::OpenParagraph(p) => sink.open_paragraph(p),
            SinkEvent::CloseParagraph => sink.close_paragraph(),
            SinkEvent::OpenSpan(p) => sink.open_span(p),
            SinkEvent::CloseSpan => sink.close_span(),
            SinkEvent::InsertText { text } => sink.insert_text(text),
            SinkEvent::InsertSpace => sink.insert_space(),
            SinkEvent::InsertTab => sink.insert_tab(),
            SinkEvent::InsertLineBreak => sink.insert_line_break(),
            SinkEvent::DefineListLevel(p) => sink.define_list_level(p),
            SinkEvent::OpenOrderedListLevel(p) => sink.open_ordered_list_level(p),
            SinkEvent::CloseOrderedListLevel => sink.close_ordered_list_level(),
            SinkEvent::OpenUnorderedListLevel(p) => sink.open_unordered_list_level(p),
            SinkEvent::CloseUnorderedListLevel => sink.close_unordered_list_level(),
            SinkEvent::OpenListElement(p) => sink.open_list_element(p),
            SinkEvent::CloseListElement => sink.close_list_element(),
            SinkEvent::OpenFootnote(p) => sink.open_footnote(p),
            SinkEvent::CloseFootnote => sink.close_footnote(),
            SinkEvent::OpenEndnote(p) => sink.open_endnote(p),
            SinkEvent::CloseEndnote => sink.close_endnote(),
            SinkEvent::OpenComment => sink.open_comment(),
            SinkEvent::CloseComment => sink.close_comment(),
            SinkEvent::OpenTextBox => sink.open_text_box(),
            SinkEvent::CloseTextBox => sink.close_text_box(),
            SinkEvent::OpenTable(p) => sink.open_table(p),
            SinkEvent::OpenTableRow(p) => sink.open_table_row(p),
            SinkEvent::OpenTableCell(p) => sink.open_table_cell(p),
            SinkEvent::InsertCoveredTableCell(p) => sink.insert_covered_table_cell(p),
            SinkEvent::CloseTableCell => sink.close_table_cell(),
            SinkEvent::CloseTableRow => sink.close_table_row(),
            SinkEvent::CloseTable => sink.close_table(),
            SinkEvent::OpenFrame { placement, style } => sink.open_frame(placement, style),
            SinkEvent::CloseFrame => sink.close_frame(),
            SinkEvent::InsertBinaryObject(o) => sink.insert_binary_object(o),
            SinkEvent::InsertField { field } => sink.insert_field(field),
        }
    }
}

/// Sink that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<SinkEvent>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, in call order.
    pub fn events(&self) -> &[SinkEvent] {
        &self.events
    }

    /// Consume the sink and return the events.
    pub fn into_events(self) -> Vec<SinkEvent> {
        self.events
    }

    /// Method names of the recorded events, in call order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(SinkEvent::name).collect()
    }

    /// Concatenated text of all `insert_text` events.
    pub fn text(&self) -> String {
        self.events.iter().filter_map(SinkEvent::text).collect()
    }

    /// Number of events with the given method name.
    pub fn count(&self, name: &str) -> usize {
        self.events.iter().filter(|e| e.name() == name).count()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Forget recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn push(&mut self, event: SinkEvent) {
        self.events.push(event);
    }
}

impl DocumentSink for RecordingSink {
    fn set_document_metadata(&mut self, metadata: &DocumentMetadata) {
        self.push(SinkEvent::SetDocumentMetadata(metadata.clone()));
    }

    fn open_document(&mut self) {
        self.push(SinkEvent::OpenDocument);
    }

    fn close_document(&mut self) {
        self.push(SinkEvent::CloseDocument);
    }

    fn open_page_span(&mut self, props: &PageSpanProperties) {
        self.push(SinkEvent::OpenPageSpan(*props));
    }

    fn close_page_span(&mut self) {
        self.push(SinkEvent::ClosePageSpan);
    }

    fn open_header(&mut self, props: &HeaderFooterProperties) {
        self.push(SinkEvent::OpenHeader(*props));
    }

    fn close_header(&mut self) {
        self.push(SinkEvent::CloseHeader);
    }

    fn open_footer(&mut self, props: &HeaderFooterProperties) {
        self.push(SinkEvent::OpenFooter(*props));
    }

    fn close_footer(&mut self) {
        self.push(SinkEvent::CloseFooter);
    }

    fn open_section(&mut self, props: &SectionProperties) {
        self.push(SinkEvent::OpenSection(props.clone()));
    }

    fn close_section(&mut self) {
        self.push(SinkEvent::CloseSection);
    }

    fn open_paragraph(&mut self, props: &ParagraphProperties) {
        self.push(SinkEvent::OpenParagraph(props.clone()));
    }

    fn close_paragraph(&mut self) {
        self.push(SinkEvent::CloseParagraph);
    }

    fn open_span(&mut self, props: &SpanProperties) {
        self.push(SinkEvent::OpenSpan(props.clone()));
    }

    fn close_span(&mut self) {
        self.push(SinkEvent::CloseSpan);
    }

    fn insert_text(&mut self, text: &str) {
        self.push(SinkEvent::InsertText {
            text: text.to_string(),
        });
    }

    fn insert_space(&mut self) {
        self.push(SinkEvent::InsertSpace);
    }

    fn insert_tab(&mut self) {
        self.push(SinkEvent::InsertTab);
    }

    fn insert_line_break(&mut self) {
        self.push(SinkEvent::InsertLineBreak);
    }

    fn define_list_level(&mut self, props: &ListLevelProperties) {
        self.push(SinkEvent::DefineListLevel(props.clone()));
    }

    fn open_ordered_list_level(&mut self, props: &ListLevelProperties) {
        self.push(SinkEvent::OpenOrderedListLevel(props.clone()));
    }

    fn close_ordered_list_level(&mut self) {
        self.push(SinkEvent::CloseOrderedListLevel);
    }

    fn open_unordered_list_level(&mut self, props: &ListLevelProperties) {
        self.push(SinkEvent::OpenUnorderedListLevel(props.clone()));
    }

    fn close_unordered_list_level(&mut self) {
        self.push(SinkEvent::CloseUnorderedListLevel);
    }

    fn open_list_element(&mut self, props: &ParagraphProperties) {
        self.push(SinkEvent::OpenListElement(props.clone()));
    }

    fn close_list_element(&mut self) {
        self.push(SinkEvent::CloseListElement);
    }

    fn open_footnote(&mut self, props: &NoteProperties) {
        self.push(SinkEvent::OpenFootnote(props.clone()));
    }

    fn close_footnote(&mut self) {
        self.push(SinkEvent::CloseFootnote);
    }

    fn open_endnote(&mut self, props: &NoteProperties) {
        self.push(SinkEvent::OpenEndnote(props.clone()));
    }

    fn close_endnote(&mut self) {
        self.push(SinkEvent::CloseEndnote);
    }

    fn open_comment(&mut self) {
        self.push(SinkEvent::OpenComment);
    }

    fn close_comment(&mut self) {
        self.push(SinkEvent::CloseComment);
    }

    fn open_text_box(&mut self) {
        self.push(SinkEvent::OpenTextBox);
    }

    fn close_text_box(&mut self) {
        self.push(SinkEvent::CloseTextBox);
    }

    fn open_table(&mut self, props: &TableProperties) {
        self.push(SinkEvent::OpenTable(props.clone()));
    }

    fn open_table_row(&mut self, props: &RowProperties) {
        self.push(SinkEvent::OpenTableRow(*props));
    }

    fn open_table_cell(&mut self, props: &CellProperties) {
        self.push(SinkEvent::OpenTableCell(props.clone()));
    }

    fn insert_covered_table_cell(&mut self, props: &CellProperties) {
        self.push(SinkEvent::InsertCoveredTableCell(props.clone()));
    }

    fn close_table_cell(&mut self) {
        self.push(SinkEvent::CloseTableCell);
    }

    fn close_table_row(&mut self) {
        self.push(SinkEvent::CloseTableRow);
    }

    fn close_table(&mut self) {
        self.push(SinkEvent::CloseTable);
    }

    fn open_frame(&mut self, placement: &Placement, style: &FrameStyle) {
        self.push(SinkEvent::OpenFrame {
            placement: *placement,
            style: style.clone(),
        });
    }

    fn close_frame(&mut self) {
        self.push(SinkEvent::CloseFrame);
    }

    fn insert_binary_object(&mut self, object: &BinaryObject) {
        self.push(SinkEvent::InsertBinaryObject(object.clone()));
    }

    fn insert_field(&mut self, field: &FieldKind) {
        self.push(SinkEvent::InsertField {
            field: field.clone(),
        });
    }
}

/// Layout of exported event JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// One event per line block, indented
    #[default]
    Pretty,
    /// Single line
    Compact,
}

/// Convert a recorded event stream to JSON.
pub fn to_json(events: &[SinkEvent], format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(events),
        JsonFormat::Compact => serde_json::to_string(events),
    };

    result.map_err(|e| Error::Other(format!("cannot serialize events: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_names() {
        let mut sink = RecordingSink::new();
        sink.open_paragraph(&ParagraphProperties::default());
        sink.insert_text("a");
        sink.insert_space();
        sink.close_paragraph();

        assert_eq!(
            sink.names(),
            vec!["open_paragraph", "insert_text", "insert_space", "close_paragraph"]
        );
        assert_eq!(sink.text(), "a");
        assert_eq!(sink.count("insert_text"), 1);
    }

    #[test]
    fn test_event_classes() {
        assert!(SinkEvent::OpenComment.is_open());
        assert!(SinkEvent::CloseTable.is_close());
        assert!(!SinkEvent::InsertTab.is_open());
        assert!(!SinkEvent::InsertTab.is_close());
    }

    #[test]
    fn test_replay_copies_stream() {
        let mut first = RecordingSink::new();
        first.open_document();
        first.insert_field(&FieldKind::PageNumber);
        first.close_document();

        let mut second = RecordingSink::new();
        for event in first.events() {
            event.replay(&mut second);
        }
        assert_eq!(first.events(), second.events());
    }

    #[test]
    fn test_to_json_compact() {
        let events = vec![
            SinkEvent::OpenDocument,
            SinkEvent::InsertText {
                text: "hi".to_string(),
            },
        ];
        let json = to_json(&events, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.contains(r#"{"event":"open_document"}"#));
        assert!(json.contains(r#""text":"hi""#));

        let back: Vec<SinkEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, events);
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&[SinkEvent::CloseDocument], JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));
    }
}
