//! Per-frame assembler state.
//!
//! Entering a sub-document or a table saves the whole frame and starts a
//! new one; leaving restores the saved frame. Page state and session
//! counters live outside the frame and are never saved.

use crate::model::{ListId, ParagraphProperties, SpanProperties};

use super::paragraph::MarginOffsets;
use super::subdocument::SubDocumentKind;
use super::table::TableState;

/// One open list level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenLevel {
    /// Numbered (ordered) or bulleted
    pub ordered: bool,
}

/// Mutable state of one nesting frame.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub paragraph_open: bool,
    pub list_element_open: bool,
    pub span_open: bool,
    pub section_open: bool,
    pub frame_open: bool,
    pub table: TableState,

    /// Text not yet sent to the sink
    pub text: String,
    /// Tabs requested before any paragraph was open
    pub deferred_tabs: u32,

    /// Properties for the next or current paragraph
    pub paragraph: ParagraphProperties,
    /// Properties for the next or current span
    pub span: SpanProperties,
    /// Properties of the span actually open in the sink
    pub open_span: Option<SpanProperties>,

    /// List whose levels are currently open
    pub list: Option<ListId>,
    /// Open list levels, index 0 = depth 1
    pub levels: Vec<OpenLevel>,

    /// Margin shift of the enclosing section or sub-document
    pub offsets: MarginOffsets,

    /// Kind of the sub-document being replayed, if any
    pub sub_document: Option<SubDocumentKind>,
    pub in_header_footer: bool,
    pub in_note: bool,

    /// A paragraph or list element was opened in this frame
    pub block_emitted: bool,

    /// Page break requested while a block was open
    pub pending_page_break: bool,
    /// The next block starts a new page
    pub page_break_before: bool,
    /// The next block starts a new column
    pub column_break_before: bool,
}

impl State {
    /// Fresh frame for a sub-document replayed from `parent`.
    pub fn for_sub_document(parent: &State, kind: SubDocumentKind) -> Self {
        Self {
            sub_document: Some(kind),
            in_header_footer: parent.in_header_footer || kind.is_header_footer(),
            in_note: parent.in_note || kind.is_note(),
            offsets: if kind == SubDocumentKind::TextBox {
                MarginOffsets::default()
            } else {
                parent.offsets
            },
            ..Default::default()
        }
    }

    /// Fresh frame for a table opened from `parent`.
    pub fn for_table(parent: &State) -> Self {
        Self {
            table: TableState::Open,
            sub_document: parent.sub_document,
            in_header_footer: parent.in_header_footer,
            in_note: parent.in_note,
            offsets: parent.offsets,
            span: parent.span.clone(),
            ..Default::default()
        }
    }

    /// Check if content is being replayed from a sub-document.
    pub fn in_sub_document(&self) -> bool {
        self.sub_document.is_some()
    }

    /// Check if lazy page span and section opening is allowed.
    pub fn in_main_flow(&self) -> bool {
        !self.in_sub_document() && !self.table.is_open()
    }

    /// Check if a paragraph or list element is open.
    pub fn block_open(&self) -> bool {
        self.paragraph_open || self.list_element_open
    }

    /// Depth of the open list levels.
    pub fn list_depth(&self) -> u8 {
        self.levels.len() as u8
    }
}
