//! Counting sink.

use serde::{Deserialize, Serialize};

use super::DocumentSink;
use crate::model::{
    BinaryObject, CellProperties, FieldKind, FrameStyle, HeaderFooterProperties,
    ListLevelProperties, NoteProperties, PageSpanProperties, ParagraphProperties, Placement,
    RowProperties, SectionProperties, SpanProperties, TableProperties,
};

/// Statistics collected from an assembled event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// Number of page spans opened
    pub page_span_count: u32,

    /// Physical pages covered by the opened spans
    pub page_count: u32,

    /// Number of sections
    pub section_count: u32,

    /// Number of paragraphs (list elements excluded)
    pub paragraph_count: u32,

    /// Number of list elements
    pub list_item_count: u32,

    /// Number of list levels opened
    pub list_level_count: u32,

    /// Number of tables
    pub table_count: u32,

    /// Number of table cells, covered cells included
    pub cell_count: u32,

    /// Number of frames
    pub frame_count: u32,

    /// Number of embedded objects
    pub object_count: u32,

    /// Embedded objects that are pictures
    pub image_count: u32,

    /// Payload bytes of all embedded objects
    pub object_bytes: u64,

    /// Number of footnotes and endnotes
    pub note_count: u32,

    /// Number of comments
    pub comment_count: u32,

    /// Number of headers and footers
    pub header_footer_count: u32,

    /// Number of fields
    pub field_count: u32,

    /// Approximate word count (whitespace-separated tokens)
    pub word_count: u32,

    /// Character count (excluding whitespace)
    pub char_count: u32,

    /// Deepest container nesting observed
    pub max_depth: u32,
}

impl AssemblyStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count words and characters in a text fragment.
    pub fn count_text(&mut self, text: &str) {
        self.word_count += text.split_whitespace().count() as u32;
        self.char_count += text.chars().filter(|c| !c.is_whitespace()).count() as u32;
    }

    /// Merge statistics from another run.
    pub fn merge(&mut self, other: &AssemblyStats) {
        self.page_span_count += other.page_span_count;
        self.page_count = self.page_count.saturating_add(other.page_count);
        self.section_count += other.section_count;
        self.paragraph_count += other.paragraph_count;
        self.list_item_count += other.list_item_count;
        self.list_level_count += other.list_level_count;
        self.table_count += other.table_count;
        self.cell_count += other.cell_count;
        self.frame_count += other.frame_count;
        self.object_count += other.object_count;
        self.image_count += other.image_count;
        self.object_bytes = self.object_bytes.saturating_add(other.object_bytes);
        self.note_count += other.note_count;
        self.comment_count += other.comment_count;
        self.header_footer_count += other.header_footer_count;
        self.field_count += other.field_count;
        self.word_count += other.word_count;
        self.char_count += other.char_count;
        self.max_depth = self.max_depth.max(other.max_depth);
    }
}

/// Sink that only gathers [`AssemblyStats`].
#[derive(Debug, Clone, Default)]
pub struct StatsSink {
    stats: AssemblyStats,
    depth: u32,
}

impl StatsSink {
    /// Create a new stats sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected statistics.
    pub fn stats(&self) -> &AssemblyStats {
        &self.stats
    }

    /// Consume the sink and return the statistics.
    pub fn into_stats(self) -> AssemblyStats {
        self.stats
    }

    fn enter(&mut self) {
        self.depth += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.depth);
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl DocumentSink for StatsSink {
    fn open_document(&mut self) {
        self.enter();
    }

    fn close_document(&mut self) {
        self.leave();
    }

    fn open_page_span(&mut self, props: &PageSpanProperties) {
        self.stats.page_span_count += 1;
        self.stats.page_count = self.stats.page_count.saturating_add(props.page_count);
        self.enter();
    }

    fn close_page_span(&mut self) {
        self.leave();
    }

    fn open_header(&mut self, _props: &HeaderFooterProperties) {
        self.stats.header_footer_count += 1;
        self.enter();
    }

    fn close_header(&mut self) {
        self.leave();
    }

    fn open_footer(&mut self, _props: &HeaderFooterProperties) {
        self.stats.header_footer_count += 1;
        self.enter();
    }

    fn close_footer(&mut self) {
        self.leave();
    }

    fn open_section(&mut self, _props: &SectionProperties) {
        self.stats.section_count += 1;
        self.enter();
    }

    fn close_section(&mut self) {
        self.leave();
    }

    fn open_paragraph(&mut self, _props: &ParagraphProperties) {
        self.stats.paragraph_count += 1;
        self.enter();
    }

    fn close_paragraph(&mut self) {
        self.leave();
    }

    fn open_span(&mut self, _props: &SpanProperties) {
        self.enter();
    }

    fn close_span(&mut self) {
        self.leave();
    }

    fn insert_text(&mut self, text: &str) {
        self.stats.count_text(text);
    }

    fn open_ordered_list_level(&mut self, _props: &ListLevelProperties) {
        self.stats.list_level_count += 1;
        self.enter();
    }

    fn close_ordered_list_level(&mut self) {
        self.leave();
    }

    fn open_unordered_list_level(&mut self, _props: &ListLevelProperties) {
        self.stats.list_level_count += 1;
        self.enter();
    }

    fn close_unordered_list_level(&mut self) {
        self.leave();
    }

    fn open_list_element(&mut self, _props: &ParagraphProperties) {
        self.stats.list_item_count += 1;
        self.enter();
    }

    fn close_list_element(&mut self) {
        self.leave();
    }

    fn open_footnote(&mut self, _props: &NoteProperties) {
        self.stats.note_count += 1;
        self.enter();
    }

    fn close_footnote(&mut self) {
        self.leave();
    }

    fn open_endnote(&mut self, _props: &NoteProperties) {
        self.stats.note_count += 1;
        self.enter();
    }

    fn close_endnote(&mut self) {
        self.leave();
    }

    fn open_comment(&mut self) {
        self.stats.comment_count += 1;
        self.enter();
    }

    fn close_comment(&mut self) {
        self.leave();
    }

    fn open_text_box(&mut self) {
        self.enter();
    }

    fn close_text_box(&mut self) {
        self.leave();
    }

    fn open_table(&mut self, _props: &TableProperties) {
        self.stats.table_count += 1;
        self.enter();
    }

    fn open_table_row(&mut self, _props: &RowProperties) {
        self.enter();
    }

    fn open_table_cell(&mut self, _props: &CellProperties) {
        self.stats.cell_count += 1;
        self.enter();
    }

    fn insert_covered_table_cell(&mut self, _props: &CellProperties) {
        self.stats.cell_count += 1;
    }

    fn close_table_cell(&mut self) {
        self.leave();
    }

    fn close_table_row(&mut self) {
        self.leave();
    }

    fn close_table(&mut self) {
        self.leave();
    }

    fn open_frame(&mut self, _placement: &Placement, _style: &FrameStyle) {
        self.stats.frame_count += 1;
        self.enter();
    }

    fn close_frame(&mut self) {
        self.leave();
    }

    fn insert_binary_object(&mut self, object: &BinaryObject) {
        self.stats.object_count += 1;
        if object.is_image() {
            self.stats.image_count += 1;
        }
        self.stats.object_bytes = self
            .stats
            .object_bytes
            .saturating_add(object.size() as u64);
    }

    fn insert_field(&mut self, _field: &FieldKind) {
        self.stats.field_count += 1;
    }
}
