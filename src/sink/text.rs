//! Plain text rendering of the event stream.

use std::fmt::Write as _;

use chrono::Utc;

use super::DocumentSink;
use crate::model::{
    BinaryObject, CellProperties, DocumentMetadata, FieldKind, HeaderFooterProperties,
    ListLevel, ListLevelProperties, NoteProperties, PageSpanProperties, ParagraphProperties,
    RowProperties, TableProperties,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Capture {
    Main,
    Footnote(String),
    Endnote(String),
    HeaderFooter,
    Comment,
    TextBox,
}

#[derive(Debug)]
struct Buffer {
    capture: Capture,
    text: String,
    /// Paragraphs written in each open cell, innermost last
    cell_paragraphs: Vec<usize>,
    /// Cells written in each open row, innermost last
    row_cells: Vec<usize>,
}

impl Buffer {
    fn new(capture: Capture) -> Self {
        Self {
            capture,
            text: String::new(),
            cell_paragraphs: Vec::new(),
            row_cells: Vec::new(),
        }
    }
}

/// Sink that renders the document as plain text.
///
/// Footnotes and endnotes are replaced by a `[n]` mark and listed after the
/// body. Comments are dropped. Table cells are separated by tabs and rows
/// end with a newline.
///
/// ```
/// use unlegacy::assembler::DocumentAssembler;
/// use unlegacy::model::PageSpan;
/// use unlegacy::sink::TextSink;
///
/// fn main() -> unlegacy::Result<()> {
///     let mut sink = TextSink::new();
///     let mut assembler = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
///     assembler.insert_text("Hello")?;
///     assembler.insert_eol()?;
///     assembler.end_document()?;
///     drop(assembler);
///
///     assert_eq!(sink.into_text(), "Hello\n");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct TextSink {
    buffers: Vec<Buffer>,
    footnotes: Vec<String>,
    endnotes: Vec<String>,
    metadata: DocumentMetadata,
    levels: Vec<(ListLevel, u32)>,
    page_number: u32,
    include_headers_footers: bool,
}

impl Default for TextSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSink {
    /// Create a text sink that skips headers and footers.
    pub fn new() -> Self {
        Self {
            buffers: vec![Buffer::new(Capture::Main)],
            footnotes: Vec::new(),
            endnotes: Vec::new(),
            metadata: DocumentMetadata::default(),
            levels: Vec::new(),
            page_number: 0,
            include_headers_footers: false,
        }
    }

    /// Keep header and footer text in the output.
    pub fn with_headers_footers(mut self, include: bool) -> Self {
        self.include_headers_footers = include;
        self
    }

    /// Rendered text so far, notes excluded.
    pub fn body(&self) -> &str {
        self.buffers.first().map(|b| b.text.as_str()).unwrap_or("")
    }

    /// Consume the sink and return the full text.
    pub fn into_text(mut self) -> String {
        // unterminated captures fold back into their parent
        while self.buffers.len() > 1 {
            self.pop_buffer();
        }
        let mut out = self
            .buffers
            .pop()
            .map(|b| b.text)
            .unwrap_or_default();

        for notes in [&self.footnotes, &self.endnotes] {
            if notes.is_empty() {
                continue;
            }
            if !out.is_empty() && !out.ends_with("\n\n") {
                out.push('\n');
            }
            for note in notes {
                out.push_str(note);
                out.push('\n');
            }
        }
        out
    }

    fn current(&mut self) -> &mut Buffer {
        if self.buffers.is_empty() {
            self.buffers.push(Buffer::new(Capture::Main));
        }
        let last = self.buffers.len() - 1;
        &mut self.buffers[last]
    }

    fn push_str(&mut self, text: &str) {
        self.current().text.push_str(text);
    }

    fn push_buffer(&mut self, capture: Capture) {
        self.buffers.push(Buffer::new(capture));
    }

    fn pop_buffer(&mut self) {
        if self.buffers.len() <= 1 {
            return;
        }
        let Some(buffer) = self.buffers.pop() else {
            return;
        };
        let body = buffer.text.trim().to_string();
        match buffer.capture {
            Capture::Footnote(mark) => self.footnotes.push(format!("[{}] {}", mark, body)),
            Capture::Endnote(mark) => self.endnotes.push(format!("[{}] {}", mark, body)),
            Capture::HeaderFooter => {
                if self.include_headers_footers && !body.is_empty() {
                    self.push_str(&body);
                    self.push_str("\n");
                }
            }
            Capture::TextBox => {
                if !body.is_empty() {
                    self.push_str(&body);
                    self.push_str("\n");
                }
            }
            Capture::Comment | Capture::Main => {}
        }
    }

    fn render_field(&self, field: &FieldKind) -> String {
        let date = || self.metadata.reference_date().unwrap_or_else(Utc::now);
        match field {
            FieldKind::PageNumber => self.page_number.max(1).to_string(),
            FieldKind::PageCount => "#".to_string(),
            FieldKind::Date { format } | FieldKind::Time { format } => {
                let mut out = String::new();
                if write!(out, "{}", date().format(format)).is_err() {
                    log::warn!("invalid date format {:?}", format);
                    out.clear();
                }
                out
            }
            FieldKind::Title => self.metadata.title.clone().unwrap_or_default(),
            FieldKind::Database { name } => format!("\u{ab}{}\u{bb}", name),
        }
    }

    fn start_block(&mut self) {
        let buffer = self.current();
        if let Some(count) = buffer.cell_paragraphs.last_mut() {
            if *count > 0 {
                buffer.text.push(' ');
            }
            *count += 1;
        }
    }

    fn end_block(&mut self) {
        let buffer = self.current();
        if buffer.cell_paragraphs.is_empty() {
            buffer.text.push('\n');
        }
    }
}

impl DocumentSink for TextSink {
    fn set_document_metadata(&mut self, metadata: &DocumentMetadata) {
        self.metadata = metadata.clone();
    }

    fn open_page_span(&mut self, props: &PageSpanProperties) {
        self.page_number = match props.page_number_start {
            Some(start) => start,
            None => self.page_number.saturating_add(1),
        };
    }

    fn open_header(&mut self, _props: &HeaderFooterProperties) {
        self.push_buffer(Capture::HeaderFooter);
    }

    fn close_header(&mut self) {
        self.pop_buffer();
    }

    fn open_footer(&mut self, _props: &HeaderFooterProperties) {
        self.push_buffer(Capture::HeaderFooter);
    }

    fn close_footer(&mut self) {
        self.pop_buffer();
    }

    fn open_paragraph(&mut self, props: &ParagraphProperties) {
        if props.breaks.page_before && !self.body().is_empty() {
            self.page_number = self.page_number.saturating_add(1);
        }
        self.start_block();
    }

    fn close_paragraph(&mut self) {
        self.end_block();
    }

    fn insert_text(&mut self, text: &str) {
        self.push_str(text);
    }

    fn insert_space(&mut self) {
        self.push_str(" ");
    }

    fn insert_tab(&mut self) {
        self.push_str("\t");
    }

    fn insert_line_break(&mut self) {
        self.push_str("\n");
    }

    fn open_ordered_list_level(&mut self, props: &ListLevelProperties) {
        self.levels.push((props.level.clone(), props.start_value));
    }

    fn close_ordered_list_level(&mut self) {
        self.levels.pop();
    }

    fn open_unordered_list_level(&mut self, props: &ListLevelProperties) {
        self.levels.push((props.level.clone(), props.start_value));
    }

    fn close_unordered_list_level(&mut self) {
        self.levels.pop();
    }

    fn open_list_element(&mut self, _props: &ParagraphProperties) {
        self.start_block();
        let depth = self.levels.len();
        let label = match self.levels.last_mut() {
            Some((level, value)) => {
                let label = level.label(*value);
                *value = value.saturating_add(1);
                label
            }
            None => String::new(),
        };
        let indent = "  ".repeat(depth.saturating_sub(1));
        self.push_str(&indent);
        if !label.is_empty() {
            self.push_str(&label);
            self.push_str(" ");
        }
    }

    fn close_list_element(&mut self) {
        self.end_block();
    }

    fn open_footnote(&mut self, props: &NoteProperties) {
        let mark = props.mark();
        self.push_str(&format!("[{}]", mark));
        self.push_buffer(Capture::Footnote(mark));
    }

    fn close_footnote(&mut self) {
        self.pop_buffer();
    }

    fn open_endnote(&mut self, props: &NoteProperties) {
        let mark = props.mark();
        self.push_str(&format!("[{}]", mark));
        self.push_buffer(Capture::Endnote(mark));
    }

    fn close_endnote(&mut self) {
        self.pop_buffer();
    }

    fn open_comment(&mut self) {
        self.push_buffer(Capture::Comment);
    }

    fn close_comment(&mut self) {
        self.pop_buffer();
    }

    fn open_text_box(&mut self) {
        self.push_buffer(Capture::TextBox);
    }

    fn close_text_box(&mut self) {
        self.pop_buffer();
    }

    fn open_table(&mut self, _props: &TableProperties) {
        let buffer = self.current();
        if !buffer.text.is_empty()
            && !buffer.text.ends_with('\n')
            && buffer.cell_paragraphs.is_empty()
        {
            buffer.text.push('\n');
        }
    }

    fn open_table_row(&mut self, _props: &RowProperties) {
        self.current().row_cells.push(0);
    }

    fn open_table_cell(&mut self, _props: &CellProperties) {
        let buffer = self.current();
        if let Some(cells) = buffer.row_cells.last_mut() {
            if *cells > 0 {
                buffer.text.push('\t');
            }
            *cells += 1;
        }
        buffer.cell_paragraphs.push(0);
    }

    fn insert_covered_table_cell(&mut self, _props: &CellProperties) {
        let buffer = self.current();
        if let Some(cells) = buffer.row_cells.last_mut() {
            if *cells > 0 {
                buffer.text.push('\t');
            }
            *cells += 1;
        }
    }

    fn close_table_cell(&mut self) {
        self.current().cell_paragraphs.pop();
    }

    fn close_table_row(&mut self) {
        let buffer = self.current();
        buffer.row_cells.pop();
        if buffer.row_cells.is_empty() {
            buffer.text.push('\n');
        } else {
            buffer.text.push(' ');
        }
    }

    fn insert_binary_object(&mut self, object: &BinaryObject) {
        if let Some(alt) = object.alt_text.as_deref() {
            self.push_str(&format!("[{}]", alt));
        }
    }

    fn insert_field(&mut self, field: &FieldKind) {
        let text = self.render_field(field);
        self.push_str(&text);
    }
}
