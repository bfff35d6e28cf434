//! The document assembler.
//!
//! [`DocumentAssembler`] sits between a format decoder and a
//! [`DocumentSink`]. Decoders call it in whatever order their file format
//! suggests; the assembler opens missing containers on demand, drops calls
//! that make no sense in the current state and hands the sink a stream that
//! is always well nested.
//!
//! # Example
//!
//! ```
//! use unlegacy::assembler::DocumentAssembler;
//! use unlegacy::model::{PageSpan, ParagraphProperties};
//! use unlegacy::sink::RecordingSink;
//!
//! fn main() -> unlegacy::Result<()> {
//!     let mut sink = RecordingSink::new();
//!     let mut assembler = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
//!
//!     assembler.open_paragraph(ParagraphProperties::default())?;
//!     assembler.insert_text("Hello")?;
//!     assembler.insert_tab()?;
//!     assembler.insert_text("World")?;
//!     assembler.close_paragraph()?;
//!     assembler.end_document()?;
//!     drop(assembler);
//!
//!     assert_eq!(sink.names()[..3], ["open_document", "open_page_span", "open_section"]);
//!     Ok(())
//! }
//! ```

mod diagnostics;
mod lists;
mod options;
mod page;
mod paragraph;
mod placement;
mod state;
mod subdocument;
mod table;
mod text;

pub use diagnostics::Diagnostics;
pub use lists::ListArena;
pub use options::{AssemblerOptions, TablePageBreaks};
pub use page::{BreakOutcome, PageState};
pub use paragraph::{resolve_margins, MarginOffsets};
pub use placement::{place_frame, PlacementContext};
pub use subdocument::{SubDocument, SubDocumentContent, SubDocumentId, SubDocumentKind};
pub use table::TableState;

use std::borrow::Cow;
use std::collections::HashSet;
use std::mem;

use crate::error::{Error, Result};
use crate::model::{
    AnchorKind, BinaryObject, CellProperties, DocumentMetadata, FieldKind, FramePosition,
    FrameStyle, HeaderFooter, HeaderFooterKind, HeaderFooterProperties, ListId,
    NoteProperties, PageGeometry, PageSpan, ParagraphProperties, RowProperties,
    SectionProperties, SpanProperties, TableProperties, TextAttributes,
};
use crate::sink::DocumentSink;

use state::{OpenLevel, State};
use text::Segment;

/// Kind of break requested by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// Hard page break
    Page,
    /// Column break
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoteKind {
    Footnote,
    Endnote,
    Comment,
}

/// Event-driven state machine turning decoder calls into a well-nested sink
/// stream.
pub struct DocumentAssembler<'a> {
    sink: &'a mut dyn DocumentSink,
    options: AssemblerOptions,
    diagnostics: Diagnostics,
    lists: ListArena,
    pages: PageState,
    state: State,
    saved: Vec<State>,
    active: HashSet<SubDocumentId>,
    metadata: Option<DocumentMetadata>,
    document_started: bool,
    document_closed: bool,
    footnote_count: u32,
    endnote_count: u32,
}

impl<'a> DocumentAssembler<'a> {
    /// Create an assembler with default options.
    pub fn new(sink: &'a mut dyn DocumentSink, page_spans: Vec<PageSpan>) -> Self {
        Self::with_options(sink, page_spans, AssemblerOptions::default())
    }

    /// Create an assembler with custom options.
    pub fn with_options(
        sink: &'a mut dyn DocumentSink,
        page_spans: Vec<PageSpan>,
        options: AssemblerOptions,
    ) -> Self {
        Self {
            sink,
            diagnostics: Diagnostics::new(options.warning_limit),
            options,
            lists: ListArena::new(),
            pages: PageState::new(page_spans),
            state: State::default(),
            saved: Vec::new(),
            active: HashSet::new(),
            metadata: None,
            document_started: false,
            document_closed: false,
            footnote_count: 0,
            endnote_count: 0,
        }
    }

    // ----------------------------------------------------------------
    // Accessors
    // ----------------------------------------------------------------

    /// Session options.
    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Warnings recorded so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Consume the assembler and keep its warnings.
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Lists known to the session.
    pub fn lists(&self) -> &ListArena {
        &self.lists
    }

    /// Mutable access to the lists, for decoders defining them.
    pub fn lists_mut(&mut self) -> &mut ListArena {
        &mut self.lists
    }

    /// Current page number. Advances once per requested page break.
    pub fn page_number(&self) -> u32 {
        self.pages.page_number()
    }

    /// Geometry of the current page.
    pub fn page_geometry(&self) -> PageGeometry {
        self.pages.geometry()
    }

    /// Properties used for the current or next paragraph.
    pub fn paragraph_properties(&self) -> &ParagraphProperties {
        &self.state.paragraph
    }

    /// Properties used for the current or next span.
    pub fn span_properties(&self) -> &SpanProperties {
        &self.state.span
    }

    /// Check if a paragraph or list element is open.
    pub fn is_paragraph_open(&self) -> bool {
        self.state.block_open()
    }

    /// Check if a sub-document is being replayed.
    pub fn in_sub_document(&self) -> bool {
        self.state.in_sub_document()
    }

    /// Check if a table is open in the current scope.
    pub fn in_table(&self) -> bool {
        self.state.table.is_open()
    }

    /// Depth of the list levels currently open.
    pub fn list_depth(&self) -> u8 {
        self.state.list_depth()
    }

    /// Check if the document was closed.
    pub fn is_closed(&self) -> bool {
        self.document_closed
    }

    fn warn(&mut self, key: &'static str, message: impl AsRef<str>) {
        self.diagnostics.warn(key, message);
    }

    // ----------------------------------------------------------------
    // Document and page spans
    // ----------------------------------------------------------------

    /// Set metadata sent to the sink when the document opens.
    pub fn set_document_metadata(&mut self, metadata: DocumentMetadata) {
        if self.document_started {
            self.warn("metadata", "metadata set after the document was opened");
            return;
        }
        self.metadata = Some(metadata);
    }

    fn start_document(&mut self) {
        if self.document_started {
            return;
        }
        self.document_started = true;
        if let Some(metadata) = self.metadata.as_ref() {
            self.sink.set_document_metadata(metadata);
        }
        self.sink.open_document();
    }

    fn ensure_page_span(&mut self) -> Result<()> {
        if self.pages.is_open() {
            return Ok(());
        }
        self.start_document();
        self.pages.open()?;
        let Some(span) = self.pages.current_span().cloned() else {
            return Ok(());
        };
        self.sink.open_page_span(&span.properties());

        let mut result = Ok(());
        for header_footer in &span.header_footers {
            if let Err(e) = self.replay_header_footer(header_footer) {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }

    fn replay_header_footer(&mut self, header_footer: &HeaderFooter) -> Result<()> {
        let props = HeaderFooterProperties {
            occurrence: header_footer.occurrence,
        };
        let kind = match header_footer.kind {
            HeaderFooterKind::Header => {
                self.sink.open_header(&props);
                SubDocumentKind::Header
            }
            HeaderFooterKind::Footer => {
                self.sink.open_footer(&props);
                SubDocumentKind::Footer
            }
        };
        let result = self.run_sub_document(kind, header_footer.content.as_ref());
        match header_footer.kind {
            HeaderFooterKind::Header => self.sink.close_header(),
            HeaderFooterKind::Footer => self.sink.close_footer(),
        }
        result
    }

    fn close_page_span(&mut self) -> Result<()> {
        if !self.pages.is_open() {
            return Ok(());
        }
        self.close_section_internal()?;
        // closing the section may already have closed the span
        if !self.pages.is_open() {
            return Ok(());
        }
        self.sink.close_page_span();
        self.pages.close();
        Ok(())
    }

    /// Close everything and end the document.
    ///
    /// Must be called once, from the main flow. The document is opened (with
    /// one page span) even if nothing was inserted.
    pub fn end_document(&mut self) -> Result<()> {
        if self.document_closed {
            return Ok(());
        }
        if self.state.in_sub_document() {
            self.warn("end-document", "end_document called inside a sub-document");
            return Ok(());
        }
        while self.state.table.is_open() {
            if !self.close_table()? {
                break;
            }
        }
        self.flush_deferred_tabs()?;
        if self.pages.pages_started() == 0 && self.pages.total_pages() > 0 {
            self.ensure_page_span()?;
        }
        self.close_block()?;
        self.close_frame();
        self.close_page_span()?;
        self.start_document();
        self.sink.close_document();
        self.document_closed = true;
        Ok(())
    }

    // ----------------------------------------------------------------
    // Sections
    // ----------------------------------------------------------------

    fn ensure_section(&mut self) -> Result<()> {
        if self.state.section_open {
            return Ok(());
        }
        self.open_section_internal(&SectionProperties::default())
    }

    fn open_section_internal(&mut self, props: &SectionProperties) -> Result<()> {
        self.ensure_page_span()?;
        if self.state.section_open {
            return Ok(());
        }
        self.sink.open_section(props);
        self.state.section_open = true;
        self.state.offsets = MarginOffsets::from_section(props);
        Ok(())
    }

    /// Open a section with explicit properties.
    ///
    /// Returns `false` when a section is already open, when a table is open,
    /// or inside any sub-document other than a text box.
    pub fn open_section(&mut self, props: &SectionProperties) -> Result<bool> {
        if self.state.section_open {
            self.warn("section", "a section is already open");
            return Ok(false);
        }
        if self.state.table.is_open() {
            self.warn("section", "sections cannot be opened in a table");
            return Ok(false);
        }
        match self.state.sub_document {
            None => {
                self.close_block()?;
                self.change_list(None, 0);
                self.open_section_internal(props)?;
            }
            Some(SubDocumentKind::TextBox) => {
                self.close_block()?;
                self.change_list(None, 0);
                self.sink.open_section(props);
                self.state.section_open = true;
                self.state.offsets = MarginOffsets::from_section(props);
            }
            Some(kind) => {
                self.warn("section", format!("sections cannot be opened in a {:?}", kind));
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn close_section_internal(&mut self) -> Result<()> {
        if !self.state.section_open {
            return Ok(());
        }
        self.close_block()?;
        // a pending page break may have closed the section already
        if !self.state.section_open {
            return Ok(());
        }
        self.change_list(None, 0);
        self.close_frame();
        self.sink.close_section();
        self.state.section_open = false;
        self.state.offsets = MarginOffsets::default();
        Ok(())
    }

    /// Close the open section. Returns `false` if none is open.
    pub fn close_section(&mut self) -> Result<bool> {
        if !self.state.section_open {
            log::debug!("close_section without an open section");
            return Ok(false);
        }
        self.close_section_internal()?;
        Ok(true)
    }

    // ----------------------------------------------------------------
    // Paragraphs
    // ----------------------------------------------------------------

    /// Set the properties of the next paragraph.
    pub fn set_paragraph_properties(&mut self, props: ParagraphProperties) {
        self.state.paragraph = props;
    }

    /// Close the current paragraph, if any, and open a new one.
    pub fn open_paragraph(&mut self, props: ParagraphProperties) -> Result<()> {
        self.close_block()?;
        self.state.paragraph = props;
        if self.open_block()? {
            self.flush_deferred_tabs()?;
        }
        Ok(())
    }

    /// Close the current paragraph or list element.
    pub fn close_paragraph(&mut self) -> Result<()> {
        if !self.state.block_open() {
            log::debug!("close_paragraph without an open paragraph");
            return Ok(());
        }
        self.close_block()
    }

    /// End the current paragraph, opening an empty one first if needed.
    pub fn insert_eol(&mut self) -> Result<()> {
        if !self.prepare_inline()? && !self.state.block_open() {
            return Ok(());
        }
        self.close_block()
    }

    fn can_hold_content(&mut self) -> bool {
        if self.document_closed {
            self.warn("closed", "content inserted after end_document");
            return false;
        }
        if !self.state.table.accepts_content() {
            self.warn("table-content", "content inside a table but outside any cell");
            return false;
        }
        if self.state.frame_open {
            self.warn("frame-content", "content inside an open frame");
            return false;
        }
        true
    }

    fn open_block(&mut self) -> Result<bool> {
        if self.state.block_open() {
            return Ok(true);
        }
        if !self.can_hold_content() {
            return Ok(false);
        }
        if self.state.in_main_flow() {
            self.ensure_section()?;
        }

        let (list, depth) = match self.state.paragraph.list {
            Some(r) if r.depth > 0 && self.lists.contains(r.id) => (Some(r.id), r.depth),
            Some(r) if r.depth > 0 => {
                self.warn("unknown-list", format!("unknown {}, using depth 0", r.id));
                (None, 0)
            }
            _ => (None, 0),
        };
        self.change_list(list, depth);

        let level = list.and_then(|id| self.lists.get(id)).and_then(|l| l.level(depth));
        let mut props = resolve_margins(&self.state.paragraph, level, self.state.offsets);
        props.breaks.page_before |= mem::take(&mut self.state.page_break_before);
        props.breaks.column_before |= mem::take(&mut self.state.column_break_before);

        match list {
            Some(id) => {
                self.lists.next_value(id, depth);
                self.sink.open_list_element(&props);
                self.state.list_element_open = true;
            }
            None => {
                self.sink.open_paragraph(&props);
                self.state.paragraph_open = true;
            }
        }
        self.state.block_emitted = true;
        Ok(true)
    }

    fn close_block(&mut self) -> Result<()> {
        if !self.state.block_open() {
            return Ok(());
        }
        self.close_frame();
        self.close_span();
        if self.state.list_element_open {
            self.sink.close_list_element();
        } else {
            self.sink.close_paragraph();
        }
        self.state.list_element_open = false;
        self.state.paragraph_open = false;

        if self.state.pending_page_break && !self.state.table.is_open() {
            self.state.pending_page_break = false;
            self.apply_page_break()?;
        }
        Ok(())
    }

    // ----------------------------------------------------------------
    // Lists
    // ----------------------------------------------------------------

    fn change_list(&mut self, target: Option<ListId>, depth: u8) {
        let depth = if target.is_some() { depth } else { 0 };
        let current = self.state.list_depth();
        let keep = if depth > 0 && self.state.list != target {
            0
        } else {
            current.min(depth)
        };

        while self.state.list_depth() > keep {
            let closing = self.state.list_depth();
            if let Some(level) = self.state.levels.pop() {
                if level.ordered {
                    self.sink.close_ordered_list_level();
                } else {
                    self.sink.close_unordered_list_level();
                }
            }
            if let Some(id) = self.state.list {
                self.lists.close_level(id, closing);
            }
        }

        if depth == 0 {
            self.state.list = None;
            return;
        }
        let Some(id) = target else {
            return;
        };
        self.state.list = Some(id);

        for d in keep + 1..=depth {
            let Some(props) = self.lists.open_level(id, d) else {
                break;
            };
            if self.lists.needs_definition(id, d) {
                self.sink.define_list_level(&props);
                self.lists.mark_announced(id, d);
            }
            let ordered = props.level.is_numeric();
            if ordered {
                self.sink.open_ordered_list_level(&props);
            } else {
                self.sink.open_unordered_list_level(&props);
            }
            self.state.levels.push(OpenLevel { ordered });
        }
    }

    // ----------------------------------------------------------------
    // Spans and text
    // ----------------------------------------------------------------

    /// Set the properties of the next span.
    ///
    /// Buffered text is flushed with the old properties first.
    pub fn set_span_properties(&mut self, props: SpanProperties) {
        if props == self.state.span {
            return;
        }
        self.flush_text();
        if self.state.span_open && self.state.open_span.as_ref() != Some(&props) {
            self.close_span();
        }
        self.state.span = props;
    }

    /// Change only the attribute bits of the next span.
    pub fn set_attributes(&mut self, attributes: TextAttributes) {
        let mut props = self.state.span.clone();
        props.attributes = attributes;
        self.set_span_properties(props);
    }

    fn ensure_span(&mut self) -> Result<bool> {
        if self.state.span_open {
            return Ok(true);
        }
        if !self.open_block()? {
            return Ok(false);
        }
        self.sink.open_span(&self.state.span);
        self.state.span_open = true;
        self.state.open_span = Some(self.state.span.clone());
        Ok(true)
    }

    fn close_span(&mut self) {
        self.flush_text();
        if self.state.span_open {
            // inline frames live inside the span
            self.close_frame();
            self.sink.close_span();
            self.state.span_open = false;
            self.state.open_span = None;
        }
    }

    fn prepare_inline(&mut self) -> Result<bool> {
        if self.state.frame_open {
            self.warn("frame-content", "content inside an open frame");
            return Ok(false);
        }
        self.flush_deferred_tabs()?;
        self.ensure_span()
    }

    fn flush_text(&mut self) {
        if self.state.text.is_empty() {
            return;
        }
        let buffered = mem::take(&mut self.state.text);
        if !self.state.span_open {
            log::debug!("dropping {} bytes of text without a span", buffered.len());
            return;
        }
        let content = if self.options.normalize_text {
            text::normalize(&buffered)
        } else {
            Cow::Borrowed(buffered.as_str())
        };
        if !self.options.collapse_space_runs {
            self.sink.insert_text(&content);
            return;
        }
        for segment in text::split_space_runs(&content) {
            match segment {
                Segment::Text(t) => self.sink.insert_text(t),
                Segment::Space => self.sink.insert_space(),
            }
        }
    }

    fn flush_deferred_tabs(&mut self) -> Result<()> {
        if self.state.deferred_tabs == 0 {
            return Ok(());
        }
        let count = mem::take(&mut self.state.deferred_tabs);
        let saved = self.state.span.attributes;
        let decorated = self.state.span.has_line_decoration();
        if decorated {
            self.close_span();
            self.state.span.attributes.remove(TextAttributes::LINE_DECORATIONS);
        }
        if self.ensure_span()? {
            for _ in 0..count {
                self.sink.insert_tab();
            }
        }
        if decorated {
            self.close_span();
            self.state.span.attributes = saved;
        }
        Ok(())
    }

    /// Append text to the current span.
    pub fn insert_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        if !self.prepare_inline()? {
            return Ok(());
        }
        self.state.text.push_str(text);
        Ok(())
    }

    /// Insert one character. Tabs and line ends are dispatched to their
    /// dedicated operations.
    pub fn insert_char(&mut self, c: char) -> Result<()> {
        match c {
            '\t' => self.insert_tab(),
            '\n' | '\r' => self.insert_eol(),
            '\u{2028}' => self.insert_line_break(),
            _ => {
                let mut buf = [0u8; 4];
                self.insert_text(c.encode_utf8(&mut buf))
            }
        }
    }

    /// Insert a character given as a code point.
    ///
    /// Invalid scalar values and control characters become U+FFFD.
    pub fn insert_unicode(&mut self, code: u32) -> Result<()> {
        match text::scalar(code) {
            Some(c) => self.insert_char(c),
            None if code == 0x0A || code == 0x0D => self.insert_eol(),
            None => {
                self.warn("invalid-unicode", format!("invalid character U+{:04X}", code));
                self.insert_char(char::REPLACEMENT_CHARACTER)
            }
        }
    }

    /// Insert a tab.
    ///
    /// Before any paragraph is open the tab is deferred until the next
    /// paragraph or text, so that leading tabs do not each open a paragraph.
    pub fn insert_tab(&mut self) -> Result<()> {
        if !self.state.block_open() {
            if self.can_hold_content() {
                self.state.deferred_tabs += 1;
            }
            return Ok(());
        }
        if !self.prepare_inline()? {
            return Ok(());
        }
        self.flush_text();
        self.sink.insert_tab();
        Ok(())
    }

    /// Insert a significant space that must not be collapsed.
    pub fn insert_space(&mut self) -> Result<()> {
        if !self.prepare_inline()? {
            return Ok(());
        }
        self.flush_text();
        self.sink.insert_space();
        Ok(())
    }

    /// Insert a line break inside the current paragraph.
    pub fn insert_line_break(&mut self) -> Result<()> {
        if !self.prepare_inline()? {
            return Ok(());
        }
        self.flush_text();
        self.sink.insert_line_break();
        Ok(())
    }

    /// Insert a field.
    pub fn insert_field(&mut self, field: FieldKind) -> Result<()> {
        if !self.prepare_inline()? {
            return Ok(());
        }
        self.flush_text();
        self.sink.insert_field(&field);
        Ok(())
    }

    // ----------------------------------------------------------------
    // Breaks
    // ----------------------------------------------------------------

    /// Request a page or column break.
    ///
    /// Page breaks requested while a paragraph is open are applied when it
    /// closes; inside a table they wait for the table to close (or are
    /// dropped, see [`TablePageBreaks`]). Sub-documents never break pages.
    pub fn insert_break(&mut self, kind: BreakKind) -> Result<()> {
        if self.state.in_sub_document() {
            log::debug!("{:?} break ignored inside a sub-document", kind);
            return Ok(());
        }
        match kind {
            BreakKind::Column => {
                self.flush_deferred_tabs()?;
                self.close_block()?;
                self.state.column_break_before = true;
            }
            BreakKind::Page => {
                self.pages.count_break();
                if self.state.table.is_open() {
                    match self.options.table_page_breaks {
                        TablePageBreaks::Defer => self.state.pending_page_break = true,
                        TablePageBreaks::Suppress => {
                            log::debug!("page break inside a table suppressed");
                        }
                    }
                } else if self.state.block_open() {
                    self.state.pending_page_break = true;
                } else {
                    self.flush_deferred_tabs()?;
                    if self.state.block_open() {
                        self.state.pending_page_break = true;
                    } else {
                        self.apply_page_break()?;
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_page_break(&mut self) -> Result<()> {
        match self.pages.apply_break() {
            BreakOutcome::NextPage => self.state.page_break_before = true,
            BreakOutcome::CloseSpan => self.close_page_span()?,
            BreakOutcome::Idle => {
                if self.state.in_main_flow() {
                    self.ensure_page_span()?;
                    if self.pages.apply_break() == BreakOutcome::NextPage {
                        self.state.page_break_before = true;
                    } else {
                        self.close_page_span()?;
                    }
                }
            }
        }
        Ok(())
    }

    // ----------------------------------------------------------------
    // Tables
    // ----------------------------------------------------------------

    /// Open a table. Returns `false` if a table cannot start here.
    pub fn open_table(&mut self, props: &TableProperties) -> Result<bool> {
        if !self.can_hold_content() {
            return Ok(false);
        }
        self.flush_deferred_tabs()?;
        self.close_block()?;
        self.change_list(None, 0);
        if self.state.in_main_flow() {
            self.ensure_section()?;
        }
        self.sink.open_table(props);
        let table = State::for_table(&self.state);
        let parent = mem::replace(&mut self.state, table);
        self.saved.push(parent);
        Ok(true)
    }

    /// Open a row, closing a dangling one first.
    pub fn open_table_row(&mut self, props: &RowProperties) -> Result<bool> {
        if self.state.table.row_open() {
            self.close_table_row()?;
        }
        match self.state.table.open_row() {
            Some(next) => {
                self.sink.open_table_row(props);
                self.state.table = next;
                Ok(true)
            }
            None => {
                self.warn("table-row", "open_table_row without an open table");
                Ok(false)
            }
        }
    }

    /// Open a cell. Rejected without an open row.
    pub fn open_table_cell(&mut self, props: &CellProperties) -> Result<bool> {
        if self.state.table.cell_open() {
            self.close_table_cell()?;
        }
        match self.state.table.open_cell() {
            Some(next) => {
                self.sink.open_table_cell(props);
                self.state.table = next;
                Ok(true)
            }
            None => {
                self.warn("table-cell", "open_table_cell without an open row");
                Ok(false)
            }
        }
    }

    /// Insert a placeholder for a cell covered by a spanning neighbour.
    pub fn insert_covered_table_cell(&mut self, props: &CellProperties) -> Result<bool> {
        if self.state.table.cell_open() {
            self.close_table_cell()?;
        }
        if self.state.table != TableState::RowOpen {
            self.warn("table-cell", "covered cell without an open row");
            return Ok(false);
        }
        self.sink.insert_covered_table_cell(props);
        Ok(true)
    }

    /// Close the open cell, together with anything left open inside it.
    pub fn close_table_cell(&mut self) -> Result<bool> {
        if !self.state.table.cell_open() {
            log::debug!("close_table_cell without an open cell");
            return Ok(false);
        }
        self.state.deferred_tabs = 0;
        self.close_block()?;
        self.change_list(None, 0);
        self.state.paragraph.list = None;
        self.close_frame();
        self.sink.close_table_cell();
        self.state.table = TableState::RowOpen;
        Ok(true)
    }

    /// Close the open row, closing a dangling cell first.
    pub fn close_table_row(&mut self) -> Result<bool> {
        if self.state.table.cell_open() {
            self.close_table_cell()?;
        }
        match self.state.table.close_row() {
            Some(next) => {
                self.sink.close_table_row();
                self.state.table = next;
                Ok(true)
            }
            None => {
                log::debug!("close_table_row without an open row");
                Ok(false)
            }
        }
    }

    /// Close the open table, closing a dangling cell and row first.
    pub fn close_table(&mut self) -> Result<bool> {
        if !self.state.table.is_open() {
            log::debug!("close_table without an open table");
            return Ok(false);
        }
        if self.state.table.row_open() {
            self.close_table_row()?;
        }
        self.sink.close_table();

        let Some(parent) = self.saved.pop() else {
            self.state = State::default();
            return Ok(true);
        };
        let table = mem::replace(&mut self.state, parent);
        self.state.block_emitted |= table.block_emitted;
        self.state.page_break_before |= table.page_break_before;

        if table.pending_page_break {
            if self.state.table.is_open() || self.state.block_open() {
                self.state.pending_page_break = true;
            } else if self.state.in_main_flow() {
                self.apply_page_break()?;
            }
        }
        Ok(true)
    }

    // ----------------------------------------------------------------
    // Frames
    // ----------------------------------------------------------------

    /// Open a positioned frame. Returns `false` if a frame is already open
    /// or the current position cannot hold one.
    pub fn open_frame(&mut self, position: &FramePosition, style: &FrameStyle) -> Result<bool> {
        if self.state.frame_open {
            self.warn("frame", "a frame is already open");
            return Ok(false);
        }
        if !self.can_hold_content() {
            return Ok(false);
        }

        let mut position = *position;
        if position.anchor == AnchorKind::Page && !self.state.in_main_flow() {
            self.warn("frame", "page anchor outside the main flow, anchoring to paragraph");
            position.anchor = AnchorKind::Paragraph;
        }

        match position.anchor {
            AnchorKind::Page => {
                self.flush_deferred_tabs()?;
                if self.state.block_open() {
                    self.close_span();
                } else {
                    self.ensure_section()?;
                }
            }
            AnchorKind::Paragraph | AnchorKind::Frame => {
                self.flush_deferred_tabs()?;
                if !self.open_block()? {
                    return Ok(false);
                }
                self.close_span();
            }
            AnchorKind::Char | AnchorKind::CharBaseLine => {
                if !self.prepare_inline()? {
                    return Ok(false);
                }
                self.flush_text();
            }
        }

        let ctx = PlacementContext {
            page: self.pages.geometry(),
            section: self.state.offsets,
            paragraph_left: self.state.paragraph.margin_left,
            paragraph_right: self.state.paragraph.margin_right,
            page_number: self.pages.page_number(),
        };
        let placement = place_frame(&position, &ctx);
        self.sink.open_frame(&placement, style);
        self.state.frame_open = true;
        Ok(true)
    }

    /// Close the open frame. Returns `false` if none is open.
    pub fn close_frame(&mut self) -> bool {
        if !self.state.frame_open {
            return false;
        }
        self.sink.close_frame();
        self.state.frame_open = false;
        true
    }

    /// Insert an embedded object into the open frame.
    pub fn insert_binary_object(&mut self, object: &BinaryObject) -> bool {
        if !self.state.frame_open {
            self.warn("object", "binary object outside a frame");
            return false;
        }
        self.sink.insert_binary_object(object);
        true
    }

    /// Insert a picture in its own frame.
    pub fn insert_picture(&mut self, position: &FramePosition, object: &BinaryObject) -> Result<bool> {
        if !self.open_frame(position, &FrameStyle::default())? {
            return Ok(false);
        }
        self.insert_binary_object(object);
        self.close_frame();
        Ok(true)
    }

    /// Insert a text box whose content is replayed from a sub-document.
    pub fn insert_text_box(
        &mut self,
        position: &FramePosition,
        style: &FrameStyle,
        content: SubDocumentContent,
    ) -> Result<bool> {
        if !self.can_enter(content.id()) {
            return Ok(false);
        }
        if !self.open_frame(position, style)? {
            return Ok(false);
        }
        self.sink.open_text_box();
        let result = self.run_sub_document(SubDocumentKind::TextBox, Some(&content));
        self.sink.close_text_box();
        self.close_frame();
        result.map(|_| true)
    }

    // ----------------------------------------------------------------
    // Notes
    // ----------------------------------------------------------------

    /// Insert a footnote at the current position.
    pub fn insert_footnote(&mut self, content: SubDocumentContent) -> Result<()> {
        self.insert_note(NoteKind::Footnote, content, None)
    }

    /// Insert a footnote with a custom reference label.
    pub fn insert_labeled_footnote(
        &mut self,
        content: SubDocumentContent,
        label: impl Into<String>,
    ) -> Result<()> {
        self.insert_note(NoteKind::Footnote, content, Some(label.into()))
    }

    /// Insert an endnote at the current position.
    pub fn insert_endnote(&mut self, content: SubDocumentContent) -> Result<()> {
        self.insert_note(NoteKind::Endnote, content, None)
    }

    /// Insert a comment (annotation) at the current position.
    pub fn insert_comment(&mut self, content: SubDocumentContent) -> Result<()> {
        self.insert_note(NoteKind::Comment, content, None)
    }

    fn insert_note(
        &mut self,
        kind: NoteKind,
        content: SubDocumentContent,
        label: Option<String>,
    ) -> Result<()> {
        if self.state.in_note {
            self.warn("note", "notes cannot be nested");
            return Ok(());
        }
        if self.state.in_header_footer {
            self.warn("note", "notes are not allowed in headers and footers");
            return Ok(());
        }
        if !self.can_enter(content.id()) {
            return Ok(());
        }
        if !self.prepare_inline()? {
            return Ok(());
        }
        self.flush_text();

        match kind {
            NoteKind::Footnote => {
                self.footnote_count += 1;
                let props = NoteProperties {
                    number: self.footnote_count,
                    label,
                };
                self.sink.open_footnote(&props);
                let result = self.run_sub_document(SubDocumentKind::Footnote, Some(&content));
                self.sink.close_footnote();
                result
            }
            NoteKind::Endnote => {
                self.endnote_count += 1;
                let props = NoteProperties {
                    number: self.endnote_count,
                    label,
                };
                self.sink.open_endnote(&props);
                let result = self.run_sub_document(SubDocumentKind::Endnote, Some(&content));
                self.sink.close_endnote();
                result
            }
            NoteKind::Comment => {
                self.sink.open_comment();
                let result = self.run_sub_document(SubDocumentKind::Comment, Some(&content));
                self.sink.close_comment();
                result
            }
        }
    }

    // ----------------------------------------------------------------
    // Sub-documents
    // ----------------------------------------------------------------

    fn can_enter(&mut self, id: SubDocumentId) -> bool {
        if self.active.contains(&id) {
            self.warn("cycle", format!("{} is already being replayed", id));
            return false;
        }
        if self.active.len() >= self.options.max_sub_document_depth {
            self.warn(
                "depth",
                format!("sub-document nesting deeper than {}", self.options.max_sub_document_depth),
            );
            return false;
        }
        true
    }

    /// Replay a sub-document in a fresh scope.
    ///
    /// A sub-document that is already being replayed (directly or through
    /// other sub-documents) is skipped without any sink call. Whatever the
    /// content leaves open is closed before the previous scope is restored.
    pub fn handle_sub_document(&mut self, sub_document: &SubDocument) -> Result<()> {
        let content = sub_document.content().clone();
        self.run_sub_document(sub_document.kind(), Some(&content))
    }

    fn run_sub_document(
        &mut self,
        kind: SubDocumentKind,
        content: Option<&SubDocumentContent>,
    ) -> Result<()> {
        if let Some(content) = content {
            if !self.can_enter(content.id()) {
                return Ok(());
            }
        }

        let base = self.saved.len();
        let frame = State::for_sub_document(&self.state, kind);
        let parent = mem::replace(&mut self.state, frame);
        self.saved.push(parent);
        if let Some(content) = content {
            self.active.insert(content.id());
        }

        let mut result = match content {
            Some(content) => content.replay(self),
            None => Ok(()),
        };
        if let Err(e) = &result {
            if !e.is_fatal() {
                log::warn!("{:?} replay failed: {}", kind, e);
                result = Ok(());
            }
        }

        let cleanup = self.close_scope(base, kind);
        if let Some(content) = content {
            self.active.remove(&content.id());
        }
        result.and(cleanup)
    }

    fn close_scope(&mut self, base: usize, kind: SubDocumentKind) -> Result<()> {
        let mut first_error: Option<Error> = None;
        let mut keep = |r: Result<bool>| {
            if let Err(e) = r {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        };

        // tables left open by the content
        while self.saved.len() > base + 1 && self.state.table.is_open() {
            let closed = self.close_table();
            let stop = !matches!(closed, Ok(true));
            keep(closed);
            if stop {
                break;
            }
        }
        self.state.deferred_tabs = 0;
        keep(self.close_block().map(|_| true));
        self.change_list(None, 0);
        self.close_frame();
        keep(self.close_section());

        if kind.is_header_footer() && !self.state.block_emitted {
            self.state.paragraph = ParagraphProperties::default();
            keep(self.open_block());
            keep(self.close_block().map(|_| true));
        }

        while self.saved.len() > base {
            match self.saved.pop() {
                Some(parent) => self.state = parent,
                None => break,
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ListLevel, ListLevelKind, Occurrence, Size};
    use crate::sink::{RecordingSink, SinkEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(
        spans: Vec<PageSpan>,
        f: impl FnOnce(&mut DocumentAssembler<'_>) -> Result<()>,
    ) -> RecordingSink {
        let mut sink = RecordingSink::new();
        let mut assembler = DocumentAssembler::new(&mut sink, spans);
        f(&mut assembler).unwrap();
        assembler.end_document().unwrap();
        drop(assembler);
        sink
    }

    /// Names between the first section open and the last section close.
    fn section_body(sink: &RecordingSink) -> Vec<&'static str> {
        let names = sink.names();
        let start = names.iter().position(|n| *n == "open_section").unwrap() + 1;
        let end = names.iter().rposition(|n| *n == "close_section").unwrap();
        names[start..end].to_vec()
    }

    #[test]
    fn test_paragraph_with_tab() {
        let sink = record(vec![PageSpan::default()], |a| {
            a.open_paragraph(ParagraphProperties::default())?;
            a.insert_text("Hello")?;
            a.insert_tab()?;
            a.insert_text("World")?;
            a.close_paragraph()
        });
        assert_eq!(
            section_body(&sink),
            [
                "open_paragraph",
                "open_span",
                "insert_text",
                "insert_tab",
                "insert_text",
                "close_span",
                "close_paragraph"
            ]
        );
        assert_eq!(sink.text(), "HelloWorld");
    }

    #[test]
    fn test_leading_tabs_are_deferred() {
        let sink = record(vec![PageSpan::default()], |a| {
            a.insert_tab()?;
            a.insert_tab()?;
            a.insert_text("X")
        });
        assert_eq!(
            section_body(&sink)[..5],
            ["open_paragraph", "open_span", "insert_tab", "insert_tab", "insert_text"]
        );
    }

    #[test]
    fn test_deferred_tabs_drop_underline() {
        let sink = record(vec![PageSpan::default()], |a| {
            a.set_attributes(TextAttributes::UNDERLINE);
            a.insert_tab()?;
            a.insert_text("X")
        });
        let spans: Vec<_> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::OpenSpan(props) => Some(props.attributes),
                _ => None,
            })
            .collect();
        assert_eq!(spans, [TextAttributes::NONE, TextAttributes::UNDERLINE]);
    }

    #[test]
    fn test_empty_document() {
        let sink = record(vec![PageSpan::default()], |_| Ok(()));
        assert_eq!(
            sink.names(),
            ["open_document", "open_page_span", "close_page_span", "close_document"]
        );
    }

    #[test]
    fn test_stray_closes_are_ignored() {
        let sink = record(vec![PageSpan::default()], |a| {
            a.close_paragraph()?;
            assert!(!a.close_section()?);
            assert!(!a.close_table()?);
            assert!(!a.close_table_cell()?);
            assert!(!a.close_frame());
            Ok(())
        });
        assert_eq!(sink.events().len(), 4);
    }

    #[test]
    fn test_list_transitions() {
        let sink = record(vec![PageSpan::default()], |a| {
            let l1 = a.lists_mut().create(vec![
                ListLevel::numbered(ListLevelKind::Decimal),
                ListLevel::bullet("-"),
            ]);
            let l2 = a.lists_mut().create(vec![ListLevel::bullet("*")]);
            for (id, depth) in [(l1, 1), (l1, 2), (l2, 1)] {
                a.set_paragraph_properties(ParagraphProperties::new().in_list(id, depth));
                a.insert_text("item")?;
                a.insert_eol()?;
            }
            Ok(())
        });
        let levels: Vec<_> = sink
            .names()
            .into_iter()
            .filter(|n| n.contains("list_level"))
            .collect();
        assert_eq!(
            levels,
            [
                "define_list_level",
                "open_ordered_list_level",
                "define_list_level",
                "open_unordered_list_level",
                "close_unordered_list_level",
                "close_ordered_list_level",
                "define_list_level",
                "open_unordered_list_level",
                "close_unordered_list_level",
            ]
        );
        let elements = sink.count("open_list_element");
        assert_eq!(elements, 3);
    }

    #[test]
    fn test_unknown_list_degrades_to_paragraph() {
        let mut sink = RecordingSink::new();
        let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
        a.set_paragraph_properties(ParagraphProperties::new().in_list(ListId(42), 1));
        a.insert_text("x").unwrap();
        a.end_document().unwrap();
        assert_eq!(a.diagnostics().count("unknown-list"), 1);
        drop(a);
        assert!(sink.names().contains(&"open_paragraph"));
        assert!(!sink.names().contains(&"open_list_element"));
    }

    #[test]
    fn test_page_break_waits_for_paragraph_close() {
        let sink = record(vec![PageSpan::default().repeated(2)], |a| {
            a.insert_text("A")?;
            a.insert_break(BreakKind::Page)?;
            a.insert_text("B")?;
            assert_eq!(a.page_number(), 2);
            a.insert_eol()?;
            a.insert_text("C")
        });
        let paragraphs: Vec<_> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::OpenParagraph(props) => Some(props.breaks.page_before),
                _ => None,
            })
            .collect();
        assert_eq!(paragraphs, [false, true]);
        assert_eq!(sink.text(), "ABC");
    }

    #[test]
    fn test_span_exhaustion_is_fatal() {
        let mut sink = RecordingSink::new();
        let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
        a.insert_text("A").unwrap();
        a.insert_eol().unwrap();
        a.insert_break(BreakKind::Page).unwrap();
        let err = a.insert_text("B").unwrap_err();
        assert!(matches!(
            err,
            Error::PageSpanExhausted {
                page: 2,
                available: 1
            }
        ));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_empty_header_gets_paragraph() {
        let header = HeaderFooter {
            kind: HeaderFooterKind::Header,
            occurrence: Occurrence::All,
            content: None,
        };
        let sink = record(vec![PageSpan::default().with_header_footer(header)], |a| {
            a.insert_text("body")
        });
        assert_eq!(
            sink.names()[2..6],
            ["open_header", "open_paragraph", "close_paragraph", "close_header"]
        );
    }

    #[test]
    fn test_notes_dropped_in_header() {
        let header = SubDocumentContent::new(SubDocumentId(1), |a| {
            a.insert_text("head")?;
            a.insert_footnote(SubDocumentContent::new(SubDocumentId(2), |a| {
                a.insert_text("note")
            }))
        });
        let mut sink = RecordingSink::new();
        let mut a = DocumentAssembler::new(
            &mut sink,
            vec![PageSpan::default().with_header_footer(HeaderFooter::header(header))],
        );
        a.insert_text("body").unwrap();
        a.end_document().unwrap();
        assert_eq!(a.diagnostics().count("note"), 1);
        drop(a);
        assert!(!sink.names().contains(&"open_footnote"));
        assert_eq!(sink.text(), "headbody");
    }

    #[test]
    fn test_footnote_numbering() {
        let sink = record(vec![PageSpan::default()], |a| {
            for i in 0..2u64 {
                a.insert_text("x")?;
                a.insert_footnote(SubDocumentContent::new(SubDocumentId(i), |a| {
                    a.insert_text("n")
                }))?;
            }
            Ok(())
        });
        let numbers: Vec<_> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::OpenFootnote(props) => Some(props.number),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, [1, 2]);
        // note content is replayed inside the span
        let names = sink.names();
        let open = names.iter().position(|n| *n == "open_footnote").unwrap();
        assert_eq!(names[open + 1..open + 3], ["open_paragraph", "open_span"]);
    }

    #[test]
    fn test_self_invoking_text_box() {
        let slot: Rc<RefCell<Option<SubDocumentContent>>> = Rc::default();
        let inner = slot.clone();
        let position = FramePosition::new(AnchorKind::Char, Size::new(20.0, 10.0));
        let content = SubDocumentContent::new(SubDocumentId(9), move |a| {
            a.insert_text("box")?;
            let again = inner.borrow().clone();
            if let Some(c) = again {
                assert!(!a.insert_text_box(&position, &FrameStyle::default(), c)?);
            }
            Ok(())
        });
        *slot.borrow_mut() = Some(content.clone());

        let sink = record(vec![PageSpan::default()], |a| {
            a.insert_text_box(&position, &FrameStyle::default(), content)
                .map(|_| ())
        });
        let boxes = sink.count("open_text_box");
        assert_eq!(boxes, 1);
        assert_eq!(sink.text(), "box");
        slot.borrow_mut().take();
    }

    #[test]
    fn test_table_content_outside_cell_dropped() {
        let sink = record(vec![PageSpan::default()], |a| {
            a.open_table(&TableProperties::default())?;
            a.insert_text("lost")?;
            a.open_table_row(&RowProperties::default())?;
            a.open_table_cell(&CellProperties::default())?;
            a.insert_text("kept")?;
            a.close_table()?;
            Ok(())
        });
        assert_eq!(sink.text(), "kept");
        let names = sink.names();
        let close = names.iter().position(|n| *n == "close_table").unwrap();
        assert_eq!(
            names[close - 4..=close],
            ["close_span", "close_paragraph", "close_table_cell", "close_table_row", "close_table"]
        );
    }

    #[test]
    fn test_table_page_break_deferred() {
        let sink = record(vec![PageSpan::default().repeated(2)], |a| {
            a.open_table(&TableProperties::default())?;
            a.open_table_row(&RowProperties::default())?;
            a.open_table_cell(&CellProperties::default())?;
            a.insert_text("cell")?;
            a.insert_break(BreakKind::Page)?;
            a.close_table()?;
            a.insert_text("after")
        });
        let flags: Vec<_> = sink
            .events()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::OpenParagraph(props) => Some(props.breaks.page_before),
                _ => None,
            })
            .collect();
        assert_eq!(flags, [false, true]);
    }

    #[test]
    fn test_table_page_break_suppressed() {
        let mut sink = RecordingSink::new();
        let options = AssemblerOptions::new().with_table_page_breaks(TablePageBreaks::Suppress);
        let mut a = DocumentAssembler::with_options(
            &mut sink,
            vec![PageSpan::default().repeated(2)],
            options,
        );
        a.open_table(&TableProperties::default()).unwrap();
        a.insert_break(BreakKind::Page).unwrap();
        a.close_table().unwrap();
        a.insert_text("after").unwrap();
        a.end_document().unwrap();
        drop(a);
        let flagged = sink.events().iter().any(|e| match e {
            SinkEvent::OpenParagraph(props) => props.breaks.page_before,
            _ => false,
        });
        assert!(!flagged);
    }

    #[test]
    fn test_binary_object_needs_frame() {
        let object = BinaryObject::png(vec![1, 2, 3]);
        let position = FramePosition::new(AnchorKind::Paragraph, Size::new(10.0, 10.0));
        let sink = record(vec![PageSpan::default()], |a| {
            assert!(!a.insert_binary_object(&object));
            assert!(a.insert_picture(&position, &object)?);
            Ok(())
        });
        let objects = sink.count("insert_binary_object");
        assert_eq!(objects, 1);
    }

    #[test]
    fn test_space_runs_and_unicode() {
        let mut sink = RecordingSink::new();
        let mut a = DocumentAssembler::new(&mut sink, vec![PageSpan::default()]);
        a.insert_text("a   b").unwrap();
        a.insert_unicode(0xD800).unwrap();
        a.insert_unicode(0xD801).unwrap();
        a.end_document().unwrap();
        assert_eq!(a.diagnostics().count("invalid-unicode"), 2);
        drop(a);
        assert!(sink.names().contains(&"insert_space"));
        assert_eq!(sink.text(), "ab\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_section_rules() {
        let sink = record(vec![PageSpan::default()], |a| {
            assert!(a.open_section(&SectionProperties::default())?);
            assert!(!a.open_section(&SectionProperties::default())?);
            a.insert_text("x")?;
            assert!(a.close_section()?);
            Ok(())
        });
        let sections = sink.count("open_section");
        assert_eq!(sections, 1);
    }
}
