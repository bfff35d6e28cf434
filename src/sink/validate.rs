//! Structural checker for sink event streams.
//!
//! [`NestingValidator`] tracks the open containers and records every call
//! that breaks the nesting rules of the vocabulary. It never panics, so it
//! can sit next to a real sink in a [`CompositeSink`](super::CompositeSink)
//! and report afterwards.

use std::fmt;

use serde::Serialize;

use super::DocumentSink;
use crate::model::{
    BinaryObject, CellProperties, DocumentMetadata, FieldKind, FrameStyle, HeaderFooterProperties,
    ListLevelProperties, NoteProperties, PageSpanProperties, ParagraphProperties, Placement,
    RowProperties, SectionProperties, SpanProperties, TableProperties,
};

/// Kind of an open container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    Document,
    PageSpan,
    Header,
    Footer,
    Section,
    Paragraph,
    Span,
    OrderedListLevel,
    UnorderedListLevel,
    ListElement,
    Footnote,
    Endnote,
    Comment,
    TextBox,
    Table,
    TableRow,
    TableCell,
    Frame,
}

impl Container {
    fn is_list_level(self) -> bool {
        matches!(self, Container::OrderedListLevel | Container::UnorderedListLevel)
    }

    fn is_text_block(self) -> bool {
        matches!(self, Container::Paragraph | Container::ListElement)
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Container::Document => "document",
            Container::PageSpan => "page span",
            Container::Header => "header",
            Container::Footer => "footer",
            Container::Section => "section",
            Container::Paragraph => "paragraph",
            Container::Span => "span",
            Container::OrderedListLevel => "ordered list level",
            Container::UnorderedListLevel => "unordered list level",
            Container::ListElement => "list element",
            Container::Footnote => "footnote",
            Container::Endnote => "endnote",
            Container::Comment => "comment",
            Container::TextBox => "text box",
            Container::Table => "table",
            Container::TableRow => "table row",
            Container::TableCell => "table cell",
            Container::Frame => "frame",
        };
        f.write_str(name)
    }
}

/// One broken nesting rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NestingViolation {
    /// Index of the offending call in the stream
    pub index: usize,

    /// Sink method name
    pub event: &'static str,

    /// Human-readable description
    pub message: String,
}

impl fmt::Display for NestingViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.index, self.event, self.message)
    }
}

/// Sink that checks the nesting rules of the event stream.
#[derive(Debug, Clone, Default)]
pub struct NestingValidator {
    stack: Vec<Container>,
    violations: Vec<NestingViolation>,
    index: usize,
    finished: bool,
}

impl NestingValidator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Violations recorded so far.
    pub fn violations(&self) -> &[NestingViolation] {
        &self.violations
    }

    /// Containers currently open, outermost first.
    pub fn open_containers(&self) -> &[Container] {
        &self.stack
    }

    /// Check if no violation was recorded.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Report containers left open, then return all violations.
    pub fn finish(&mut self) -> &[NestingViolation] {
        if !self.finished {
            self.finished = true;
            let open: Vec<Container> = self.stack.drain(..).rev().collect();
            for container in open {
                self.violations.push(NestingViolation {
                    index: self.index,
                    event: "end_of_stream",
                    message: format!("{} never closed", container),
                });
            }
        }
        &self.violations
    }

    fn top(&self) -> Option<Container> {
        self.stack.last().copied()
    }

    fn report(&mut self, event: &'static str, message: String) {
        log::debug!("nesting violation at #{}: {}: {}", self.index, event, message);
        self.violations.push(NestingViolation {
            index: self.index,
            event,
            message,
        });
    }

    fn parent_ok(container: Container, parent: Option<Container>) -> bool {
        use Container::*;
        match container {
            Document => parent.is_none(),
            PageSpan => parent == Some(Document),
            Header | Footer => parent == Some(PageSpan),
            Section => matches!(parent, Some(PageSpan) | Some(TextBox)),
            Span => matches!(parent, Some(Paragraph) | Some(ListElement)),
            TableRow => parent == Some(Table),
            TableCell => parent == Some(TableRow),
            ListElement => parent.map(Container::is_list_level).unwrap_or(false),
            OrderedListLevel | UnorderedListLevel => !matches!(
                parent,
                None | Some(Document)
                    | Some(PageSpan)
                    | Some(Paragraph)
                    | Some(Span)
                    | Some(Table)
                    | Some(TableRow)
                    | Some(ListElement)
            ),
            Paragraph => !matches!(
                parent,
                None | Some(Document)
                    | Some(PageSpan)
                    | Some(Paragraph)
                    | Some(Span)
                    | Some(Table)
                    | Some(TableRow)
                    | Some(OrderedListLevel)
                    | Some(UnorderedListLevel)
                    | Some(ListElement)
            ),
            Footnote | Endnote | Comment => parent.map(Container::is_text_block).unwrap_or(false)
                || parent == Some(Span),
            TextBox => parent == Some(Frame),
            Table => !matches!(
                parent,
                None | Some(Document)
                    | Some(PageSpan)
                    | Some(Paragraph)
                    | Some(Span)
                    | Some(Table)
                    | Some(TableRow)
                    | Some(OrderedListLevel)
                    | Some(UnorderedListLevel)
            ),
            Frame => !matches!(
                parent,
                None | Some(Document) | Some(Table) | Some(TableRow) | Some(Frame)
            ),
        }
    }

    fn open(&mut self, event: &'static str, container: Container) {
        let parent = self.top();
        if parent == Some(container) && !container.is_list_level() {
            self.report(event, format!("{} opened inside another {}", container, container));
        } else if !Self::parent_ok(container, parent) {
            let message = match parent {
                Some(p) => format!("{} not allowed inside {}", container, p),
                None => format!("{} opened outside any container", container),
            };
            self.report(event, message);
        }
        self.stack.push(container);
        self.index += 1;
    }

    fn close(&mut self, event: &'static str, container: Container) {
        match self.top() {
            Some(top) if top == container => {
                self.stack.pop();
            }
            Some(top) => {
                self.report(event, format!("closes {} but {} is open", container, top));
                if let Some(pos) = self.stack.iter().rposition(|c| *c == container) {
                    self.stack.truncate(pos);
                }
            }
            None => self.report(event, format!("closes {} but nothing is open", container)),
        }
        self.index += 1;
    }

    fn leaf(&mut self, event: &'static str, allowed: &[Container]) {
        let parent = self.top();
        if !parent.map(|p| allowed.contains(&p)).unwrap_or(false) {
            let message = match parent {
                Some(p) => format!("not allowed inside {}", p),
                None => "outside any container".to_string(),
            };
            self.report(event, message);
        }
        self.index += 1;
    }
}

impl DocumentSink for NestingValidator {
    fn set_document_metadata(&mut self, _metadata: &DocumentMetadata) {
        if !self.stack.is_empty() {
            self.report("set_document_metadata", "sent after open_document".to_string());
        }
        self.index += 1;
    }

    fn open_document(&mut self) {
        self.open("open_document", Container::Document);
    }

    fn close_document(&mut self) {
        self.close("close_document", Container::Document);
    }

    fn open_page_span(&mut self, _props: &PageSpanProperties) {
        self.open("open_page_span", Container::PageSpan);
    }

    fn close_page_span(&mut self) {
        self.close("close_page_span", Container::PageSpan);
    }

    fn open_header(&mut self, _props: &HeaderFooterProperties) {
        self.open("open_header", Container::Header);
    }

    fn close_header(&mut self) {
        self.close("close_header", Container::Header);
    }

    fn open_footer(&mut self, _props: &HeaderFooterProperties) {
        self.open("open_footer", Container::Footer);
    }

    fn close_footer(&mut self) {
        self.close("close_footer", Container::Footer);
    }

    fn open_section(&mut self, _props: &SectionProperties) {
        self.open("open_section", Container::Section);
    }

    fn close_section(&mut self) {
        self.close("close_section", Container::Section);
    }

    fn open_paragraph(&mut self, _props: &ParagraphProperties) {
        self.open("open_paragraph", Container::Paragraph);
    }

    fn close_paragraph(&mut self) {
        self.close("close_paragraph", Container::Paragraph);
    }

    fn open_span(&mut self, _props: &SpanProperties) {
        self.open("open_span", Container::Span);
    }

    fn close_span(&mut self) {
        self.close("close_span", Container::Span);
    }

    fn insert_text(&mut self, _text: &str) {
        self.leaf("insert_text", &[Container::Span]);
    }

    fn insert_space(&mut self) {
        self.leaf("insert_space", &[Container::Span]);
    }

    fn insert_tab(&mut self) {
        self.leaf("insert_tab", &[Container::Span]);
    }

    fn insert_line_break(&mut self) {
        self.leaf("insert_line_break", &[Container::Span]);
    }

    fn define_list_level(&mut self, _props: &ListLevelProperties) {
        self.index += 1;
    }

    fn open_ordered_list_level(&mut self, _props: &ListLevelProperties) {
        self.open("open_ordered_list_level", Container::OrderedListLevel);
    }

    fn close_ordered_list_level(&mut self) {
        self.close("close_ordered_list_level", Container::OrderedListLevel);
    }

    fn open_unordered_list_level(&mut self, _props: &ListLevelProperties) {
        self.open("open_unordered_list_level", Container::UnorderedListLevel);
    }

    fn close_unordered_list_level(&mut self) {
        self.close("close_unordered_list_level", Container::UnorderedListLevel);
    }

    fn open_list_element(&mut self, _props: &ParagraphProperties) {
        self.open("open_list_element", Container::ListElement);
    }

    fn close_list_element(&mut self) {
        self.close("close_list_element", Container::ListElement);
    }

    fn open_footnote(&mut self, _props: &NoteProperties) {
        self.open("open_footnote", Container::Footnote);
    }

    fn close_footnote(&mut self) {
        self.close("close_footnote", Container::Footnote);
    }

    fn open_endnote(&mut self, _props: &NoteProperties) {
        self.open("open_endnote", Container::Endnote);
    }

    fn close_endnote(&mut self) {
        self.close("close_endnote", Container::Endnote);
    }

    fn open_comment(&mut self) {
        self.open("open_comment", Container::Comment);
    }

    fn close_comment(&mut self) {
        self.close("close_comment", Container::Comment);
    }

    fn open_text_box(&mut self) {
        self.open("open_text_box", Container::TextBox);
    }

    fn close_text_box(&mut self) {
        self.close("close_text_box", Container::TextBox);
    }

    fn open_table(&mut self, _props: &TableProperties) {
        self.open("open_table", Container::Table);
    }

    fn open_table_row(&mut self, _props: &RowProperties) {
        self.open("open_table_row", Container::TableRow);
    }

    fn open_table_cell(&mut self, _props: &CellProperties) {
        self.open("open_table_cell", Container::TableCell);
    }

    fn insert_covered_table_cell(&mut self, _props: &CellProperties) {
        self.leaf("insert_covered_table_cell", &[Container::TableRow]);
    }

    fn close_table_cell(&mut self) {
        self.close("close_table_cell", Container::TableCell);
    }

    fn close_table_row(&mut self) {
        self.close("close_table_row", Container::TableRow);
    }

    fn close_table(&mut self) {
        self.close("close_table", Container::Table);
    }

    fn open_frame(&mut self, _placement: &Placement, _style: &FrameStyle) {
        self.open("open_frame", Container::Frame);
    }

    fn close_frame(&mut self) {
        self.close("close_frame", Container::Frame);
    }

    fn insert_binary_object(&mut self, _object: &BinaryObject) {
        self.leaf("insert_binary_object", &[Container::Frame]);
    }

    fn insert_field(&mut self, _field: &FieldKind) {
        self.leaf("insert_field", &[Container::Span]);
    }
}
