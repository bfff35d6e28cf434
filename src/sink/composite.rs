//! Fan-out sink.

use super::DocumentSink;
use crate::model::{
    BinaryObject, CellProperties, DocumentMetadata, FieldKind, FrameStyle,
    HeaderFooterProperties, ListLevelProperties, NoteProperties, PageSpanProperties,
    ParagraphProperties, Placement, RowProperties, SectionProperties, SpanProperties,
    TableProperties,
};

/// Sink that forwards every call to several sinks, in order.
///
/// ```
/// use unlegacy::sink::{CompositeSink, DocumentSink, RecordingSink, StatsSink};
///
/// let mut recording = RecordingSink::new();
/// let mut stats = StatsSink::new();
/// {
///     let mut both = CompositeSink::new()
///         .with_sink(&mut recording)
///         .with_sink(&mut stats);
///     both.insert_text("x");
/// }
/// assert_eq!(recording.text(), "x");
/// assert_eq!(stats.stats().char_count, 1);
/// ```
#[derive(Default)]
pub struct CompositeSink<'a> {
    sinks: Vec<&'a mut dyn DocumentSink>,
}

impl<'a> CompositeSink<'a> {
    /// Create a composite with no targets.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a target and return self.
    pub fn with_sink(mut self, sink: &'a mut dyn DocumentSink) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Add a target.
    pub fn push(&mut self, sink: &'a mut dyn DocumentSink) {
        self.sinks.push(sink);
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if there are no targets.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

macro_rules! fan_out {
    ($($name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            fn $name(&mut self, $($arg: $ty),*) {
                for sink in self.sinks.iter_mut() {
                    sink.$name($($arg),*);
                }
            }
        )*
    };
}

impl DocumentSink for CompositeSink<'_> {
    fan_out! {
        set_document_metadata(metadata: &DocumentMetadata);
        open_document();
        close_document();
        open_page_span(props: &PageSpanProperties);
        close_page_span();
        open_header(props: &HeaderFooterProperties);
        close_header();
        open_footer(props: &HeaderFooterProperties);
        close_footer();
        open_section(props: &SectionProperties);
        close_section();
        open_paragraph(props: &ParagraphProperties);
        close_paragraph();
        open_span(props: &SpanProperties);
        close_span();
        insert_text(text: &str);
        insert_space();
        insert_tab();
        insert_line_break();
        define_list_level(props: &ListLevelProperties);
        open_ordered_list_level(props: &ListLevelProperties);
        close_ordered_list_level();
        open_unordered_list_level(props: &ListLevelProperties);
        close_unordered_list_level();
        open_list_element(props: &ParagraphProperties);
        close_list_element();
        open_footnote(props: &NoteProperties);
        close_footnote();
        open_endnote(props: &NoteProperties);
        close_endnote();
        open_comment();
        close_comment();
        open_text_box();
        close_text_box();
        open_table(props: &TableProperties);
        open_table_row(props: &RowProperties);
        open_table_cell(props: &CellProperties);
        insert_covered_table_cell(props: &CellProperties);
        close_table_cell();
        close_table_row();
        close_table();
        open_frame(placement: &Placement, style: &FrameStyle);
        close_frame();
        insert_binary_object(object: &BinaryObject);
        insert_field(field: &FieldKind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;

    #[test]
    fn test_fan_out_preserves_order() {
        let mut a = RecordingSink::new();
        let mut b = RecordingSink::new();
        {
            let mut composite = CompositeSink::new().with_sink(&mut a).with_sink(&mut b);
            assert_eq!(composite.len(), 2);
            composite.open_paragraph(&ParagraphProperties::default());
            composite.insert_tab();
            composite.close_paragraph();
        }
        assert_eq!(a.events(), b.events());
        assert_eq!(a.names(), vec!["open_paragraph", "insert_tab", "close_paragraph"]);
    }

    #[test]
    fn test_empty_composite() {
        let mut composite = CompositeSink::new();
        assert!(composite.is_empty());
        composite.insert_text("dropped");
    }
}
