//! Page span and section types.

use serde::{Deserialize, Serialize};

use crate::assembler::SubDocumentContent;

/// Geometry shared by every page of a span, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    /// Paper width
    pub form_width: f32,

    /// Paper length
    pub form_length: f32,

    /// Top margin
    pub margin_top: f32,

    /// Bottom margin
    pub margin_bottom: f32,

    /// Left margin
    pub margin_left: f32,

    /// Right margin
    pub margin_right: f32,

    /// Orientation
    pub orientation: Orientation,
}

impl PageGeometry {
    /// Create geometry with 1-inch margins.
    pub fn new(form_width: f32, form_length: f32) -> Self {
        Self {
            form_width,
            form_length,
            margin_top: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
            margin_right: 72.0,
            orientation: if form_width > form_length {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
        }
    }

    /// US Letter (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// A4 (210 x 297 mm).
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// Set all four margins and return self.
    pub fn with_margins(mut self, margin: f32) -> Self {
        self.margin_top = margin;
        self.margin_bottom = margin;
        self.margin_left = margin;
        self.margin_right = margin;
        self
    }

    /// Width of the text area between the left and right margins.
    pub fn text_width(&self) -> f32 {
        (self.form_width - self.margin_left - self.margin_right).max(0.0)
    }

    /// Height of the text area between the top and bottom margins.
    pub fn text_height(&self) -> f32 {
        (self.form_length - self.margin_top - self.margin_bottom).max(0.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Whether a header/footer block is a header or a footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFooterKind {
    Header,
    Footer,
}

/// Pages on which a header/footer is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occurrence {
    #[default]
    All,
    Odd,
    Even,
    First,
}

/// A header or footer attached to a page span.
#[derive(Debug, Clone)]
pub struct HeaderFooter {
    /// Header or footer
    pub kind: HeaderFooterKind,

    /// Pages on which it appears
    pub occurrence: Occurrence,

    /// Content, replayed when the page span opens
    pub content: Option<SubDocumentContent>,
}

impl HeaderFooter {
    /// Create a header shown on every page.
    pub fn header(content: SubDocumentContent) -> Self {
        Self {
            kind: HeaderFooterKind::Header,
            occurrence: Occurrence::All,
            content: Some(content),
        }
    }

    /// Create a footer shown on every page.
    pub fn footer(content: SubDocumentContent) -> Self {
        Self {
            kind: HeaderFooterKind::Footer,
            occurrence: Occurrence::All,
            content: Some(content),
        }
    }

    /// Set the occurrence and return self.
    pub fn on(mut self, occurrence: Occurrence) -> Self {
        self.occurrence = occurrence;
        self
    }
}

/// Properties of a header/footer passed to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFooterProperties {
    /// Pages on which it appears
    pub occurrence: Occurrence,
}

/// A run of one or more physical pages sharing geometry and header/footer
/// content.
#[derive(Debug, Clone)]
pub struct PageSpan {
    /// Page geometry
    pub geometry: PageGeometry,

    /// Headers and footers
    pub header_footers: Vec<HeaderFooter>,

    /// Number of physical pages covered (at least 1)
    pub page_count: u32,

    /// Page number printed on the first page, if the span restarts numbering
    pub page_number_start: Option<u32>,
}

impl PageSpan {
    /// Create a single-page span.
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            header_footers: Vec::new(),
            page_count: 1,
            page_number_start: None,
        }
    }

    /// Set the number of pages covered and return self.
    pub fn repeated(mut self, page_count: u32) -> Self {
        self.page_count = page_count.max(1);
        self
    }

    /// Add a header or footer and return self.
    pub fn with_header_footer(mut self, header_footer: HeaderFooter) -> Self {
        self.header_footers.push(header_footer);
        self
    }

    /// Serializable properties passed to the sink.
    pub fn properties(&self) -> PageSpanProperties {
        PageSpanProperties {
            geometry: self.geometry,
            page_count: self.page_count,
            page_number_start: self.page_number_start,
            has_header: self
                .header_footers
                .iter()
                .any(|h| h.kind == HeaderFooterKind::Header),
            has_footer: self
                .header_footers
                .iter()
                .any(|h| h.kind == HeaderFooterKind::Footer),
        }
    }
}

impl Default for PageSpan {
    fn default() -> Self {
        Self::new(PageGeometry::default())
    }
}

/// Page span properties passed to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSpanProperties {
    /// Page geometry
    pub geometry: PageGeometry,
    /// Number of physical pages covered
    pub page_count: u32,
    /// Restarted page number
    pub page_number_start: Option<u32>,
    /// Whether the span carries a header
    pub has_header: bool,
    /// Whether the span carries a footer
    pub has_footer: bool,
}

/// One text column of a section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column width in points
    pub width: f32,
    /// Gap after the column in points
    pub gap: f32,
}

/// Section properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionProperties {
    /// Columns (empty = single column spanning the text area)
    pub columns: Vec<Column>,

    /// Draw a line between columns
    pub column_separator: bool,

    /// Extra left margin added to the page margin
    pub margin_left: f32,

    /// Extra right margin added to the page margin
    pub margin_right: f32,

    /// Balance column lengths at the end of the section
    pub balance_columns: bool,
}

impl SectionProperties {
    /// Create `count` equal columns filling `total_width` with `gap` between them.
    pub fn equal_columns(count: usize, total_width: f32, gap: f32) -> Self {
        if count <= 1 {
            return Self::default();
        }
        let width = (total_width - gap * (count - 1) as f32) / count as f32;
        let columns = (0..count)
            .map(|i| Column {
                width,
                gap: if i + 1 == count { 0.0 } else { gap },
            })
            .collect();
        Self {
            columns,
            ..Default::default()
        }
    }

    /// Number of columns (at least 1).
    pub fn column_count(&self) -> usize {
        self.columns.len().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_text_area() {
        let geometry = PageGeometry::letter();
        assert_eq!(geometry.text_width(), 468.0);
        assert_eq!(geometry.text_height(), 648.0);
        assert_eq!(geometry.orientation, Orientation::Portrait);

        let landscape = PageGeometry::new(792.0, 612.0);
        assert_eq!(landscape.orientation, Orientation::Landscape);
    }

    #[test]
    fn test_page_span_repeat_floor() {
        let span = PageSpan::default().repeated(0);
        assert_eq!(span.page_count, 1);
        assert!(!span.properties().has_header);
    }

    #[test]
    fn test_equal_columns() {
        let section = SectionProperties::equal_columns(2, 468.0, 18.0);
        assert_eq!(section.column_count(), 2);
        assert_eq!(section.columns[0].width, 225.0);
        assert_eq!(section.columns[1].gap, 0.0);

        assert_eq!(SectionProperties::equal_columns(1, 468.0, 18.0).column_count(), 1);
    }
}
