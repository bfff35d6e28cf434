//! Paragraph and span formatting properties.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};

use super::ListId;

/// Paragraph formatting, copied into the assembler on each paragraph.
///
/// Margins are in points, relative to the text area of the enclosing
/// section (or sub-document).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphProperties {
    /// Text justification
    pub justification: Justification,

    /// First line indent, relative to the left margin
    pub first_line_indent: f32,

    /// Left margin
    pub margin_left: f32,

    /// Right margin
    pub margin_right: f32,

    /// Space before the paragraph
    pub space_before: f32,

    /// Space after the paragraph
    pub space_after: f32,

    /// Line spacing
    pub line_spacing: LineSpacing,

    /// Tab stops, sorted by position
    pub tab_stops: Vec<TabStop>,

    /// Paragraph borders
    pub borders: BorderSet,

    /// Break flags
    pub breaks: BreakFlags,

    /// List membership (None or depth 0 = not a list item)
    pub list: Option<ListRef>,
}

impl ParagraphProperties {
    /// Create default paragraph properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set justification and return self.
    pub fn justified(mut self, justification: Justification) -> Self {
        self.justification = justification;
        self
    }

    /// Set margins (first line, left, right) and return self.
    pub fn with_margins(mut self, first_line: f32, left: f32, right: f32) -> Self {
        self.first_line_indent = first_line;
        self.margin_left = left;
        self.margin_right = right;
        self
    }

    /// Attach the paragraph to a list level and return self.
    pub fn in_list(mut self, id: ListId, depth: u8) -> Self {
        self.list = Some(ListRef { id, depth });
        self
    }

    /// Add a tab stop, keeping stops sorted by position.
    pub fn add_tab_stop(&mut self, stop: TabStop) {
        let idx = self
            .tab_stops
            .partition_point(|t| t.position <= stop.position);
        self.tab_stops.insert(idx, stop);
    }

    /// Requested list depth (0 when not in a list).
    pub fn list_depth(&self) -> u8 {
        self.list.map(|l| l.depth).unwrap_or(0)
    }

    /// Requested list id when the depth is non-zero.
    pub fn list_id(&self) -> Option<ListId> {
        self.list.filter(|l| l.depth > 0).map(|l| l.id)
    }
}

/// Reference from a paragraph to a level of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRef {
    /// List identity
    pub id: ListId,
    /// 1-indexed depth (0 = outside the list)
    pub depth: u8,
}

/// Text justification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Justification {
    /// Left alignment (default)
    #[default]
    Left,
    /// Center alignment
    Center,
    /// Right alignment
    Right,
    /// Justified, last line left
    Full,
    /// Justified including the last line
    FullAllLines,
}

/// Line spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum LineSpacing {
    /// Multiple of the font line height (1.0 = single)
    Proportional(f32),
    /// Fixed height in points
    Exact(f32),
    /// Minimum height in points
    AtLeast(f32),
}

impl Default for LineSpacing {
    fn default() -> Self {
        LineSpacing::Proportional(1.0)
    }
}

/// A tab stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabStop {
    /// Position in points from the left margin
    pub position: f32,
    /// Alignment of text at the stop
    pub alignment: TabAlignment,
    /// Leader character
    pub leader: Option<char>,
}

impl TabStop {
    /// Create a left-aligned tab stop without leader.
    pub fn left(position: f32) -> Self {
        Self {
            position,
            alignment: TabAlignment::Left,
            leader: None,
        }
    }
}

/// Tab stop alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabAlignment {
    #[default]
    Left,
    Center,
    Right,
    Decimal,
    Bar,
}

/// A single border line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    /// Line width in points
    pub width: f32,
    /// Line color
    pub color: Color,
    /// Line style
    pub style: BorderStyle,
}

/// Border line style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Double,
}

/// Borders on the four sides of a box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderSet {
    pub top: Option<Border>,
    pub bottom: Option<Border>,
    pub left: Option<Border>,
    pub right: Option<Border>,
}

impl BorderSet {
    /// Check if no side has a border.
    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }
}

/// Break flags carried by a paragraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakFlags {
    /// Start the paragraph on a new page
    pub page_before: bool,
    /// Start the paragraph in a new column
    pub column_before: bool,
    /// Keep on the same page as the next paragraph
    pub keep_with_next: bool,
}

/// An RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Black.
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    /// White.
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    /// Create a color from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Check if the color is black.
    pub fn is_black(&self) -> bool {
        *self == Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Character attribute bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextAttributes(u32);

impl TextAttributes {
    pub const NONE: TextAttributes = TextAttributes(0);
    pub const BOLD: TextAttributes = TextAttributes(1);
    pub const ITALIC: TextAttributes = TextAttributes(1 << 1);
    pub const UNDERLINE: TextAttributes = TextAttributes(1 << 2);
    pub const DOUBLE_UNDERLINE: TextAttributes = TextAttributes(1 << 3);
    pub const OVERLINE: TextAttributes = TextAttributes(1 << 4);
    pub const STRIKE_OUT: TextAttributes = TextAttributes(1 << 5);
    pub const SUPERSCRIPT: TextAttributes = TextAttributes(1 << 6);
    pub const SUBSCRIPT: TextAttributes = TextAttributes(1 << 7);
    pub const OUTLINE: TextAttributes = TextAttributes(1 << 8);
    pub const SHADOW: TextAttributes = TextAttributes(1 << 9);
    pub const SMALL_CAPS: TextAttributes = TextAttributes(1 << 10);
    pub const ALL_CAPS: TextAttributes = TextAttributes(1 << 11);
    pub const HIDDEN: TextAttributes = TextAttributes(1 << 12);
    pub const REVERSE_VIDEO: TextAttributes = TextAttributes(1 << 13);

    /// Attributes that must never decorate a tab character.
    pub const LINE_DECORATIONS: TextAttributes =
        TextAttributes(Self::UNDERLINE.0 | Self::DOUBLE_UNDERLINE.0 | Self::OVERLINE.0);

    /// Build from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        TextAttributes(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Check if every bit of `other` is set.
    pub fn contains(self, other: TextAttributes) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check if any bit of `other` is set.
    pub fn intersects(self, other: TextAttributes) -> bool {
        self.0 & other.0 != 0
    }

    /// Set the bits of `other`.
    pub fn insert(&mut self, other: TextAttributes) {
        self.0 |= other.0;
    }

    /// Clear the bits of `other`.
    pub fn remove(&mut self, other: TextAttributes) {
        self.0 &= !other.0;
    }

    /// Check if no bit is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TextAttributes {
    type Output = TextAttributes;

    fn bitor(self, rhs: Self) -> Self {
        TextAttributes(self.0 | rhs.0)
    }
}

impl BitAnd for TextAttributes {
    type Output = TextAttributes;

    fn bitand(self, rhs: Self) -> Self {
        TextAttributes(self.0 & rhs.0)
    }
}

impl Not for TextAttributes {
    type Output = TextAttributes;

    fn not(self) -> Self {
        TextAttributes(!self.0)
    }
}

/// Character formatting for a span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanProperties {
    /// Attribute bits
    pub attributes: TextAttributes,

    /// Font name
    pub font_name: Option<String>,

    /// Font size in points
    pub font_size: f32,

    /// Text color
    pub color: Color,

    /// Background/highlight color
    pub background: Option<Color>,

    /// Language tag (e.g., "en-US")
    pub language: Option<String>,
}

impl Default for SpanProperties {
    fn default() -> Self {
        Self {
            attributes: TextAttributes::NONE,
            font_name: None,
            font_size: 12.0,
            color: Color::BLACK,
            background: None,
            language: None,
        }
    }
}

impl SpanProperties {
    /// Create default span properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font and return self.
    pub fn with_font(mut self, name: impl Into<String>, size: f32) -> Self {
        self.font_name = Some(name.into());
        self.font_size = size;
        self
    }

    /// Set attribute bits and return self.
    pub fn with_attributes(mut self, attributes: TextAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Check if the span is underlined or overlined.
    pub fn has_line_decoration(&self) -> bool {
        self.attributes.intersects(TextAttributes::LINE_DECORATIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_attributes_bits() {
        let mut attrs = TextAttributes::BOLD | TextAttributes::UNDERLINE;
        assert!(attrs.contains(TextAttributes::BOLD));
        assert!(attrs.intersects(TextAttributes::LINE_DECORATIONS));

        attrs.remove(TextAttributes::LINE_DECORATIONS);
        assert_eq!(attrs, TextAttributes::BOLD);
        assert!(!attrs.intersects(TextAttributes::LINE_DECORATIONS));
    }

    #[test]
    fn test_tab_stops_sorted() {
        let mut props = ParagraphProperties::new();
        props.add_tab_stop(TabStop::left(144.0));
        props.add_tab_stop(TabStop::left(36.0));
        props.add_tab_stop(TabStop::left(72.0));
        let positions: Vec<f32> = props.tab_stops.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![36.0, 72.0, 144.0]);
    }

    #[test]
    fn test_list_ref() {
        let props = ParagraphProperties::new().in_list(ListId(3), 2);
        assert_eq!(props.list_depth(), 2);
        assert_eq!(props.list_id(), Some(ListId(3)));

        let flat = ParagraphProperties::new().in_list(ListId(3), 0);
        assert_eq!(flat.list_id(), None);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(255, 0, 16).to_string(), "#ff0010");
        assert!(Color::default().is_black());
    }

    #[test]
    fn test_span_serde_defaults() {
        let span: SpanProperties = serde_json::from_str(r#"{"attributes": 1}"#).unwrap();
        assert!(span.attributes.contains(TextAttributes::BOLD));
        assert_eq!(span.font_size, 12.0);
    }
}
