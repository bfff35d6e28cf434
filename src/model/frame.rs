//! Frame positioning types.

use serde::{Deserialize, Serialize};

use super::{BorderSet, Color};

/// What a frame is anchored to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    /// Absolute position on the page
    Page,
    /// Relative to the current paragraph
    #[default]
    Paragraph,
    /// Inline, relative to the current character's line box
    Char,
    /// Inline, sitting on the text baseline
    CharBaseLine,
    /// Relative to the enclosing frame
    Frame,
}

impl AnchorKind {
    /// Whether the anchor flows with the text of a paragraph.
    pub fn needs_paragraph(self) -> bool {
        matches!(self, AnchorKind::Paragraph | AnchorKind::Frame)
    }

    /// Whether the anchor is an inline character.
    pub fn is_inline(self) -> bool {
        matches!(self, AnchorKind::Char | AnchorKind::CharBaseLine)
    }
}

/// Horizontal placement rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalPlacement {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch over the whole available width
    Full,
}

/// Vertical placement rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalPlacement {
    #[default]
    Top,
    Middle,
    Bottom,
    /// Stretch over the whole available height
    Full,
}

/// How text flows around a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wrapping {
    #[default]
    None,
    Dynamic,
    RunThrough,
    Parallel,
}

/// A width/height pair in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An x/y pair in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Requested position of a frame, as decoded from the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramePosition {
    /// Anchor
    pub anchor: AnchorKind,

    /// Requested size
    pub size: Size,

    /// Offset from the anchor origin
    pub origin: Point,

    /// Horizontal rule
    pub horizontal: HorizontalPlacement,

    /// Vertical rule
    pub vertical: VerticalPlacement,

    /// Text wrapping
    pub wrapping: Wrapping,

    /// Page for page-anchored frames (1-indexed)
    pub page: Option<u32>,
}

impl FramePosition {
    /// A position with the given anchor and size, at the anchor origin.
    pub fn new(anchor: AnchorKind, size: Size) -> Self {
        Self {
            anchor,
            size,
            ..Default::default()
        }
    }

    /// Set the origin offset and return self.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.origin = Point::new(x, y);
        self
    }

    /// Set both placement rules and return self.
    pub fn placed(mut self, horizontal: HorizontalPlacement, vertical: VerticalPlacement) -> Self {
        self.horizontal = horizontal;
        self.vertical = vertical;
        self
    }
}

/// Visual style of a frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameStyle {
    /// Frame name, if the source names it
    pub name: Option<String>,

    /// Background color
    pub background: Option<Color>,

    /// Borders
    pub borders: BorderSet,
}

/// What a computed coordinate is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelativeTo {
    Page,
    PageContent,
    Paragraph,
    ParagraphContent,
    Frame,
    FrameContent,
    Char,
    Line,
    Baseline,
}

/// Computed frame placement passed to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Anchor the frame was placed against
    pub anchor: AnchorKind,

    /// Horizontal position
    pub x: f32,

    /// Vertical position
    pub y: f32,

    /// Final width
    pub width: f32,

    /// Final height
    pub height: f32,

    /// Reference of `x`
    pub horizontal_relative_to: RelativeTo,

    /// Reference of `y`
    pub vertical_relative_to: RelativeTo,

    /// Horizontal rule that produced `x`
    pub horizontal: HorizontalPlacement,

    /// Vertical rule that produced `y`
    pub vertical: VerticalPlacement,

    /// Text wrapping
    pub wrapping: Wrapping,

    /// Page for page-anchored frames
    pub page: Option<u32>,
}
