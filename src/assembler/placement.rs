//! Frame placement.
//!
//! Turns a decoded [`FramePosition`] into the absolute [`Placement`] sent to
//! the sink. Pure function of the position and the surrounding geometry.

use crate::model::{
    AnchorKind, FramePosition, HorizontalPlacement, PageGeometry, Placement, Point, RelativeTo,
    Size, VerticalPlacement,
};

use super::paragraph::MarginOffsets;

/// Geometry surrounding the anchor of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlacementContext {
    /// Geometry of the current page
    pub page: PageGeometry,

    /// Extra margins of the enclosing section
    pub section: MarginOffsets,

    /// Left margin of the anchoring paragraph
    pub paragraph_left: f32,

    /// Right margin of the anchoring paragraph
    pub paragraph_right: f32,

    /// Current page number, used when the position names no page
    pub page_number: u32,
}

impl PlacementContext {
    /// Width left for a paragraph-anchored frame.
    pub fn available_width(&self) -> f32 {
        (self.page.text_width()
            - self.section.left
            - self.section.right
            - self.paragraph_left
            - self.paragraph_right)
            .max(0.0)
    }
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Start,
    Center,
    End,
    Full,
}

impl From<HorizontalPlacement> for Rule {
    fn from(h: HorizontalPlacement) -> Self {
        match h {
            HorizontalPlacement::Left => Rule::Start,
            HorizontalPlacement::Center => Rule::Center,
            HorizontalPlacement::Right => Rule::End,
            HorizontalPlacement::Full => Rule::Full,
        }
    }
}

impl From<VerticalPlacement> for Rule {
    fn from(v: VerticalPlacement) -> Self {
        match v {
            VerticalPlacement::Top => Rule::Start,
            VerticalPlacement::Middle => Rule::Center,
            VerticalPlacement::Bottom => Rule::End,
            VerticalPlacement::Full => Rule::Full,
        }
    }
}

/// Corrupt geometry (NaN, infinities) counts as zero.
fn finite(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Position and extent along one axis, kept inside `[0, available]`.
fn place_axis(rule: Rule, origin: f32, size: f32, available: f32) -> (f32, f32) {
    let available = finite(available).max(0.0);
    let size = finite(size).clamp(0.0, available);
    let origin = finite(origin);
    let pos = match rule {
        Rule::Start => origin,
        Rule::Center => (available - size) / 2.0,
        Rule::End => available - size,
        Rule::Full => return (0.0, available),
    };
    (pos.clamp(0.0, available - size), size)
}

/// Compute the placement of a frame.
///
/// Page anchors are placed against the full page, paragraph and frame
/// anchors against the width left by page, section and paragraph margins.
/// Both are clamped to stay inside their area. Character anchors only
/// translate the origin relative to the line box or baseline.
pub fn place_frame(position: &FramePosition, ctx: &PlacementContext) -> Placement {
    let size = Size::new(finite(position.size.width), finite(position.size.height));
    let origin = Point::new(finite(position.origin.x), finite(position.origin.y));
    let mut placement = Placement {
        anchor: position.anchor,
        x: origin.x,
        y: origin.y,
        width: size.width,
        height: size.height,
        horizontal_relative_to: RelativeTo::Page,
        vertical_relative_to: RelativeTo::Page,
        horizontal: position.horizontal,
        vertical: position.vertical,
        wrapping: position.wrapping,
        page: None,
    };

    let (area_width, area_height, relative_to) = match position.anchor {
        AnchorKind::Page => {
            placement.page = Some(position.page.unwrap_or(ctx.page_number.max(1)));
            (ctx.page.form_width, ctx.page.form_length, RelativeTo::Page)
        }
        AnchorKind::Paragraph => (
            ctx.available_width(),
            ctx.page.text_height(),
            RelativeTo::Paragraph,
        ),
        AnchorKind::Frame => (
            ctx.available_width(),
            ctx.page.text_height(),
            RelativeTo::Frame,
        ),
        AnchorKind::Char => {
            placement.horizontal_relative_to = RelativeTo::Char;
            placement.vertical_relative_to = RelativeTo::Line;
            return placement;
        }
        AnchorKind::CharBaseLine => {
            placement.horizontal_relative_to = RelativeTo::Char;
            placement.vertical_relative_to = RelativeTo::Baseline;
            placement.y = origin.y - size.height;
            return placement;
        }
    };

    let (x, width) = place_axis(
        position.horizontal.into(),
        origin.x,
        size.width,
        area_width,
    );
    let (y, height) = place_axis(
        position.vertical.into(),
        origin.y,
        size.height,
        area_height,
    );
    placement.x = x;
    placement.y = y;
    placement.width = width;
    placement.height = height;
    placement.horizontal_relative_to = relative_to;
    placement.vertical_relative_to = relative_to;
    placement
}
