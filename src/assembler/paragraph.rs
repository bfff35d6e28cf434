//! Paragraph margin resolution.
//!
//! Decoders give margins relative to the text area they know about. The
//! sink expects them relative to the page text area, with list labels
//! already accounted for.

use crate::model::{ListLevel, ParagraphProperties, SectionProperties};

/// Margin shifts accumulated from the enclosing section or sub-document.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarginOffsets {
    /// Added to every left margin
    pub left: f32,
    /// Added to every right margin
    pub right: f32,
}

impl MarginOffsets {
    /// Offsets introduced by a section's extra margins.
    pub fn from_section(section: &SectionProperties) -> Self {
        Self {
            left: section.margin_left,
            right: section.margin_right,
        }
    }

    /// Check if both offsets are zero.
    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.right == 0.0
    }
}

/// Properties sent to the sink for a paragraph or list element.
///
/// A list element's left margin moves past the label area
/// (`label_indent + label_width`) and its first line moves back by the label
/// width so that the label hangs in front of the text.
pub fn resolve_margins(
    props: &ParagraphProperties,
    level: Option<&ListLevel>,
    offsets: MarginOffsets,
) -> ParagraphProperties {
    let mut resolved = props.clone();
    resolved.margin_left += offsets.left;
    resolved.margin_right += offsets.right;

    if let Some(level) = level {
        resolved.margin_left += level.label_indent + level.label_width;
        resolved.first_line_indent -= level.label_width;
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListLevelKind;

    #[test]
    fn test_plain_paragraph() {
        let props = ParagraphProperties::new().with_margins(10.0, 20.0, 5.0);
        let resolved = resolve_margins(&props, None, MarginOffsets::default());
        assert_eq!(resolved, props);
    }

    #[test]
    fn test_list_element_hangs_label() {
        let props = ParagraphProperties::new().with_margins(0.0, 36.0, 0.0);
        let level = ListLevel {
            label_indent: 6.0,
            label_width: 18.0,
            ..ListLevel::numbered(ListLevelKind::Decimal)
        };
        let resolved = resolve_margins(&props, Some(&level), MarginOffsets::default());
        assert_eq!(resolved.margin_left, 60.0);
        assert_eq!(resolved.first_line_indent, -18.0);
    }

    #[test]
    fn test_section_offsets() {
        let section = SectionProperties {
            margin_left: 12.0,
            margin_right: 8.0,
            ..Default::default()
        };
        let offsets = MarginOffsets::from_section(&section);
        assert!(!offsets.is_zero());

        let resolved = resolve_margins(&ParagraphProperties::new(), None, offsets);
        assert_eq!(resolved.margin_left, 12.0);
        assert_eq!(resolved.margin_right, 8.0);
    }
}
