//! Table properties.

use serde::{Deserialize, Serialize};

use super::{BorderSet, Color, Justification};

/// Properties of a table passed to the sink on open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableProperties {
    /// Column widths in points
    pub column_widths: Vec<f32>,

    /// Table alignment within the text area
    pub alignment: Justification,

    /// Offset from the left margin in points
    pub left_offset: f32,
}

impl TableProperties {
    /// Create a table with the given column widths.
    pub fn with_columns(column_widths: Vec<f32>) -> Self {
        Self {
            column_widths,
            ..Default::default()
        }
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    /// Total width of all columns.
    pub fn total_width(&self) -> f32 {
        self.column_widths.iter().sum()
    }
}

/// Properties of a table row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowProperties {
    /// Row height in points (None = automatic)
    pub height: Option<f32>,

    /// Whether the row repeats as a header
    pub is_header: bool,
}

impl RowProperties {
    /// A header row.
    pub fn header() -> Self {
        Self {
            height: None,
            is_header: true,
        }
    }
}

/// Properties of a table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellProperties {
    /// 0-indexed column position
    pub column: u32,

    /// 0-indexed row position
    pub row: u32,

    /// Number of columns spanned
    pub column_span: u32,

    /// Number of rows spanned
    pub row_span: u32,

    /// Vertical alignment
    pub vertical_alignment: VerticalAlignment,

    /// Background color
    pub background: Option<Color>,

    /// Cell borders
    pub borders: BorderSet,
}

impl Default for CellProperties {
    fn default() -> Self {
        Self {
            column: 0,
            row: 0,
            column_span: 1,
            row_span: 1,
            vertical_alignment: VerticalAlignment::Top,
            background: None,
            borders: BorderSet::default(),
        }
    }
}

impl CellProperties {
    /// A cell at the given position.
    pub fn at(row: u32, column: u32) -> Self {
        Self {
            row,
            column,
            ..Default::default()
        }
    }

    /// Set spans and return self.
    pub fn spanning(mut self, row_span: u32, column_span: u32) -> Self {
        self.row_span = row_span.max(1);
        self.column_span = column_span.max(1);
        self
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.row_span > 1 || self.column_span > 1
    }
}

/// Vertical alignment for table cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    /// Top alignment
    #[default]
    Top,
    /// Middle/center alignment
    Middle,
    /// Bottom alignment
    Bottom,
}
