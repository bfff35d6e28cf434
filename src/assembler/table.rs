//! Table nesting guard.

/// Position inside a table, held by the frame pushed for the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableState {
    /// No table in this frame
    #[default]
    Closed,
    /// Table open, between rows
    Open,
    /// Row open, between cells
    RowOpen,
    /// Cell open
    CellOpen,
}

impl TableState {
    /// Check if a table is open in this frame.
    pub fn is_open(self) -> bool {
        self != TableState::Closed
    }

    /// Check if a row is open.
    pub fn row_open(self) -> bool {
        matches!(self, TableState::RowOpen | TableState::CellOpen)
    }

    /// Check if a cell is open.
    pub fn cell_open(self) -> bool {
        self == TableState::CellOpen
    }

    /// Check if content (text, paragraphs) may be emitted here.
    ///
    /// Inside a table, content is only legal within a cell.
    pub fn accepts_content(self) -> bool {
        matches!(self, TableState::Closed | TableState::CellOpen)
    }

    /// State after opening a row, if legal.
    pub fn open_row(self) -> Option<Self> {
        (self == TableState::Open).then_some(TableState::RowOpen)
    }

    /// State after opening a cell, if legal.
    pub fn open_cell(self) -> Option<Self> {
        (self == TableState::RowOpen).then_some(TableState::CellOpen)
    }

    /// State after closing a cell, if legal.
    pub fn close_cell(self) -> Option<Self> {
        (self == TableState::CellOpen).then_some(TableState::RowOpen)
    }

    /// State after closing a row, if legal.
    pub fn close_row(self) -> Option<Self> {
        (self == TableState::RowOpen).then_some(TableState::Open)
    }
}
