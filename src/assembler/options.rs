//! Assembler options and configuration.

/// Options for a document assembly session.
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// Maximum nesting of sub-documents (deeper invocations are skipped)
    pub max_sub_document_depth: usize,

    /// NFC-normalize inserted text
    pub normalize_text: bool,

    /// What to do with page breaks requested inside a table
    pub table_page_breaks: TablePageBreaks,

    /// Emit runs of two or more spaces as a single `insert_space`
    pub collapse_space_runs: bool,

    /// Number of times a given warning is logged before being silenced
    pub warning_limit: u32,
}

impl AssemblerOptions {
    /// Create new assembler options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum sub-document nesting.
    pub fn with_max_sub_document_depth(mut self, depth: usize) -> Self {
        self.max_sub_document_depth = depth;
        self
    }

    /// Enable or disable NFC normalization of text.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize_text = normalize;
        self
    }

    /// Set the handling of page breaks inside tables.
    pub fn with_table_page_breaks(mut self, mode: TablePageBreaks) -> Self {
        self.table_page_breaks = mode;
        self
    }

    /// Enable or disable space-run collapsing.
    pub fn with_space_runs(mut self, collapse: bool) -> Self {
        self.collapse_space_runs = collapse;
        self
    }

    /// Set how many times each warning is logged.
    pub fn with_warning_limit(mut self, limit: u32) -> Self {
        self.warning_limit = limit;
        self
    }
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            max_sub_document_depth: 32,
            normalize_text: false,
            table_page_breaks: TablePageBreaks::Defer,
            collapse_space_runs: true,
            warning_limit: 1,
        }
    }
}

/// Handling of page breaks requested while a table is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TablePageBreaks {
    /// Apply the break once the outermost table closes
    #[default]
    Defer,
    /// Drop the break; the page counter still advances
    Suppress,
}
