//! Parsing options and configuration.

use crate::render::PageSelection;

/// Options for turning a PDF into a [`Document`](crate::model::Document).
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Run table structure recognition at all
    pub table_structure: bool,

    /// Speed/fidelity trade-off for table recognition
    pub table_mode: TableMode,

    /// Analyze pages on the rayon pool
    pub parallel: bool,

    /// Which pages to convert
    pub pages: PageSelection,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Skip pages whose content cannot be read instead of failing.
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    pub fn with_table_structure(mut self, enabled: bool) -> Self {
        self.table_structure = enabled;
        self
    }

    pub fn with_table_mode(mut self, mode: TableMode) -> Self {
        self.table_mode = mode;
        self
    }

    /// Shorthand for [`TableMode::Accurate`].
    pub fn accurate(self) -> Self {
        self.with_table_mode(TableMode::Accurate)
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            table_structure: true,
            table_mode: TableMode::Fast,
            parallel: true,
            pages: PageSelection::All,
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Log and skip pages that cannot be read
    Lenient,
}

/// Table recognition mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    /// Single detection pass, first row as header
    #[default]
    Fast,
    /// Per-table column refinement, multi-line cells, bold header rows and
    /// numeric column alignment
    Accurate,
}

impl TableMode {
    pub fn from_accurate(accurate: bool) -> Self {
        if accurate {
            TableMode::Accurate
        } else {
            TableMode::Fast
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TableMode::Fast => "fast",
            TableMode::Accurate => "accurate",
        }
    }
}

impl std::fmt::Display for TableMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .lenient()
            .accurate()
            .with_table_structure(false)
            .sequential();

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.table_mode, TableMode::Accurate);
        assert!(!options.table_structure);
        assert!(!options.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.table_mode, TableMode::Fast);
        assert!(options.table_structure);
        assert!(options.parallel);
    }

    #[test]
    fn test_table_mode_from_flag() {
        assert_eq!(TableMode::from_accurate(true), TableMode::Accurate);
        assert_eq!(TableMode::from_accurate(false), TableMode::Fast);
        assert_eq!(TableMode::Accurate.to_string(), "accurate");
    }
}
