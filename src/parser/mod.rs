//! PDF parsing: content streams to positioned spans, spans to blocks and
//! tables, blocks to the document model.

pub mod backend;
mod extract;
mod layout;
mod markers;
mod metadata;
mod options;
mod pdf_parser;
mod table_detector;

pub use backend::{LopdfBackend, PdfBackend};
pub use extract::{spans_from_ops, SpanExtractor};
pub use layout::{BlockType, Column, FontStatistics, LayoutAnalyzer, TextBlock, TextLine, TextSpan};
pub use markers::{is_bullet_marker, is_number_marker, parse_list_marker};
pub use metadata::parse_pdf_date;
pub use options::{ErrorMode, ParseOptions, TableMode};
pub use pdf_parser::PdfParser;
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig, TableRowData};
