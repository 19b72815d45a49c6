//! # docling-converter
//!
//! PDF to Markdown conversion with table structure recognition.
//!
//! A PDF is parsed into a page/block document model, tables are recovered
//! from column-aligned text in either a fast or an accurate mode, and the
//! model is rendered as Markdown.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docling_converter::{convert_file, save_markdown, ConvertOptions};
//!
//! fn main() -> docling_converter::Result<()> {
//!     let options = ConvertOptions::new().with_accurate_mode(true);
//!     let result = convert_file("document.pdf", &options)?;
//!     save_markdown(&result.content, "document.md", options.chunk_size)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Two table modes**: fast single-pass detection, or accurate detection
//!   with multi-line cells, bold header rows and numeric alignment
//! - **Structure preservation**: headings, paragraphs, lists, tables
//! - **Background conversion**: [`ConversionSession`] runs conversions on
//!   a worker thread and tracks status for a front end
//! - **Parallel processing**: pages are analyzed on the Rayon pool
//! - **Cleanup pipeline**: ligatures, hyphenation, page numbers, whitespace

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod render;
pub mod resources;
pub mod session;
pub mod validate;

// Re-export commonly used types
pub use convert::{
    convert_file, convert_pdf, setup_converter, ConversionResult, ConvertOptions,
    DocumentConverter, DocumentStream,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use model::{
    Alignment, Block, Document, ListInfo, ListStyle, Metadata, Outline, OutlineItem, Page,
    Paragraph, ParagraphStyle, Table, TableCell, TableRow, TextRun, TextStyle,
};
pub use output::{default_output_path, save_markdown, DEFAULT_CHUNK_SIZE};
pub use parser::{ErrorMode, ParseOptions, PdfParser, TableMode};
pub use render::{
    CleanupOptions, CleanupPreset, ExtractionStats, PageSelection, RenderOptions, RenderResult,
};
pub use resources::{resource_file, resource_path};
pub use session::{ConversionEvent, ConversionJob, ConversionSession};
pub use validate::validate_pdf_file;

#[cfg(feature = "async")]
pub use convert::convert_file_async;

use std::io::Read;
use std::path::Path;

/// Parse a PDF file into the document model.
///
/// # Example
///
/// ```no_run
/// use docling_converter::parse_file;
///
/// let doc = parse_file("document.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    PdfParser::open(path)?.parse()
}

/// Parse a PDF file with custom options.
///
/// ```no_run
/// use docling_converter::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient().accurate();
/// let doc = parse_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    PdfParser::open_with_options(path, options)?.parse()
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    PdfParser::from_bytes(data)?.parse()
}

pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    PdfParser::from_bytes_with_options(data, options)?.parse()
}

/// Parse a PDF from any reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    PdfParser::from_reader(reader)?.parse()
}

/// Plain text of a PDF file, without Markdown markup.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(parse_file(path)?.plain_text())
}

/// Convert a PDF to Markdown with default render options.
///
/// Unlike [`convert_file`], this skips the file checks and does not reject
/// blank output.
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_markdown(&doc, &RenderOptions::default())
}

/// Convert a PDF to Markdown with custom render options.
///
/// ```no_run
/// use docling_converter::{to_markdown_with_options, CleanupPreset, RenderOptions};
///
/// let options = RenderOptions::new()
///     .with_frontmatter(true)
///     .with_cleanup_preset(CleanupPreset::Aggressive);
/// let markdown = to_markdown_with_options("document.pdf", &options).unwrap();
/// ```
pub fn to_markdown_with_options<P: AsRef<Path>>(
    path: P,
    options: &RenderOptions,
) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_markdown(&doc, options)
}
