//! The conversion pipeline: validate, read, parse, export.
//!
//! # Example
//!
//! ```no_run
//! use docling_converter::convert::{convert_file, ConvertOptions};
//!
//! fn main() -> docling_converter::Result<()> {
//!     let options = ConvertOptions::new().with_accurate_mode(true);
//!     let result = convert_file("report.pdf", &options)?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

mod pdf;

pub use pdf::{ConversionResult, DocumentConverter, DocumentStream};

use std::path::Path;

use crate::error::{Error, Result};
use crate::output::DEFAULT_CHUNK_SIZE;
use crate::parser::{ParseOptions, TableMode};
use crate::render::{PageSelection, RenderOptions, RenderResult};
use crate::validate::validate_pdf_file;

/// Options for a whole conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub parse: ParseOptions,
    pub render: RenderOptions,
    /// Write chunk size when saving, in bytes
    pub chunk_size: usize,
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Accurate or fast table recognition.
    pub fn with_accurate_mode(mut self, accurate: bool) -> Self {
        self.parse.table_mode = TableMode::from_accurate(accurate);
        self
    }

    pub fn with_table_structure(mut self, enabled: bool) -> Self {
        self.parse.table_structure = enabled;
        self
    }

    /// Restrict both parsing and rendering to `pages`.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse.pages = pages.clone();
        self.render.page_selection = pages;
        self
    }

    /// Chunk size for saving; 0 selects the default.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        self
    }

    pub fn accurate_mode(&self) -> bool {
        self.parse.table_mode == TableMode::Accurate
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            render: RenderOptions::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Converter with table structure on and the table mode picked by
/// `accurate_mode`.
pub fn setup_converter(accurate_mode: bool) -> DocumentConverter {
    DocumentConverter::new(
        ConvertOptions::new()
            .with_table_structure(true)
            .with_accurate_mode(accurate_mode),
    )
}

/// Validate, read and convert one PDF file to Markdown.
pub fn convert_file<P: AsRef<Path>>(
    path: P,
    options: &ConvertOptions,
) -> Result<RenderResult> {
    let path = path.as_ref();
    validate_pdf_file(path)?;

    let stream = DocumentStream::from_path(path)?;
    let result = DocumentConverter::new(options.clone()).convert(stream)?;
    if result.document.pages.is_empty() {
        return Err(Error::NoOutput);
    }

    let rendered = result.export_to_markdown_with_stats()?;
    if rendered.is_empty() {
        return Err(Error::EmptyOutput);
    }
    Ok(rendered)
}

/// Markdown for `path` with default options and the given table mode.
pub fn convert_pdf<P: AsRef<Path>>(path: P, accurate_mode: bool) -> Result<String> {
    let options = ConvertOptions::new().with_accurate_mode(accurate_mode);
    convert_file(path, &options).map(|r| r.content)
}

/// [`convert_file`] on the blocking thread pool.
#[cfg(feature = "async")]
pub async fn convert_file_async<P: AsRef<Path>>(
    path: P,
    options: ConvertOptions,
) -> Result<RenderResult> {
    let path = path.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || convert_file(&path, &options))
        .await
        .map_err(|e| Error::Other(format!("Conversion task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new()
            .with_accurate_mode(true)
            .with_table_structure(false)
            .with_pages(PageSelection::Range(2..=3))
            .with_chunk_size(0);

        assert!(options.accurate_mode());
        assert!(!options.parse.table_structure);
        assert_eq!(options.parse.pages, PageSelection::Range(2..=3));
        assert_eq!(options.render.page_selection, PageSelection::Range(2..=3));
        assert_eq!(options.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_setup_converter_modes() {
        let fast = setup_converter(false);
        assert_eq!(fast.options().parse.table_mode, TableMode::Fast);
        assert!(fast.options().parse.table_structure);

        let accurate = setup_converter(true);
        assert_eq!(accurate.options().parse.table_mode, TableMode::Accurate);
    }

    #[test]
    fn test_convert_file_validation_errors() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing.pdf");
        assert!(matches!(
            convert_file(&missing, &ConvertOptions::new()),
            Err(Error::NotFound(_))
        ));

        let text = dir.path().join("notes.txt");
        fs::write(&text, "hello").unwrap();
        assert!(matches!(convert_pdf(&text, false), Err(Error::NotPdf(_))));

        let empty = dir.path().join("empty.pdf");
        fs::write(&empty, b"").unwrap();
        assert!(matches!(convert_pdf(&empty, true), Err(Error::EmptyFile(_))));
    }

    #[test]
    fn test_convert_file_rejects_non_pdf_content() {
        let dir = tempdir().unwrap();
        let fake = dir.path().join("fake.pdf");
        fs::write(&fake, "just some text").unwrap();
        assert!(matches!(
            convert_pdf(&fake, false),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_document_stream_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("input.pdf");
        fs::write(&path, b"%PDF-1.4").unwrap();
        let stream = DocumentStream::from_path(&path).unwrap();
        assert_eq!(stream.name, "input.pdf");
        assert_eq!(stream.bytes, b"%PDF-1.4");
    }
}
