//! PDF conversion: named byte stream in, document model out.

use std::path::Path;

use crate::error::Result;
use crate::model::Document;
use crate::parser::PdfParser;
use crate::render::{to_markdown, to_markdown_with_stats, RenderOptions, RenderResult};

use super::ConvertOptions;

/// A named, in-memory PDF.
#[derive(Debug, Clone)]
pub struct DocumentStream {
    /// Usually the file name
    pub name: String,
    pub bytes: Vec<u8>,
}

impl DocumentStream {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read the whole file; the stream is named after the file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// Converts PDF streams with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct DocumentConverter {
    options: ConvertOptions,
}

impl DocumentConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Sniff, parse and wrap the document for export.
    pub fn convert(&self, stream: DocumentStream) -> Result<ConversionResult> {
        log::info!(
            "Converting {} ({} table mode{})",
            stream.name,
            self.options.parse.table_mode,
            if self.options.parse.table_structure {
                ""
            } else {
                ", table structure off"
            }
        );

        let parser = PdfParser::from_bytes_with_options(&stream.bytes, self.options.parse.clone())?;
        let mut document = parser.parse()?;
        document.metadata.source = Some(stream.name.clone());

        log::info!(
            "{}: {} pages, {} tables",
            stream.name,
            document.page_count(),
            document.table_count()
        );

        Ok(ConversionResult {
            name: stream.name,
            document,
            render: self.options.render.clone(),
        })
    }
}

/// A converted document, ready for export.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub name: String,
    pub document: Document,
    render: RenderOptions,
}

impl ConversionResult {
    pub fn export_to_markdown(&self) -> Result<String> {
        to_markdown(&self.document, &self.render)
    }

    pub fn export_to_markdown_with_stats(&self) -> Result<RenderResult> {
        to_markdown_with_stats(&self.document, &self.render)
    }

    /// The document model as pretty-printed JSON.
    pub fn export_to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    pub fn render_options(&self) -> &RenderOptions {
        &self.render
    }
}
