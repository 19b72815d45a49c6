//! Error types for docling-converter.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while validating, converting or saving.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input path does not exist.
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The input path does not carry a `.pdf` extension.
    #[error("File is not a PDF: {}", .0.display())]
    NotPdf(PathBuf),

    /// The input file has zero length.
    #[error("PDF file is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    /// The file content is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// The converter produced no document.
    #[error("Conversion failed: No output generated")]
    NoOutput,

    /// The converter produced a document whose Markdown is blank.
    #[error("Conversion failed: Empty output")]
    EmptyOutput,

    /// Nothing to write when saving.
    #[error("No content to save")]
    NoContent,

    /// Error during Markdown or JSON rendering.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_validation_messages_carry_path() {
        let err = Error::NotFound(PathBuf::from("missing.pdf"));
        assert_eq!(err.to_string(), "File not found: missing.pdf");

        let err = Error::NotPdf(PathBuf::from("notes.txt"));
        assert_eq!(err.to_string(), "File is not a PDF: notes.txt");

        let err = Error::EmptyFile(PathBuf::from("blank.pdf"));
        assert_eq!(err.to_string(), "PDF file is empty: blank.pdf");
    }

    #[test]
    fn test_conversion_failure_messages() {
        assert_eq!(
            Error::NoOutput.to_string(),
            "Conversion failed: No output generated"
        );
        assert_eq!(
            Error::EmptyOutput.to_string(),
            "Conversion failed: Empty output"
        );
        assert_eq!(Error::NoContent.to_string(), "No content to save");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
