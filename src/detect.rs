//! PDF header sniffing.
//!
//! Extension checks live in [`crate::validate`]; this module looks at the
//! bytes themselves.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// What the file header says about the PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// Header version, e.g. "1.7".
    pub version: String,
    /// A `/Linearized` dictionary appears near the start of the file.
    pub linearized: bool,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)?;
        if self.linearized {
            write!(f, " (linearized)")?;
        }
        Ok(())
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;
/// The linearization dictionary must be the first object in the file.
const LINEARIZED_WINDOW: usize = 1024;
const LINEARIZED_KEY: &[u8] = b"/Linearized";

/// Sniff the header of a file on disk.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<PdfFormat> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(LINEARIZED_WINDOW);
    file.take(LINEARIZED_WINDOW as u64).read_to_end(&mut head)?;
    detect_format_from_bytes(&head)
}

/// Sniff the header of an in-memory PDF.
///
/// Returns [`Error::UnknownFormat`] when the magic is missing and
/// [`Error::UnsupportedVersion`] when the version is not `d.d`.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<PdfFormat> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    let window = &data[..data.len().min(LINEARIZED_WINDOW)];
    let linearized = window
        .windows(LINEARIZED_KEY.len())
        .any(|w| w == LINEARIZED_KEY);

    Ok(PdfFormat {
        version,
        linearized,
    })
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Whether the file at `path` starts with a PDF header.
pub fn is_pdf<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Whether `data` starts with a PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
