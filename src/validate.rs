//! Pre-conversion checks on the input path.

use std::path::Path;

use crate::error::{Error, Result};

/// Check that `path` names an existing, non-empty file with a `.pdf`
/// extension (any case).
///
/// Checks run in order: existence, extension, size. The file content is not
/// inspected; a mislabelled file is rejected later by the converter.
///
/// # Example
///
/// ```no_run
/// use docling_converter::validate_pdf_file;
///
/// validate_pdf_file("report.pdf")?;
/// # Ok::<(), docling_converter::Error>(())
/// ```
pub fn validate_pdf_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    if !has_pdf_extension(path) {
        return Err(Error::NotPdf(path.to_path_buf()));
    }

    if std::fs::metadata(path)?.len() == 0 {
        return Err(Error::EmptyFile(path.to_path_buf()));
    }

    Ok(())
}

/// Case-insensitive `.pdf` suffix test.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
