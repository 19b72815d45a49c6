//! Saving Markdown to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default write chunk size: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Extension appended when the target has none.
pub const MARKDOWN_EXTENSION: &str = "md";

/// Write `content` (trimmed) to `path` in `chunk_size` pieces.
///
/// Returns the path actually written, which gains a `.md` extension when
/// `path` has none. Missing parent directories are created. Empty content
/// is rejected with [`Error::NoContent`] before anything touches the disk.
pub fn save_markdown<P: AsRef<Path>>(
    content: &str,
    path: P,
    chunk_size: usize,
) -> Result<PathBuf> {
    let content = content.trim();
    if content.is_empty() {
        return Err(Error::NoContent);
    }

    let mut path = path.as_ref().to_path_buf();
    if path.extension().is_none() {
        path.set_extension(MARKDOWN_EXTENSION);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let chunk_size = if chunk_size == 0 {
        DEFAULT_CHUNK_SIZE
    } else {
        chunk_size
    };

    let mut writer = BufWriter::new(File::create(&path)?);
    for chunk in content.as_bytes().chunks(chunk_size) {
        writer.write_all(chunk)?;
    }
    writer.flush()?;

    log::info!("Markdown saved to: {}", path.display());
    Ok(path)
}

/// `input` with its extension replaced by `.md`.
pub fn default_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    input.as_ref().with_extension(MARKDOWN_EXTENSION)
}
