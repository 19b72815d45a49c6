//! Locating the `resources/` directory bundled with the executable.

use std::path::{Path, PathBuf};

/// Name of the bundled directory.
pub const RESOURCE_DIR: &str = "resources";

/// The bundled `resources/` directory.
///
/// A packaged build keeps it next to the executable. When that directory
/// is missing (running from `target/` in a checkout), the crate's own copy
/// is used instead.
pub fn resource_path() -> PathBuf {
    let exe = std::env::current_exe()
        .map_err(|e| log::debug!("Cannot locate the executable: {}", e))
        .ok();
    resolve_resource_path(exe.as_deref())
}

/// Path of `filename` inside [`resource_path`]. The file may not exist.
pub fn resource_file<P: AsRef<Path>>(filename: P) -> PathBuf {
    resource_path().join(filename)
}

/// Resource directory for an executable at `exe`, with the checkout
/// fallback.
pub fn resolve_resource_path(exe: Option<&Path>) -> PathBuf {
    let bundled = exe
        .and_then(Path::parent)
        .map(|dir| dir.join(RESOURCE_DIR))
        .filter(|dir| dir.is_dir());

    bundled.unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join(RESOURCE_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resources_next_to_executable() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(RESOURCE_DIR)).unwrap();
        let exe = dir.path().join("docling-converter");

        assert_eq!(
            resolve_resource_path(Some(&exe)),
            dir.path().join(RESOURCE_DIR)
        );
    }

    #[test]
    fn test_falls_back_to_crate_directory() {
        let dir = tempdir().unwrap();
        let exe = dir.path().join("docling-converter");
        let expected = Path::new(env!("CARGO_MANIFEST_DIR")).join(RESOURCE_DIR);

        assert_eq!(resolve_resource_path(Some(&exe)), expected);
        assert_eq!(resolve_resource_path(None), expected);
    }

    #[test]
    fn test_bundled_readme_found() {
        assert!(resource_file("README.txt").is_file());
    }
}
