//! File I/O utilities.
//!
//! Reading helpers for the CLI and batch mode. I/O errors always bubble up as
//! `IngestError::Io`.

use crate::{IngestError, Result};
use std::path::{Path, PathBuf};

/// Read a file asynchronously.
///
/// # Errors
///
/// Returns `IngestError::Io` for I/O errors.
#[cfg(feature = "tokio-runtime")]
pub async fn read_file_async(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    tokio::fs::read(path.as_ref()).await.map_err(IngestError::Io)
}

/// Read a file synchronously.
///
/// # Errors
///
/// Returns `IngestError::Io` for I/O errors.
pub fn read_file_sync(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    std::fs::read(path.as_ref()).map_err(IngestError::Io)
}

/// Validate that a path exists and is a regular file.
///
/// # Errors
///
/// Returns `IngestError::Validation` otherwise.
pub fn validate_file_exists(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(IngestError::validation(format!("File does not exist: {}", path.display())));
    }
    Ok(())
}

/// List the files directly inside `dir` whose extension matches `extension`
/// (without the dot, case-insensitive), sorted by path.
///
/// # Errors
///
/// Returns `IngestError::Validation` if `dir` is not a directory and
/// `IngestError::Io` when it cannot be read.
pub fn list_files_with_extension(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(IngestError::validation(format!("Path is not a directory: {}", dir.display())));
    }

    let wanted = extension.trim_start_matches('.').to_ascii_lowercase();
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir).map_err(IngestError::Io)? {
        let path = entry.map_err(IngestError::Io)?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.to_ascii_lowercase() == wanted);

        if path.is_file() && matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
