//! File I/O utilities with atomic writes
//!
//! Provides the read/write/delete steps of a transform. Output is written to
//! a uniquely named temporary sibling, synced, then renamed, so the original
//! is only ever removed once the result is fully on disk.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{FilecryptError, FilecryptResult};

/// Confirm the source exists and is a regular file
pub fn ensure_source_file(path: &Path) -> FilecryptResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(FilecryptError::FileNotFound(path.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(FilecryptError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(FilecryptError::Io(format!(
            "Failed to access {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Read a whole file into memory
pub fn read_file(path: &Path) -> FilecryptResult<Vec<u8>> {
    fs::read(path)
        .map_err(|e| FilecryptError::Io(format!("Failed to read {}: {}", path.display(), e)))
}

/// Write bytes to a file atomically (write to temp, sync, then rename)
///
/// The temp file gets a unique name in the target's directory and is removed
/// if anything fails. An existing file at `path` is replaced.
pub fn write_atomic(path: &Path, data: &[u8]) -> FilecryptResult<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)
        .map_err(|e| FilecryptError::Io(format!("Failed to create temp file: {}", e)))?;

    temp.write_all(data)
        .and_then(|_| temp.flush())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| FilecryptError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

    temp.persist(path)
        .map_err(|e| FilecryptError::Io(format!("Failed to rename temp file: {}", e.error)))?;

    Ok(())
}

/// Delete the source once its replacement has been written
pub fn remove_original(original: &Path, output: &Path) -> FilecryptResult<()> {
    fs::remove_file(original).map_err(|e| FilecryptError::OriginalNotRemoved {
        original: original.to_path_buf(),
        output: output.to_path_buf(),
        reason: e.to_string(),
    })
}
