//! File I/O utilities with atomic writes
//!
//! Restored dumps are written through a temp file in the destination
//! directory and renamed into place, so a failure never leaves a partial
//! plaintext file behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{VaultError, VaultResult};

/// Write bytes to a file atomically (write to temp, then rename)
///
/// The temp file is created with owner-only permissions, which the final
/// file keeps. An existing file at `path` is replaced.
pub fn write_atomic(path: &Path, data: &[u8]) -> VaultResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|e| {
        VaultError::Io(format!(
            "Failed to create directory {}: {}",
            parent.display(),
            e
        ))
    })?;

    let mut temp = tempfile::Builder::new()
        .prefix(".dumpvault-")
        .suffix(".partial")
        .tempfile_in(parent)
        .map_err(|e| VaultError::Io(format!("Failed to create temp file: {}", e)))?;

    temp.write_all(data)
        .map_err(|e| VaultError::Io(format!("Failed to write data: {}", e)))?;

    temp.as_file()
        .sync_all()
        .map_err(|e| VaultError::Io(format!("Failed to sync data: {}", e)))?;

    // Dropping the temp file on error removes it
    temp.persist(path).map_err(|e| {
        VaultError::Io(format!(
            "Failed to move {} into place: {}",
            path.display(),
            e.error
        ))
    })?;

    Ok(())
}
