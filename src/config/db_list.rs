//! db-list file parsing
//!
//! A db-list is a JSON array of objects, each with a `path` field naming a
//! database file. Other fields are ignored:
//!
//! ```json
//! [
//!   { "path": "/srv/app/app.sqlite3", "name": "main" },
//!   { "path": "relative/cache.db" }
//! ]
//! ```
//!
//! Relative paths are resolved against the current working directory.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::dump::DatabaseRecord;
use crate::error::{VaultError, VaultResult};

/// Result of loading a db-list file
#[derive(Debug, Clone, Default)]
pub struct DbList {
    /// Databases that exist and will be backed up, in file order
    pub records: Vec<DatabaseRecord>,
    /// Listed paths that are missing or not regular files
    pub missing: Vec<PathBuf>,
}

/// Load and validate a db-list file
///
/// # Errors
///
/// Returns [`VaultError::Config`] if the file is absent, is not a JSON array
/// of objects with a string `path`, or lists no existing database.
pub fn load_db_list(path: &Path) -> VaultResult<DbList> {
    if !path.is_file() {
        return Err(VaultError::Config(format!(
            "db-list file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| VaultError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    let list = parse_db_list(&contents)?;
    if list.records.is_empty() {
        return Err(VaultError::Config(format!(
            "No valid database paths found in {}",
            path.display()
        )));
    }

    Ok(list)
}

/// One object in the db-list array
#[derive(Debug, Deserialize)]
struct DbEntry {
    path: String,
}

/// Parse db-list JSON text; performs the filesystem checks on each entry
pub fn parse_db_list(contents: &str) -> VaultResult<DbList> {
    let value: Value = serde_json::from_str(contents)
        .map_err(|e| VaultError::Config(format!("db-list is not valid JSON: {}", e)))?;

    let entries: Vec<Value> = match value {
        Value::Array(entries) => entries,
        _ => return Err(VaultError::Config("db-list must be a JSON array".into())),
    };

    let mut list = DbList::default();
    for (index, entry) in entries.into_iter().enumerate() {
        let entry: DbEntry = serde_json::from_value(entry).map_err(|e| {
            VaultError::Config(format!(
                "db-list entry {} must be an object with a string 'path' field ({})",
                index, e
            ))
        })?;

        let resolved = absolutize(Path::new(&entry.path));
        match fs::canonicalize(&resolved) {
            Ok(canonical) if canonical.is_file() => {
                list.records.push(DatabaseRecord::from_path(canonical)?);
            }
            _ => list.missing.push(resolved),
        }
    }

    Ok(list)
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}
