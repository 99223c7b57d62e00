//! Database dumping
//!
//! The backup pipeline only needs "give me the bytes of a portable dump of
//! this database". [`Dumper`] is that seam; [`SqliteDumper`] is the shipped
//! implementation.

pub mod sqlite;

use std::path::{Path, PathBuf};

use crate::error::{VaultError, VaultResult};

pub use sqlite::SqliteDumper;

/// One database scheduled for backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRecord {
    path: PathBuf,
    base_name: String,
}

impl DatabaseRecord {
    /// Build a record from an absolute path; the base name is its file name
    pub fn from_path(path: impl Into<PathBuf>) -> VaultResult<Self> {
        let path = path.into();
        let base_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                VaultError::Config(format!("Database path has no file name: {}", path.display()))
            })?;

        Ok(Self { path, base_name })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used to name archive entries
    pub fn base_name(&self) -> &str {
        &self.base_name
    }
}

/// Produces a plaintext dump of a database
///
/// Implementations must be shareable across worker threads; errors are
/// reported as [`VaultError::Dump`] so the orchestrator can skip the item.
pub trait Dumper: Send + Sync {
    fn dump(&self, record: &DatabaseRecord) -> VaultResult<Vec<u8>>;
}
