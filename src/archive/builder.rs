//! Archive writer
//!
//! Entries are streamed into a temp file next to the destination. Only
//! [`ArchiveBuilder::finish`] moves it into place, so a failed or abandoned
//! build never leaves a partial archive behind.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{EntryType, Header};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::crypto::Envelope;
use crate::error::{VaultError, VaultResult};

use super::manifest::Manifest;
use super::{is_valid_base_name, key_entry_name, sql_entry_name, MANIFEST_NAME};

/// Permission bits of every entry
const ENTRY_MODE: u32 = 0o600;

/// Writes one archive; single owner, not shared across threads
pub struct ArchiveBuilder {
    destination: PathBuf,
    tar: tar::Builder<GzEncoder<NamedTempFile>>,
    base_names: BTreeSet<String>,
    mtime: u64,
}

impl ArchiveBuilder {
    /// Start an archive that will end up at `destination`
    ///
    /// Creates the parent directory if needed. The destination itself is not
    /// touched until [`finish`](Self::finish).
    pub fn create(destination: &Path) -> VaultResult<Self> {
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        fs::create_dir_all(parent).map_err(|e| {
            VaultError::Archive(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;

        let temp = tempfile::Builder::new()
            .prefix(".dumpvault-")
            .suffix(".partial")
            .tempfile_in(parent)
            .map_err(|e| {
                VaultError::Archive(format!(
                    "Failed to create temp file in {}: {}",
                    parent.display(),
                    e
                ))
            })?;

        debug!(temp = %temp.path().display(), "Started archive");

        Ok(Self {
            destination: destination.to_path_buf(),
            tar: tar::Builder::new(GzEncoder::new(temp, Compression::default())),
            base_names: BTreeSet::new(),
            mtime: Utc::now().timestamp().max(0) as u64,
        })
    }

    /// Number of envelopes appended so far
    pub fn envelope_count(&self) -> usize {
        self.base_names.len()
    }

    /// Append `<base>.sql.enc` then `<base>.key.enc`
    pub fn append_envelope(&mut self, envelope: &Envelope) -> VaultResult<()> {
        let base = envelope.base_name();

        if !is_valid_base_name(base) {
            return Err(VaultError::Archive(format!(
                "Invalid base name for archive entry: {:?}",
                base
            )));
        }
        if self.base_names.contains(base) {
            return Err(VaultError::Archive(format!(
                "Duplicate base name in archive: {}",
                base
            )));
        }

        self.append_entry(&sql_entry_name(base), envelope.ciphertext())?;
        self.append_entry(&key_entry_name(base), envelope.wrapped_key())?;
        self.base_names.insert(base.to_string());

        debug!(
            base_name = base,
            ciphertext_bytes = envelope.ciphertext().len(),
            "Appended envelope"
        );
        Ok(())
    }

    fn append_entry(&mut self, name: &str, data: &[u8]) -> VaultResult<()> {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(data.len() as u64);
        header.set_mode(ENTRY_MODE);
        header.set_mtime(self.mtime);

        self.tar
            .append_data(&mut header, name, data)
            .map_err(|e| VaultError::Archive(format!("Failed to write entry {}: {}", name, e)))
    }

    /// Write the manifest, flush everything and move the archive into place
    ///
    /// An existing file at the destination is replaced atomically.
    pub fn finish(mut self, manifest: &Manifest) -> VaultResult<PathBuf> {
        let json = manifest.to_json()?;
        self.append_entry(MANIFEST_NAME, &json)?;

        let encoder = self
            .tar
            .into_inner()
            .map_err(|e| VaultError::Archive(format!("Failed to finalize tar stream: {}", e)))?;
        let temp = encoder
            .finish()
            .map_err(|e| VaultError::Archive(format!("Failed to finalize gzip stream: {}", e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| VaultError::Archive(format!("Failed to sync archive: {}", e)))?;

        temp.persist(&self.destination).map_err(|e| {
            VaultError::Archive(format!(
                "Failed to move archive into place at {}: {}",
                self.destination.display(),
                e.error
            ))
        })?;

        Ok(self.destination)
    }
}
