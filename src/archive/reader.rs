//! Archive reader
//!
//! Reads every entry into memory, classifies it by name and pairs
//! ciphertexts with wrapped keys. Container corruption is fatal; odd
//! entries are reported as warnings and skipped.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::crypto::Envelope;
use crate::error::{VaultError, VaultResult};

use super::manifest::{Manifest, ManifestStatus, SUPPORTED_MAJOR};
use super::EntryKind;

/// Entries found for one base name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePair {
    pub base_name: String,
    pub ciphertext: Option<Vec<u8>>,
    pub wrapped_key: Option<Vec<u8>>,
}

impl ArchivePair {
    fn new(base_name: String) -> Self {
        Self {
            base_name,
            ciphertext: None,
            wrapped_key: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.ciphertext.is_some() && self.wrapped_key.is_some()
    }

    /// Turn a complete pair into an [`Envelope`]
    ///
    /// # Errors
    ///
    /// [`VaultError::IncompletePair`] naming the missing half.
    pub fn into_envelope(self) -> VaultResult<Envelope> {
        match (self.ciphertext, self.wrapped_key) {
            (Some(ciphertext), Some(wrapped_key)) => {
                Ok(Envelope::from_parts(self.base_name, ciphertext, wrapped_key))
            }
            (Some(_), None) => Err(VaultError::incomplete_pair(self.base_name, "wrapped key")),
            (None, Some(_)) => Err(VaultError::incomplete_pair(self.base_name, "ciphertext")),
            (None, None) => Err(VaultError::incomplete_pair(
                self.base_name,
                "ciphertext and wrapped key",
            )),
        }
    }
}

/// Name and size of an entry, for listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntryInfo {
    pub name: String,
    pub size: u64,
    pub kind: EntryKind,
}

/// Everything read from an archive
#[derive(Debug, Clone, Default)]
pub struct ArchiveContents {
    /// Pairs in base-name order
    pub pairs: Vec<ArchivePair>,
    pub manifest: ManifestStatus,
    /// Every regular-file entry, in archive order
    pub entries: Vec<ArchiveEntryInfo>,
    /// Skipped entries and manifest concerns
    pub warnings: Vec<String>,
}

impl ArchiveContents {
    pub fn complete_pairs(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_complete()).count()
    }
}

/// Opened archive, ready to be read
#[derive(Debug)]
pub struct ArchiveReader {
    path: PathBuf,
    file: File,
}

impl ArchiveReader {
    /// Open an archive file
    ///
    /// # Errors
    ///
    /// [`VaultError::Archive`] if the path is not a readable regular file.
    pub fn open(path: &Path) -> VaultResult<Self> {
        if !path.is_file() {
            return Err(VaultError::Archive(format!(
                "Archive file not found or is not a file: {}",
                path.display()
            )));
        }

        let file = File::open(path).map_err(|e| {
            VaultError::Archive(format!("Failed to open {}: {}", path.display(), e))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and pair every entry
    ///
    /// # Errors
    ///
    /// [`VaultError::Archive`] on gzip or tar corruption, or when the archive
    /// holds no encrypted database entries at all.
    pub fn read(self) -> VaultResult<ArchiveContents> {
        let path = self.path;
        let corrupt = |e: io::Error| {
            VaultError::Archive(format!("Failed to read archive {}: {}", path.display(), e))
        };

        let mut contents = ArchiveContents::default();
        let mut grouped: BTreeMap<String, ArchivePair> = BTreeMap::new();

        let mut archive = tar::Archive::new(GzDecoder::new(self.file));
        for entry in archive.entries().map_err(corrupt)? {
            let mut entry = entry.map_err(corrupt)?;
            let name = entry.path().map_err(corrupt)?.to_string_lossy().into_owned();

            if !entry.header().entry_type().is_file() {
                contents
                    .warnings
                    .push(format!("Skipping non-file entry: {}", name));
                continue;
            }

            // Header sizes are untrusted; compare against them, never allocate from them
            let declared = entry.size();
            let mut payload = Vec::new();
            entry.read_to_end(&mut payload).map_err(corrupt)?;
            if payload.len() as u64 != declared {
                return Err(VaultError::Archive(format!(
                    "Entry {} in {} is truncated: header declares {} bytes, found {}",
                    name,
                    path.display(),
                    declared,
                    payload.len()
                )));
            }

            let kind = EntryKind::classify(&name);
            contents.entries.push(ArchiveEntryInfo {
                name: name.clone(),
                size: payload.len() as u64,
                kind: kind.clone(),
            });

            match kind {
                EntryKind::Manifest => {
                    if contents.manifest.is_present() {
                        contents
                            .warnings
                            .push(format!("Skipping duplicate manifest entry: {}", name));
                        continue;
                    }
                    contents.manifest = match Manifest::from_json(&payload) {
                        Ok(manifest) => ManifestStatus::Parsed(manifest),
                        Err(e) => ManifestStatus::Unparseable(e.to_string()),
                    };
                }
                EntryKind::SqlCiphertext(base) => {
                    let pair = grouped
                        .entry(base.clone())
                        .or_insert_with(|| ArchivePair::new(base));
                    if pair.ciphertext.is_some() {
                        contents
                            .warnings
                            .push(format!("Skipping duplicate entry: {}", name));
                    } else {
                        pair.ciphertext = Some(payload);
                    }
                }
                EntryKind::WrappedKey(base) => {
                    let pair = grouped
                        .entry(base.clone())
                        .or_insert_with(|| ArchivePair::new(base));
                    if pair.wrapped_key.is_some() {
                        contents
                            .warnings
                            .push(format!("Skipping duplicate entry: {}", name));
                    } else {
                        pair.wrapped_key = Some(payload);
                    }
                }
                EntryKind::Unrecognized => {
                    contents
                        .warnings
                        .push(format!("Skipping unrecognized entry: {}", name));
                }
            }
        }

        // Drain to the end of the gzip stream so its checksum is verified
        io::copy(&mut archive.into_inner(), &mut io::sink()).map_err(corrupt)?;

        match &contents.manifest {
            ManifestStatus::Parsed(manifest) if !manifest.is_supported() => {
                contents.warnings.push(format!(
                    "Manifest version {} is not {}.x; restoring with the current scheme",
                    manifest.version, SUPPORTED_MAJOR
                ));
            }
            ManifestStatus::Unparseable(reason) => {
                contents
                    .warnings
                    .push(format!("Could not parse manifest.json: {}", reason));
            }
            _ => {}
        }

        if grouped.is_empty() {
            return Err(VaultError::Archive(format!(
                "No encrypted database entries found in {}",
                path.display()
            )));
        }

        contents.pairs = grouped.into_values().collect();
        Ok(contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    use crate::archive::ArchiveBuilder;

    /// Write a tar.gz with arbitrary entry names, bypassing the path checks
    /// of both the tar crate and the builder
    fn raw_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut tar = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, data) in entries {
            let mut header = tar::Header::new_old();
            header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(data.len() as u64);
            header.set_mode(0o600);
            header.set_cksum();
            tar.append(&header, *data).unwrap();
        }
        tar.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_read_builder_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("b.tar.gz");

        let mut builder = ArchiveBuilder::create(&path).unwrap();
        builder
            .append_envelope(&Envelope::from_parts("z.db", vec![1], vec![2]))
            .unwrap();
        builder
            .append_envelope(&Envelope::from_parts("a.db", vec![3], vec![4]))
            .unwrap();
        builder.finish(&Manifest::current()).unwrap();

        let contents = ArchiveReader::open(&path).unwrap().read().unwrap();
        let bases: Vec<&str> = contents.pairs.iter().map(|p| p.base_name.as_str()).collect();
        assert_eq!(bases, vec!["a.db", "z.db"]);
        assert_eq!(contents.complete_pairs(), 2);
        assert_eq!(contents.entries.len(), 5);
        assert!(contents.warnings.is_empty());
        assert!(matches!(contents.manifest, ManifestStatus::Parsed(_)));

        let envelope = contents.pairs[0].clone().into_envelope().unwrap();
        assert_eq!(envelope.ciphertext(), &[3]);
        assert_eq!(envelope.wrapped_key(), &[4]);
    }

    #[test]
    fn test_missing_halves() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.tar.gz");
        raw_archive(
            &path,
            &[("only-sql.db.sql.enc", b"c"), ("only-key.db.key.enc", b"k")],
        );

        let contents = ArchiveReader::open(&path).unwrap().read().unwrap();
        assert_eq!(contents.pairs.len(), 2);
        assert_eq!(contents.complete_pairs(), 0);
        assert_eq!(contents.manifest, ManifestStatus::Absent);

        let errors: Vec<VaultError> = contents
            .pairs
            .into_iter()
            .map(|p| p.into_envelope().unwrap_err())
            .collect();
        assert!(matches!(
            &errors[0],
            VaultError::IncompletePair { base_name, missing: "ciphertext" } if base_name == "only-key.db"
        ));
        assert!(matches!(
            &errors[1],
            VaultError::IncompletePair { base_name, missing: "wrapped key" } if base_name == "only-sql.db"
        ));
    }

    #[test]
    fn test_unrecognized_and_duplicate_entries_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("r.tar.gz");
        raw_archive(
            &path,
            &[
                ("notes.txt", b"hello"),
                ("a.db.sql.enc", b"first"),
                ("a.db.key.enc", b"key"),
                ("a.db.sql.enc", b"second"),
                ("../../escape.sql.enc", b"evil"),
            ],
        );

        let contents = ArchiveReader::open(&path).unwrap().read().unwrap();
        assert_eq!(contents.pairs.len(), 1);
        assert_eq!(contents.pairs[0].ciphertext.as_deref(), Some(&b"first"[..]));
        assert_eq!(contents.warnings.len(), 3);
    }

    #[test]
    fn test_unparseable_and_old_manifest_warn() {
        let dir = TempDir::new().unwrap();

        let path = dir.path().join("bad.tar.gz");
        raw_archive(&path, &[("a.sql.enc", b"c"), ("a.key.enc", b"k"), ("manifest.json", b"{oops")]);
        let contents = ArchiveReader::open(&path).unwrap().read().unwrap();
        assert!(matches!(contents.manifest, ManifestStatus::Unparseable(_)));
        assert_eq!(contents.warnings.len(), 1);

        let old = br#"{"version":"1.1","tool":"t","encryption_info":"e","rsa_key_details":"r","aes_details":"a"}"#;
        let path = dir.path().join("old.tar.gz");
        raw_archive(&path, &[("a.sql.enc", b"c"), ("a.key.enc", b"k"), ("manifest.json", old)]);
        let contents = ArchiveReader::open(&path).unwrap().read().unwrap();
        assert!(matches!(contents.manifest, ManifestStatus::Parsed(_)));
        assert!(contents.warnings[0].contains("1.1"));
    }

    #[test]
    fn test_no_database_entries_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.tar.gz");
        raw_archive(&path, &[("manifest.json", b"{}")]);

        let result = ArchiveReader::open(&path).unwrap().read();
        assert!(matches!(result, Err(VaultError::Archive(_))));
    }

    #[test]
    fn test_corrupt_archive_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.tar.gz");
        fs::write(&path, b"this is not gzip at all").unwrap();

        let result = ArchiveReader::open(&path).unwrap().read();
        assert!(matches!(result, Err(VaultError::Archive(_))));
    }

    #[test]
    fn test_truncated_archive_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.tar.gz");
        let big: Vec<u8> = (0..50_000u32).map(|i| (i * 7919 % 256) as u8).collect();
        raw_archive(&path, &[("a.sql.enc", &big), ("a.key.enc", b"k")]);

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let result = ArchiveReader::open(&path).unwrap().read();
        assert!(matches!(result, Err(VaultError::Archive(_))));
    }

    #[test]
    fn test_oversized_entry_header_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.tar.gz");

        let mut header = tar::Header::new_gnu();
        header.set_path("a.db.sql.enc").unwrap();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(1u64 << 62);
        header.set_mode(0o600);
        header.set_cksum();

        let mut gz = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
        gz.write_all(header.as_bytes()).unwrap();
        gz.write_all(&[0x5a; 512]).unwrap();
        gz.finish().unwrap();

        let result = ArchiveReader::open(&path).unwrap().read();
        assert!(matches!(result, Err(VaultError::Archive(_))));
    }

    #[test]
    fn test_double_dot_inside_base_name_is_paired() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dots.tar.gz");
        raw_archive(
            &path,
            &[
                ("report..2024.db.sql.enc", b"c"),
                ("report..2024.db.key.enc", b"k"),
            ],
        );

        let contents = ArchiveReader::open(&path).unwrap().read().unwrap();
        assert_eq!(contents.pairs.len(), 1);
        assert_eq!(contents.pairs[0].base_name, "report..2024.db");
        assert_eq!(contents.complete_pairs(), 1);
        assert!(contents.warnings.is_empty());
    }

    #[test]
    fn test_missing_archive() {
        let dir = TempDir::new().unwrap();
        let result = ArchiveReader::open(&dir.path().join("nope.tar.gz"));
        assert!(matches!(result, Err(VaultError::Archive(_))));
    }
}
