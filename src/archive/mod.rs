//! The encrypted backup container
//!
//! An archive is a gzip-compressed tar with, per database, a
//! `<base>.sql.enc` ciphertext entry and a `<base>.key.enc` wrapped key
//! entry, plus one `manifest.json` describing the scheme.

pub mod builder;
pub mod manifest;
pub mod reader;

pub use builder::ArchiveBuilder;
pub use manifest::{Manifest, ManifestStatus, MANIFEST_VERSION};
pub use reader::{ArchiveContents, ArchiveEntryInfo, ArchivePair, ArchiveReader};

/// Suffix of ciphertext entries
pub const SQL_SUFFIX: &str = ".sql.enc";

/// Suffix of wrapped key entries
pub const KEY_SUFFIX: &str = ".key.enc";

/// Name of the manifest entry
pub const MANIFEST_NAME: &str = "manifest.json";

/// What an archive entry holds, judged by its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    SqlCiphertext(String),
    WrappedKey(String),
    Manifest,
    Unrecognized,
}

impl EntryKind {
    /// Classify an entry name, stripping the suffix to get the base name
    ///
    /// Names whose base would be empty or could escape the output directory
    /// are [`EntryKind::Unrecognized`].
    pub fn classify(name: &str) -> Self {
        let name = name.strip_prefix("./").unwrap_or(name);

        if name == MANIFEST_NAME {
            return Self::Manifest;
        }

        let (base, kind): (&str, fn(String) -> Self) =
            if let Some(base) = name.strip_suffix(SQL_SUFFIX) {
                (base, Self::SqlCiphertext)
            } else if let Some(base) = name.strip_suffix(KEY_SUFFIX) {
                (base, Self::WrappedKey)
            } else {
                return Self::Unrecognized;
            };

        if is_valid_base_name(base) {
            kind(base.to_string())
        } else {
            Self::Unrecognized
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SqlCiphertext(_) => "ciphertext",
            Self::WrappedKey(_) => "wrapped key",
            Self::Manifest => "manifest",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// A base name is usable as a single file name component
pub fn is_valid_base_name(base: &str) -> bool {
    !base.is_empty()
        && !base.contains(['/', '\\', '\0'])
        && base != "."
        && base != ".."
}

/// `<base>.sql.enc`
pub fn sql_entry_name(base: &str) -> String {
    format!("{}{}", base, SQL_SUFFIX)
}

/// `<base>.key.enc`
pub fn key_entry_name(base: &str) -> String {
    format!("{}{}", base, KEY_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(
            EntryKind::classify("app.sqlite3.sql.enc"),
            EntryKind::SqlCiphertext("app.sqlite3".into())
        );
        assert_eq!(
            EntryKind::classify("app.sqlite3.key.enc"),
            EntryKind::WrappedKey("app.sqlite3".into())
        );
        assert_eq!(EntryKind::classify("manifest.json"), EntryKind::Manifest);
        assert_eq!(EntryKind::classify("./manifest.json"), EntryKind::Manifest);
        assert_eq!(EntryKind::classify("README.txt"), EntryKind::Unrecognized);
        assert_eq!(EntryKind::classify("app.sql"), EntryKind::Unrecognized);
    }

    #[test]
    fn test_classify_rejects_traversal() {
        for name in [
            "../evil.sql.enc",
            "nested/evil.key.enc",
            "..\\evil.sql.enc",
            ".sql.enc",
            "...key.enc",
            "/etc/passwd.sql.enc",
        ] {
            assert_eq!(EntryKind::classify(name), EntryKind::Unrecognized, "{}", name);
        }
    }

    #[test]
    fn test_double_dots_inside_name_allowed() {
        assert!(is_valid_base_name("report..2024.db"));
        assert!(is_valid_base_name("v1..2.sqlite"));
        assert!(!is_valid_base_name(".."));
        assert!(!is_valid_base_name("."));
        assert_eq!(
            EntryKind::classify("report..2024.db.sql.enc"),
            EntryKind::SqlCiphertext("report..2024.db".into())
        );
    }

    #[test]
    fn test_entry_names() {
        assert_eq!(sql_entry_name("a.db"), "a.db.sql.enc");
        assert_eq!(key_entry_name("a.db"), "a.db.key.enc");
    }

    #[test]
    fn test_valid_base_names() {
        assert!(is_valid_base_name("app.sqlite3"));
        assert!(is_valid_base_name("data-2024.db"));
        assert!(!is_valid_base_name(""));
        assert!(!is_valid_base_name("."));
        assert!(!is_valid_base_name("a/b"));
    }
}
