//! Custom error types for dumpvault
//!
//! This module defines the closed error taxonomy used across the backup and
//! restore pipelines. Setup errors (`Config`, `KeyLoad`, `Archive`) abort a
//! run before any per-database work; per-item errors (`Dump`, `Crypto`,
//! `KeyUnwrap`, `TamperedOrWrongKey`, `IncompletePair`) are caught by the
//! batch orchestrator and recorded as skips.
//!
//! Messages are built from file names, format names and library error
//! classes only. Key bytes and passphrases never reach an error message.

use thiserror::Error;

/// The main error type for dumpvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Malformed input list, missing required file, bad option value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unreadable, unsupported or wrongly protected key file
    #[error("Key load error: {0}")]
    KeyLoad(String),

    /// Source database could not be dumped
    #[error("Dump of '{database}' failed: {reason}")]
    Dump { database: String, reason: String },

    /// Key too small to wrap, or encryption failure
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// The wrapped key could not be unwrapped (wrong private key or corrupted key entry)
    #[error("Key unwrap failed: {0}")]
    KeyUnwrap(String),

    /// The ciphertext failed authentication (tampered data or mismatched key)
    #[error("Integrity check failed: {0}")]
    TamperedOrWrongKey(String),

    /// An archive entry has no partner entry for the same base name
    #[error("Incomplete pair for '{base_name}': missing {missing}")]
    IncompletePair {
        base_name: String,
        missing: &'static str,
    },

    /// Corrupt or unreadable archive container
    #[error("Archive error: {0}")]
    Archive(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl VaultError {
    /// Create a dump error for a database
    pub fn dump(database: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Dump {
            database: database.into(),
            reason: reason.into(),
        }
    }

    /// Create an incomplete pair error
    pub fn incomplete_pair(base_name: impl Into<String>, missing: &'static str) -> Self {
        Self::IncompletePair {
            base_name: base_name.into(),
            missing,
        }
    }

    /// Short machine-friendly name of the error class
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::KeyLoad(_) => "key-load",
            Self::Dump { .. } => "dump",
            Self::Crypto(_) => "crypto",
            Self::KeyUnwrap(_) => "key-unwrap",
            Self::TamperedOrWrongKey(_) => "tampered-or-wrong-key",
            Self::IncompletePair { .. } => "incomplete-pair",
            Self::Archive(_) => "archive",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }

    /// Operator hint for the remediation of this error class
    pub fn remediation(&self) -> &'static str {
        match self {
            Self::KeyUnwrap(_) => "check that the private key matches the key used for backup",
            Self::TamperedOrWrongKey(_) => "the encrypted dump was modified or corrupted in transit",
            Self::IncompletePair { .. } => "the archive is missing an entry; re-create the backup",
            Self::Dump { .. } => "check that the database file is readable and not locked",
            Self::KeyLoad(_) => "check the key file format and passphrase",
            _ => "see the error message",
        }
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for dumpvault operations
pub type VaultResult<T> = Result<T, VaultError>;
