//! Archive manifest
//!
//! Advisory metadata describing how the archive was produced. Restore always
//! uses the fixed scheme; the manifest version is only checked to warn about
//! archives written by an incompatible release.

use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

/// Version written into new archives
pub const MANIFEST_VERSION: &str = "2.0";

/// Major version this release knows how to restore
pub const SUPPORTED_MAJOR: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub tool: String,
    pub encryption_info: String,
    pub rsa_key_details: String,
    pub aes_details: String,
}

impl Manifest {
    /// Manifest describing archives written by this build
    pub fn current() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            tool: format!("dumpvault {}", env!("CARGO_PKG_VERSION")),
            encryption_info: "Each .sql.enc entry is an AES-256-GCM token (nonce || ciphertext || tag). \
                              The matching .key.enc entry holds its AES key, wrapped with RSA-OAEP-SHA256."
                .to_string(),
            rsa_key_details: "RSA-OAEP with MGF1 (SHA256) and SHA256 hash for message, empty label."
                .to_string(),
            aes_details: "AES-256-GCM, 96-bit random nonce prepended, 128-bit tag appended".to_string(),
        }
    }

    /// Pretty-printed JSON bytes
    pub fn to_json(&self) -> VaultResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> VaultResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| VaultError::Json(format!("Failed to parse manifest: {}", e)))
    }

    /// Leading number of `version`, if it has one
    pub fn major_version(&self) -> Option<u32> {
        self.version.split('.').next()?.trim().parse().ok()
    }

    pub fn is_supported(&self) -> bool {
        self.major_version() == Some(SUPPORTED_MAJOR)
    }
}

/// What the reader found for `manifest.json`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ManifestStatus {
    #[default]
    Absent,
    Parsed(Manifest),
    Unparseable(String),
}

impl ManifestStatus {
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}
