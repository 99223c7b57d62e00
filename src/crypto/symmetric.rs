//! AES-256-GCM encryption/decryption of dump payloads
//!
//! Every payload is sealed with a fresh key and a fresh 96-bit nonce. The
//! output token is self-describing: `nonce || ciphertext || tag`, so nothing
//! besides the key has to be stored next to it.

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{VaultError, VaultResult};

/// Size of the symmetric key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// An ephemeral symmetric key, zeroed when dropped
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: [u8; KEY_SIZE],
}

impl SymmetricKey {
    /// Generate a fresh random key from the OS RNG
    pub fn generate() -> Self {
        let mut key = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        Self { key }
    }

    /// Rebuild a key from unwrapped bytes; `None` if the length is wrong
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != KEY_SIZE {
            return None;
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Some(Self { key })
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Encrypt plaintext with AES-256-GCM, returning `nonce || ciphertext || tag`
pub fn seal(plaintext: &[u8], key: &SymmetricKey) -> VaultResult<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?;

    // Generate random nonce
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| VaultError::Crypto("AES-GCM encryption failed".to_string()))?;

    let mut token = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    token.extend_from_slice(&nonce_bytes);
    token.extend_from_slice(&ciphertext);
    Ok(token)
}

/// Decrypt a token produced by [`seal`]
///
/// Any authentication failure is reported as
/// [`VaultError::TamperedOrWrongKey`]; no partial plaintext is returned.
pub fn open(token: &[u8], key: &SymmetricKey) -> VaultResult<Vec<u8>> {
    if token.len() < NONCE_SIZE + TAG_SIZE {
        return Err(VaultError::TamperedOrWrongKey(format!(
            "ciphertext token is {} bytes, shorter than nonce and tag",
            token.len()
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| VaultError::Crypto(format!("Failed to create cipher: {}", e)))?;

    let (nonce_bytes, ciphertext) = token.split_at(NONCE_SIZE);
    let nonce = Nonce::from_slice(nonce_bytes);

    cipher.decrypt(nonce, ciphertext).map_err(|_| {
        VaultError::TamperedOrWrongKey(
            "authentication tag mismatch: data corrupted or key incorrect".to_string(),
        )
    })
}
