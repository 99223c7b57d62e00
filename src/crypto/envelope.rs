//! Envelope encryption: AES-256-GCM payload, RSA-OAEP wrapped key
//!
//! The encryptor seals one plaintext per call with a fresh symmetric key and
//! wraps that key for the recipient. The decryptor reverses it, and reports
//! a failed unwrap separately from a failed integrity check.

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::Oaep;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{VaultError, VaultResult};

use super::keys::{PrivateKeyHandle, RecipientKey};
use super::symmetric::{self, SymmetricKey, KEY_SIZE};

/// Output length of the OAEP hash (SHA-256)
pub const OAEP_HASH_LEN: usize = 32;

/// Smallest modulus, in bytes, that can wrap a [`KEY_SIZE`] key under OAEP-SHA256
pub const MIN_MODULUS_BYTES: usize = KEY_SIZE + 2 * OAEP_HASH_LEN + 2;

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

/// Check that a modulus of `modulus_bytes` can wrap a symmetric key
pub fn check_modulus(modulus_bytes: usize) -> VaultResult<()> {
    if modulus_bytes < MIN_MODULUS_BYTES {
        return Err(VaultError::Crypto(format!(
            "RSA key of {} bits is too small to wrap a {}-bit key with OAEP-SHA256 (needs at least {} bits)",
            modulus_bytes * 8,
            KEY_SIZE * 8,
            MIN_MODULUS_BYTES * 8
        )));
    }
    Ok(())
}

/// Ciphertext and wrapped key for one database
///
/// Immutable once built. That `wrapped_key` unwraps to the key that opens
/// `ciphertext` is only verified at restore time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    base_name: String,
    ciphertext: Vec<u8>,
    wrapped_key: Vec<u8>,
}

impl Envelope {
    /// Reassemble an envelope from archive entries
    pub fn from_parts(
        base_name: impl Into<String>,
        ciphertext: Vec<u8>,
        wrapped_key: Vec<u8>,
    ) -> Self {
        Self {
            base_name: base_name.into(),
            ciphertext,
            wrapped_key,
        }
    }

    /// Base name used for archive entry naming
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Self-describing AES-GCM token
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// RSA-OAEP wrapped symmetric key
    pub fn wrapped_key(&self) -> &[u8] {
        &self.wrapped_key
    }
}

/// Seals plaintexts for one recipient
#[derive(Debug, Clone)]
pub struct EnvelopeEncryptor {
    recipient: RecipientKey,
}

impl EnvelopeEncryptor {
    /// Create an encryptor, rejecting keys too small to wrap a symmetric key
    pub fn new(recipient: RecipientKey) -> VaultResult<Self> {
        check_modulus(recipient.modulus_bytes())?;
        Ok(Self { recipient })
    }

    /// Encrypt `plaintext` under a fresh key and wrap the key
    pub fn seal(&self, base_name: &str, plaintext: &[u8]) -> VaultResult<Envelope> {
        check_modulus(self.recipient.rsa().size())?;

        let key = SymmetricKey::generate();
        let ciphertext = symmetric::seal(plaintext, &key)?;

        let wrapped_key = self
            .recipient
            .rsa()
            .encrypt(&mut OsRng, oaep(), key.as_bytes())
            .map_err(|e| VaultError::Crypto(format!("RSA-OAEP key wrap failed: {}", e)))?;

        Ok(Envelope {
            base_name: base_name.to_string(),
            ciphertext,
            wrapped_key,
        })
    }
}

/// Opens envelopes with the matching private key
#[derive(Debug)]
pub struct EnvelopeDecryptor {
    private_key: PrivateKeyHandle,
}

impl EnvelopeDecryptor {
    pub fn new(private_key: PrivateKeyHandle) -> Self {
        Self { private_key }
    }

    /// Recover the symmetric key from its wrapped form
    pub fn unwrap_key(&self, wrapped_key: &[u8]) -> VaultResult<SymmetricKey> {
        let unwrapped = Zeroizing::new(
            self.private_key
                .rsa()
                .decrypt(oaep(), wrapped_key)
                .map_err(|_| {
                    VaultError::KeyUnwrap(
                        "RSA-OAEP unwrap failed: wrong private key or corrupted key entry"
                            .to_string(),
                    )
                })?,
        );

        SymmetricKey::from_slice(&unwrapped).ok_or_else(|| {
            VaultError::KeyUnwrap(format!(
                "unwrapped key is {} bytes, expected {}",
                unwrapped.len(),
                KEY_SIZE
            ))
        })
    }

    /// Authenticate and decrypt a ciphertext token with an unwrapped key
    pub fn decrypt(&self, ciphertext: &[u8], key: &SymmetricKey) -> VaultResult<Vec<u8>> {
        symmetric::open(ciphertext, key)
    }

    /// Unwrap then decrypt; no decryption is attempted if the unwrap fails
    pub fn open(&self, wrapped_key: &[u8], ciphertext: &[u8]) -> VaultResult<Vec<u8>> {
        let key = self.unwrap_key(wrapped_key)?;
        self.decrypt(ciphertext, &key)
    }

    /// Open a whole [`Envelope`]
    pub fn open_envelope(&self, envelope: &Envelope) -> VaultResult<Vec<u8>> {
        self.open(envelope.wrapped_key(), envelope.ciphertext())
    }
}
