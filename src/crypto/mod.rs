//! Cryptographic primitives for dumpvault
//!
//! Provides RSA key loading, AES-256-GCM payload encryption and the
//! envelope scheme that wraps a fresh AES key per database with RSA-OAEP.

pub mod envelope;
pub mod keys;
pub mod secure_memory;
pub mod symmetric;

pub use envelope::{Envelope, EnvelopeDecryptor, EnvelopeEncryptor, MIN_MODULUS_BYTES};
pub use keys::{
    load_private_key, load_public_key, KeyFormat, NoPrompt, PassphrasePrompt, PrivateKeyHandle,
    RecipientKey,
};
pub use secure_memory::SecureString;
pub use symmetric::SymmetricKey;
