//! Passphrase storage that is wiped on drop

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A key passphrase, zeroed when dropped and never printed
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Bytes handed to the PKCS#8 and OpenSSH decryptors
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    /// A blank answer at the prompt means "give up"
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecureString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureString([REDACTED {} bytes])", self.inner.len())
    }
}
