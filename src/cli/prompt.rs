//! Interactive passphrase prompt

use std::path::Path;

use crate::crypto::{PassphrasePrompt, SecureString};
use crate::error::{VaultError, VaultResult};

/// Reads a passphrase from the terminal without echo
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl PassphrasePrompt for TerminalPrompt {
    fn request_passphrase(&self, key_path: &Path) -> VaultResult<Option<SecureString>> {
        eprintln!("The private key at {} is password-protected.", key_path.display());

        let answer = rpassword::prompt_password("Enter private key passphrase (leave blank to abort): ")
            .map_err(|e| VaultError::KeyLoad(format!("Failed to read passphrase: {}", e)))?;

        let answer = SecureString::from(answer);
        if answer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(answer))
        }
    }
}
