mod common;

use std::cell::Cell;
use std::fs;
use std::path::Path;

use rand::rngs::OsRng;
use ssh_key::private::{KeypairData, RsaKeypair};
use ssh_key::{LineEnding, PrivateKey};
use tempfile::TempDir;

use dumpvault::crypto::{
    load_private_key, load_public_key, EnvelopeDecryptor, EnvelopeEncryptor, KeyFormat, NoPrompt,
    PassphrasePrompt, SecureString,
};
use dumpvault::{VaultError, VaultResult};

use common::recipient;

fn openssh_private() -> PrivateKey {
    let keypair = RsaKeypair::try_from(recipient()).unwrap();
    PrivateKey::new(KeypairData::Rsa(keypair), "backup@host").unwrap()
}

struct CountingPrompt {
    answer: &'static str,
    calls: Cell<usize>,
}

impl PassphrasePrompt for CountingPrompt {
    fn request_passphrase(&self, _key_path: &Path) -> VaultResult<Option<SecureString>> {
        self.calls.set(self.calls.get() + 1);
        Ok(Some(SecureString::from(self.answer)))
    }
}

#[test]
fn unencrypted_openssh_private_key_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("id_rsa");
    fs::write(&path, openssh_private().to_openssh(LineEnding::LF).unwrap().as_bytes()).unwrap();

    let handle = load_private_key(&path, None, &NoPrompt).unwrap();
    assert_eq!(handle.format(), KeyFormat::OpenSsh);
    assert_eq!(handle.modulus_bits(), 2048);
}

#[test]
fn encrypted_openssh_key_prompts_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("id_rsa");
    let encrypted = openssh_private().encrypt(&mut OsRng, "correct horse").unwrap();
    fs::write(&path, encrypted.to_openssh(LineEnding::LF).unwrap().as_bytes()).unwrap();

    let prompt = CountingPrompt {
        answer: "correct horse",
        calls: Cell::new(0),
    };
    let handle = load_private_key(&path, None, &prompt).unwrap();
    assert_eq!(handle.format(), KeyFormat::OpenSsh);
    assert_eq!(prompt.calls.get(), 1);

    let wrong = CountingPrompt {
        answer: "battery staple",
        calls: Cell::new(0),
    };
    let result = load_private_key(&path, None, &wrong);
    assert!(matches!(result, Err(VaultError::KeyLoad(_))));
    assert_eq!(wrong.calls.get(), 1);

    let blank = load_private_key(&path, None, &NoPrompt);
    assert!(matches!(blank, Err(VaultError::KeyLoad(_))));
}

#[test]
fn openssh_public_key_wraps_for_openssh_private_key() {
    let dir = TempDir::new().unwrap();
    let private = openssh_private();

    let public_path = dir.path().join("id_rsa.pub");
    fs::write(&public_path, private.public_key().to_openssh().unwrap()).unwrap();
    let private_path = dir.path().join("id_rsa");
    fs::write(&private_path, private.to_openssh(LineEnding::LF).unwrap().as_bytes()).unwrap();

    let recipient_key = load_public_key(&public_path).unwrap();
    assert_eq!(recipient_key.format(), KeyFormat::OpenSshPublic);

    let envelope = EnvelopeEncryptor::new(recipient_key)
        .unwrap()
        .seal("app.db", b"BEGIN TRANSACTION;\nCOMMIT;\n")
        .unwrap();

    let handle = load_private_key(&private_path, None, &NoPrompt).unwrap();
    let plaintext = EnvelopeDecryptor::new(handle).open_envelope(&envelope).unwrap();
    assert_eq!(plaintext, b"BEGIN TRANSACTION;\nCOMMIT;\n");
}

#[test]
fn non_rsa_openssh_public_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("id_ed25519.pub");
    fs::write(
        &path,
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8g user@example.com\n",
    )
    .unwrap();

    assert!(matches!(
        load_public_key(&path),
        Err(VaultError::KeyLoad(_))
    ));
}
