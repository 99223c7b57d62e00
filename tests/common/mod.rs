#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use rand::rngs::OsRng;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;
use rusqlite::Connection;

/// A fresh 2048-bit keypair, generated once per test binary
pub fn recipient() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 2048).unwrap())
}

/// A second, unrelated 2048-bit keypair
pub fn stranger() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 2048).unwrap())
}

pub fn write_public_pem(dir: &Path, key: &RsaPrivateKey) -> PathBuf {
    let path = dir.join("recipient.pub.pem");
    fs::write(
        &path,
        key.to_public_key().to_public_key_pem(LineEnding::LF).unwrap(),
    )
    .unwrap();
    path
}

pub fn write_private_pem(dir: &Path, name: &str, key: &RsaPrivateKey) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, key.to_pkcs8_pem(LineEnding::LF).unwrap().as_bytes()).unwrap();
    path
}

/// A database with a single `people` row
pub fn single_row_db(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL, note BLOB);
         INSERT INTO people (name, note) VALUES ('Ada ''Countess'' Lovelace', X'DEADBEEF');",
    )
    .unwrap();
    path
}

pub fn garbage_db(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"SQLite format 2\0 this is not really a database".repeat(64)).unwrap();
    path
}

pub fn write_db_list(dir: &Path, dbs: &[PathBuf]) -> PathBuf {
    let entries: Vec<serde_json::Value> = dbs
        .iter()
        .map(|p| serde_json::json!({ "path": p, "comment": "ignored" }))
        .collect();
    let path = dir.join("databases.json");
    fs::write(&path, serde_json::to_vec_pretty(&entries).unwrap()).unwrap();
    path
}

pub fn archive_entry_names(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect()
}
