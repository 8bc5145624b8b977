//! Authenticated encryption of archive bytes.
//!
//! File layout: `b"SWAB"`, one format version byte, a 12-byte nonce, then
//! AES-256-GCM ciphertext with its 16-byte tag.

use super::{ArchiveError, MachineKey};
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};

pub const MAGIC: &[u8; 4] = b"SWAB";
pub const FORMAT_VERSION: u8 = 1;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = MAGIC.len() + 1 + NONCE_LEN;

fn cipher(key: &MachineKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// Encrypts `plaintext` under a fresh random nonce.
pub fn seal(key: &MachineKey, plaintext: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher(key)
        .encrypt(&nonce, plaintext)
        .map_err(|_| ArchiveError::Crypto("encryption failed".into()))?;

    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Decrypts a sealed file.
///
/// Structural problems are [`ArchiveError::Malformed`]; a failed
/// authentication check is [`ArchiveError::WrongKey`].
pub fn open(key: &MachineKey, data: &[u8]) -> Result<Vec<u8>, ArchiveError> {
    if data.len() < HEADER_LEN + TAG_LEN || !data.starts_with(MAGIC) {
        return Err(ArchiveError::Malformed("not a project file".into()));
    }
    let version = data[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(ArchiveError::Malformed(format!(
            "unsupported format version {version}"
        )));
    }

    let nonce = Nonce::from_slice(&data[MAGIC.len() + 1..HEADER_LEN]);
    cipher(key)
        .decrypt(nonce, &data[HEADER_LEN..])
        .map_err(|_| ArchiveError::WrongKey)
}
