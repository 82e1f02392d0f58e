//! AES-256-GCM encryption with HKDF-SHA256 key derivation.
//!
//! Each secret gets a unique random salt; the configured key is never used
//! directly as a cipher key. A fresh random nonce is prepended to the
//! ciphertext. The text envelope stored in entries is
//! `base64(salt || nonce || ciphertext_with_tag)`.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};

pub(crate) const NONCE_SIZE: usize = 12;
pub(crate) const SALT_SIZE: usize = 32;
pub(crate) const KEY_SIZE: usize = 32;
const TAG_SIZE: usize = 16;

/// Smallest envelope that can hold salt, nonce and tag.
const MIN_ENVELOPE_LEN: usize = SALT_SIZE + NONCE_SIZE + TAG_SIZE;

/// HKDF info string used to domain-separate derived keys.
const HKDF_INFO: &[u8] = b"cipher-vault-secret-v1";

/// Derive a 256-bit encryption key from `master_key` and `salt` via HKDF-SHA256.
fn derive_key(master_key: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), master_key);
    let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
    hk.expand(HKDF_INFO, &mut okm[..])
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(okm)
}

/// Encrypt with a ready 256-bit key. Returns `nonce || ciphertext_with_tag`.
pub(crate) fn seal_with_key(key: &[u8; KEY_SIZE], plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Inverse of [`seal_with_key`].
pub(crate) fn open_with_key(key: &[u8; KEY_SIZE], sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::DecryptionFailed(
            "ciphertext too short".to_string(),
        ));
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Encrypt `plaintext` using a key derived from `master_key`.
///
/// Returns `(nonce || ciphertext_with_tag, salt)`. The salt is randomly
/// generated so the same plaintext encrypted twice produces different output.
pub fn encrypt(master_key: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut salt = vec![0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);

    let key = derive_key(master_key, &salt)?;
    let sealed = seal_with_key(&key, plaintext)?;
    Ok((sealed, salt))
}

/// Decrypt data previously produced by [`encrypt`].
pub fn decrypt(master_key: &[u8], encrypted: &[u8], salt: &[u8]) -> Result<Vec<u8>> {
    let key = derive_key(master_key, salt)?;
    open_with_key(&key, encrypted)
}

/// Encrypt into the single-string envelope stored in credential entries.
pub fn encode_envelope(master_key: &[u8], plaintext: &[u8]) -> Result<String> {
    let (sealed, salt) = encrypt(master_key, plaintext)?;
    let mut raw = Vec::with_capacity(salt.len() + sealed.len());
    raw.extend_from_slice(&salt);
    raw.extend_from_slice(&sealed);
    Ok(STANDARD.encode(raw))
}

/// Decrypt an envelope produced by [`encode_envelope`].
pub fn decode_envelope(master_key: &[u8], envelope: &str) -> Result<Vec<u8>> {
    let raw = STANDARD
        .decode(envelope.trim())
        .map_err(|e| CryptoError::Malformed(format!("base64 decode failed: {e}")))?;
    if raw.len() < MIN_ENVELOPE_LEN {
        return Err(CryptoError::Malformed(format!(
            "envelope too short: {} bytes",
            raw.len()
        )));
    }
    let (salt, sealed) = raw.split_at(SALT_SIZE);
    decrypt(master_key, sealed, salt)
}
