//! Passphrase sealing for export files.
//!
//! Export payloads are encrypted under a key stretched from a user
//! passphrase with Argon2id, independent of the vault cipher key. The sealed
//! form is `base64(salt16 || nonce12 || ciphertext_with_tag)`.

use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use cipher_vault_core::config::ExportConfig;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::crypto::{open_with_key, seal_with_key, KEY_SIZE, NONCE_SIZE};
use crate::error::{CryptoError, Result};

const PASSPHRASE_SALT_SIZE: usize = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl From<&ExportConfig> for KdfParams {
    fn from(config: &ExportConfig) -> Self {
        Self {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

fn stretch(passphrase: &[u8], salt: &[u8], params: &KdfParams) -> Result<Zeroizing<[u8; KEY_SIZE]>> {
    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| CryptoError::KeyDerivation(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    argon2
        .hash_password_into(passphrase, salt, &mut key[..])
        .map_err(|e| CryptoError::KeyDerivation(format!("Argon2 failed: {e}")))?;
    Ok(key)
}

/// Encrypt `plaintext` under `passphrase`.
pub fn seal(plaintext: &[u8], passphrase: &str, params: &KdfParams) -> Result<String> {
    if passphrase.is_empty() {
        return Err(CryptoError::InvalidKey("passphrase is empty".to_string()));
    }

    let mut salt = [0u8; PASSPHRASE_SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);

    let key = stretch(passphrase.as_bytes(), &salt, params)?;
    let sealed = seal_with_key(&key, plaintext)?;

    let mut raw = Vec::with_capacity(PASSPHRASE_SALT_SIZE + sealed.len());
    raw.extend_from_slice(&salt);
    raw.extend_from_slice(&sealed);
    Ok(STANDARD.encode(raw))
}

/// Decrypt a blob produced by [`seal`] with the same passphrase and params.
pub fn open(blob: &str, passphrase: &str, params: &KdfParams) -> Result<Vec<u8>> {
    let raw = STANDARD
        .decode(blob.trim())
        .map_err(|e| CryptoError::Malformed(format!("base64 decode failed: {e}")))?;
    if raw.len() < PASSPHRASE_SALT_SIZE + NONCE_SIZE {
        return Err(CryptoError::Malformed("sealed export too short".to_string()));
    }

    let (salt, sealed) = raw.split_at(PASSPHRASE_SALT_SIZE);
    let key = stretch(passphrase.as_bytes(), salt, params)?;
    open_with_key(&key, sealed)
}
