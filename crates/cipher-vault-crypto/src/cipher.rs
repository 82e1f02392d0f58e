//! The vault cipher protecting the secret field of every entry.

use std::fmt;
use std::sync::Arc;

use cipher_vault_core::SecretString;
use tracing::{debug, warn};

use crate::crypto;
use crate::error::Result;
use crate::key::{KeyProvider, StaticKeyProvider};
use crate::types::DecryptedSecret;

/// Symmetric encrypt/decrypt of secret strings under one injected key.
///
/// Without a key both directions are the identity. That fallback is logged
/// as a warning when the cipher is built.
///
/// [`Cipher::decrypt`] is a migration-safe read path: input that fails to
/// decrypt, or decrypts to an empty string, is returned unchanged. It is
/// therefore only an inverse of [`Cipher::encrypt`] for values `encrypt`
/// actually produced. A value sealed under a different key is
/// indistinguishable from legacy plaintext.
#[derive(Clone)]
pub struct Cipher {
    provider: Arc<dyn KeyProvider>,
}

impl Cipher {
    /// Build a cipher over `provider`, warning if it has no key.
    pub fn new(provider: Arc<dyn KeyProvider>) -> Self {
        if provider.current_key().is_none() {
            warn!(
                source = provider.source(),
                "no encryption key configured; secrets will be stored UNENCRYPTED"
            );
        }
        Self { provider }
    }

    /// Convenience constructor for a fixed key.
    pub fn with_key(key: impl Into<SecretString>) -> Self {
        Self::new(Arc::new(StaticKeyProvider::new(key)))
    }

    /// A cipher with no key (identity in both directions).
    pub fn insecure() -> Self {
        Self::new(Arc::new(StaticKeyProvider::none()))
    }

    /// True when a key is available.
    pub fn is_configured(&self) -> bool {
        self.provider.current_key().is_some()
    }

    /// Encrypt `plaintext` into the stored envelope form.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        match self.provider.current_key() {
            Some(key) => crypto::encode_envelope(key.as_bytes(), plaintext.as_bytes()),
            None => Ok(plaintext.to_string()),
        }
    }

    /// Encrypt a plaintext secret held in a zeroizing buffer.
    pub fn encrypt_secret(&self, secret: &SecretString) -> Result<String> {
        self.encrypt(secret.expose_secret())
    }

    /// Decrypt a stored value, returning the input unchanged when it cannot
    /// be decrypted (legacy plaintext) or decrypts to nothing.
    pub fn decrypt(&self, ciphertext: &str) -> String {
        let Some(key) = self.provider.current_key() else {
            return ciphertext.to_string();
        };

        match crypto::decode_envelope(key.as_bytes(), ciphertext) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(plain) if !plain.is_empty() => plain,
                Ok(_) => ciphertext.to_string(),
                Err(e) => {
                    debug!("decrypted value is not UTF-8, treating as plaintext: {e}");
                    ciphertext.to_string()
                }
            },
            Err(e) => {
                debug!("value did not decrypt, treating as plaintext: {e}");
                ciphertext.to_string()
            }
        }
    }

    /// Decrypt into a zeroizing, log-safe wrapper.
    pub fn reveal(&self, ciphertext: &str) -> DecryptedSecret {
        DecryptedSecret::new(self.decrypt(ciphertext))
    }
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher")
            .field("source", &self.provider.source())
            .field("configured", &self.is_configured())
            .finish()
    }
}
