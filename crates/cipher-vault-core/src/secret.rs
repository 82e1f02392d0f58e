//! Plaintext credential material.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A plaintext secret: an entry password on its way to the cipher, the vault
/// key, or an export passphrase.
///
/// The buffer is wiped on drop and `Debug` prints a placeholder. Comparisons
/// against decrypted values go through [`matches`](Self::matches), which
/// looks at every byte.
///
/// Serializes as a bare string. Only the config file does that, and the key
/// is stored there in clear.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The plaintext. Never log or persist it.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Key material for the HKDF and Argon2 derivations.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Empty or whitespace only. A blank key counts as no key.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Length in characters, the unit of passphrase and strength rules.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// True when this secret equals `plaintext`, e.g. a decrypted stored
    /// secret. Runs over the whole input once the lengths agree.
    pub fn matches(&self, plaintext: &str) -> bool {
        let (a, b) = (self.0.as_bytes(), plaintext.as_bytes());
        a.len() == b.len() && a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
