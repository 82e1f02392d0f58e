//! Decrypted values held in memory.

use cipher_vault_core::SecretString;
use std::fmt;

/// A decrypted secret held in memory.
///
/// Wraps `SecretString` so the plaintext is zeroed on drop. Debug and Display
/// both emit `[REDACTED]` to prevent accidental logging.
#[derive(Clone, PartialEq, Eq)]
pub struct DecryptedSecret {
    inner: SecretString,
}

impl DecryptedSecret {
    /// Create a new decrypted secret from raw plaintext.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: SecretString::new(value),
        }
    }

    /// Expose the plaintext value. Use sparingly.
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Convert into the generic secret wrapper, e.g. to feed a draft.
    pub fn into_secret_string(self) -> SecretString {
        self.inner
    }
}

impl fmt::Debug for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for DecryptedSecret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
