//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors that can occur while encrypting, decrypting, or deriving keys.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Malformed envelope: {0}")]
    Malformed(String),
}

/// Convenience result alias for cryptographic operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
