//! Secret protection for Cipher Vault.
//!
//! Provides the vault [`Cipher`] (AES-256-GCM with HKDF-SHA256 per-secret
//! keys, injected through a [`KeyProvider`]) and passphrase sealing for
//! encrypted exports (Argon2id + AES-256-GCM).

pub mod cipher;
pub mod crypto;
pub mod error;
pub mod key;
pub mod passphrase;
pub mod types;

pub use cipher::Cipher;
pub use error::{CryptoError, Result};
pub use key::{EnvKeyProvider, KeyProvider, StaticKeyProvider};
pub use passphrase::KdfParams;
pub use types::DecryptedSecret;
