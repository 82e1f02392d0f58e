//! Engine error types.

use cipher_vault_crypto::CryptoError;
use thiserror::Error;

/// Errors surfaced by the engine to its callers.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Caller-supplied data failed structural checks. Nothing was applied.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The targeted entry, vault or token is not known.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The document store rejected the call. The cache has been rolled back.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Encryption failed. Decryption failures never surface here.
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// An export could not be produced.
    #[error("Export error: {0}")]
    Export(String),

    /// An import file could not be parsed.
    #[error("Import error: {0}")]
    Import(String),

    /// The coordinator has no active session.
    #[error("No active session")]
    NoSession,
}

/// Errors returned by a [`VaultRepository`](crate::VaultRepository) or
/// [`TokenRepository`](crate::TokenRepository).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store could not be reached.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The store refused the operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The addressed document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
