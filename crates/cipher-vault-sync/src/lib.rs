//! Vault synchronization and cryptographic cache engine.
//!
//! This crate provides:
//! - The repository contract for the per-user document store, with
//!   in-memory and file-backed implementations
//! - A reactive cache of vaults and entries, mutated optimistically through
//!   [`VaultCoordinator`] and rolled back when the store rejects a write
//! - Analytics over decrypted secrets (strength, duplicates, tags)
//! - Encrypted export, import parsing, view filtering and password generation
//! - API token management

pub mod analytics;
pub mod cache;
pub mod command;
pub mod coordinator;
pub mod error;
pub mod export;
pub mod generator;
pub mod history;
pub mod import;
pub mod repository;
pub mod session;
pub mod tokens;
pub mod validate;
pub mod view;

pub use cache::{Applied, Cache, CacheState, Footprint};
pub use coordinator::{ImportReport, VaultCoordinator};
pub use error::{RepositoryError, SyncError};
pub use export::{EncryptedExport, ExportFormat, ExportOptions, ExportScope};
pub use repository::{FileRepository, MemoryRepository, TokenRepository, VaultRepository};
pub use session::Session;
pub use tokens::TokenService;
pub use view::{SortKey, SortOrder, ViewFolder, ViewQuery};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, SyncError>;
