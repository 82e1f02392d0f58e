//! # cipher-vault-core
//!
//! Core types, configuration, and utilities for Cipher Vault.
//!
//! This crate provides shared functionality used across all Cipher Vault crates:
//!
//! - **Configuration**: Loading, validation, and persistence of the config file
//! - **Types**: Vaults, credential entries, API tokens and their patches
//! - **Utilities**: Path resolution, ID generation, and environment handling

pub mod config;
pub mod env;
pub mod error;
pub mod id;
pub mod paths;
pub mod secret;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use secret::SecretString;
pub use types::*;
