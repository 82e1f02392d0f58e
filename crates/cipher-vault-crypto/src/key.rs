//! Cipher key sources.
//!
//! The vault key is injected into [`crate::Cipher`] through a
//! [`KeyProvider`] rather than read from process-global state, so tests can
//! substitute keys and rotation has a single seam. Resolution for the CLI:
//! 1. `encryption.key` from the config file
//! 2. the environment variable named by `encryption.key_env`
//!    (default `CIPHER_VAULT_ENCRYPTION_KEY`)
//! 3. no key: the cipher degrades to identity and warns

use cipher_vault_core::env::{self, vars};
use cipher_vault_core::{Config, SecretString};
use tracing::debug;

/// Supplies the symmetric key used by the vault cipher.
pub trait KeyProvider: Send + Sync {
    /// The key to use for the next operation, if one is configured.
    fn current_key(&self) -> Option<SecretString>;

    /// Short description of where the key comes from, for logs.
    fn source(&self) -> &str;
}

/// A fixed key (or deliberately none).
#[derive(Debug, Clone)]
pub struct StaticKeyProvider {
    key: Option<SecretString>,
    source: String,
}

impl StaticKeyProvider {
    /// Provide `key` for every operation.
    pub fn new(key: impl Into<SecretString>) -> Self {
        Self {
            key: Some(key.into()),
            source: "static".to_string(),
        }
    }

    /// Provide no key at all (insecure identity fallback).
    pub fn none() -> Self {
        Self {
            key: None,
            source: "none".to_string(),
        }
    }

    /// Resolve from configuration: inline key, then the configured env var.
    pub fn from_config(config: &Config) -> Self {
        let key = config.resolve_encryption_key();
        let inline = config
            .encryption
            .key
            .as_ref()
            .is_some_and(|k| !k.is_blank());
        let source = if inline {
            "config".to_string()
        } else {
            format!("env:{}", config.encryption.key_env)
        };
        debug!(source = %source, configured = key.is_some(), "resolved cipher key");
        Self { key, source }
    }
}

impl KeyProvider for StaticKeyProvider {
    fn current_key(&self) -> Option<SecretString> {
        self.key.clone()
    }

    fn source(&self) -> &str {
        &self.source
    }
}

/// Reads the key from an environment variable once, at construction.
#[derive(Debug, Clone)]
pub struct EnvKeyProvider {
    var: String,
    key: Option<SecretString>,
}

impl EnvKeyProvider {
    /// Read `var` now; later changes to the environment are not observed.
    pub fn from_var(var: impl Into<String>) -> Self {
        let var = var.into();
        let key = env::get_var(&var).map(SecretString::new);
        Self { var, key }
    }
}

impl Default for EnvKeyProvider {
    fn default() -> Self {
        Self::from_var(vars::ENCRYPTION_KEY)
    }
}

impl KeyProvider for EnvKeyProvider {
    fn current_key(&self) -> Option<SecretString> {
        self.key.clone()
    }

    fn source(&self) -> &str {
        &self.var
    }
}
