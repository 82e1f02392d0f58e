//! Configuration schema definitions.

use crate::env::vars;
use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Cipher Vault configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Vault cipher key settings.
    #[serde(default)]
    pub encryption: EncryptionConfig,

    /// Local document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Session identity and defaults.
    #[serde(default)]
    pub session: SessionConfig,

    /// Encrypted export settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Vault cipher key configuration.
///
/// The key is resolved once at startup: the inline `key` wins, otherwise the
/// variable named by `key_env` is read. With neither, secrets are stored
/// unencrypted and a warning is logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptionConfig {
    /// Inline key material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<SecretString>,

    /// Environment variable holding the key.
    #[serde(default = "default_key_env")]
    pub key_env: String,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            key: None,
            key_env: default_key_env(),
        }
    }
}

fn default_key_env() -> String {
    vars::ENCRYPTION_KEY.to_string()
}

/// Local document store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON document per user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

/// Session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Identity used for the local session.
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Name of the vault created for users that have none.
    #[serde(default = "default_vault_name")]
    pub default_vault_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            default_vault_name: default_vault_name(),
        }
    }
}

fn default_user_id() -> String {
    "local".to_string()
}

fn default_vault_name() -> String {
    "Personal".to_string()
}

/// Encrypted export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Argon2id memory cost in KiB.
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,

    /// Argon2id iterations.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Argon2id lanes.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,

    /// Minimum accepted passphrase length.
    #[serde(default = "default_min_passphrase_len")]
    pub min_passphrase_len: usize,

    /// Where export files are written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
            min_passphrase_len: default_min_passphrase_len(),
            output_dir: None,
        }
    }
}

fn default_memory_kib() -> u32 {
    19 * 1024
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_min_passphrase_len() -> usize {
    8
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing` filters.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
