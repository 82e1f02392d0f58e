//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::PathBuf;

/// Get the Cipher Vault base directory (~/.cipher-vault).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".cipher-vault"))
}

/// Get the main config file path (~/.cipher-vault/cipher-vault.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("cipher-vault.json5"))
}

/// Get the default document store directory (~/.cipher-vault/data).
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("data"))
}

/// Get the default export directory (~/.cipher-vault/exports).
pub fn exports_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("exports"))
}

/// Ensure the base directories exist.
pub fn ensure_dirs() -> Result<(), ConfigError> {
    for dir in [base_dir()?, data_dir()?, exports_dir()?] {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
        }
    }
    Ok(())
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
