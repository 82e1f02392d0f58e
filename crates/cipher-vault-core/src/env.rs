//! Environment variable handling.

use std::env;

/// Well-known environment variable names.
pub mod vars {
    /// Symmetric key for the vault cipher.
    pub const ENCRYPTION_KEY: &str = "CIPHER_VAULT_ENCRYPTION_KEY";

    /// Config file override.
    pub const CONFIG: &str = "CIPHER_VAULT_CONFIG";

    /// User id override for the local session.
    pub const USER: &str = "CIPHER_VAULT_USER";

    /// Data directory override.
    pub const DATA_DIR: &str = "CIPHER_VAULT_DATA_DIR";
}

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}
