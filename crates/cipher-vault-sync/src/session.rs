//! The signed-in user a coordinator is bound to.

use cipher_vault_core::{Config, UserId};

/// Name given to the vault created for users who have none.
pub const DEFAULT_VAULT_NAME: &str = "Personal";

/// A user session. Created at login, dropped at logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user.
    pub user_id: UserId,

    /// Name of the vault created when the user has none.
    pub default_vault_name: String,

    /// Login timestamp.
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    /// Start a session for `user_id`.
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            default_vault_name: DEFAULT_VAULT_NAME.to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Override the default vault name.
    pub fn with_default_vault(mut self, name: impl Into<String>) -> Self {
        self.default_vault_name = name.into();
        self
    }

    /// Start a session for the user configured in `session.user_id`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session.user_id.as_str())
            .with_default_vault(config.session.default_vault_name.as_str())
    }
}
