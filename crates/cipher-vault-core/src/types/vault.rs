//! Vaults: named groupings of credential entries.

use serde::{Deserialize, Serialize};

use super::VaultId;

/// A named grouping of credential entries owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    pub id: VaultId,
    pub name: String,
}

impl Vault {
    /// Create a vault with a fresh client-side id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: VaultId::generate(),
            name: name.into(),
        }
    }

    /// Create a vault with a known id.
    pub fn with_id(id: impl Into<VaultId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
