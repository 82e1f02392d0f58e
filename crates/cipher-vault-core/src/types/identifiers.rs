//! Strongly-typed identifiers.
//!
//! All identifiers are opaque strings assigned either by the document
//! store or by the client before an optimistic write.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Owner of a set of vaults (the signed-in user).
    UserId
);

string_id!(
    /// Identifier of a [`Vault`](super::Vault).
    VaultId
);

string_id!(
    /// Identifier of a [`CredentialEntry`](super::CredentialEntry).
    EntryId
);

string_id!(
    /// Identifier of an [`ApiToken`](super::ApiToken).
    TokenId
);

impl VaultId {
    /// Allocate a fresh client-side vault id.
    pub fn generate() -> Self {
        Self(crate::id::document_id())
    }
}

impl EntryId {
    /// Allocate a fresh client-side entry id.
    pub fn generate() -> Self {
        Self(crate::id::document_id())
    }
}

impl TokenId {
    /// Allocate a fresh client-side token id.
    pub fn generate() -> Self {
        Self(crate::id::document_id())
    }
}
