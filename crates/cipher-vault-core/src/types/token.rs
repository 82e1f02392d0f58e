//! API tokens stored alongside credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TokenId;

/// A named API token. `value` is ciphertext at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiToken {
    pub id: TokenId,
    pub name: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
