//! ID generation utilities.

use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

/// Generate a new UUID v4.
pub fn uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a short random ID (8 hex characters).
pub fn short_id() -> String {
    let bytes: [u8; 4] = rand::random();
    hex::encode(bytes)
}

/// Length of a generated document ID.
pub const DOCUMENT_ID_LEN: usize = 20;

/// Generate a document ID in the style of the remote store: 20 characters
/// drawn uniformly from `[A-Za-z0-9]`.
pub fn document_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

/// Check if an ID is usable as a document key (non-empty, no path separators).
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && !id.contains(['/', '\\'])
        && id != "."
        && id != ".."
        && !id.chars().any(char::is_control)
}
