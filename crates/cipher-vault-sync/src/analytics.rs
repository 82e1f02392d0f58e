//! Derived views over decrypted secrets.
//!
//! Every function here only considers active entries, whatever it is given,
//! and decrypts secrets through the supplied cipher. Nothing decrypted is
//! retained beyond the call.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use cipher_vault_core::{CredentialEntry, EntryId, Vault};
use cipher_vault_crypto::Cipher;
use serde::Serialize;

/// Length at which a secret earns the length predicate.
pub const STRONG_LENGTH: usize = 12;

/// Secrets shorter than this are always scored 1.
pub const MIN_LENGTH: usize = 8;

/// Strength bucket of a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StrengthLabel {
    /// No secret to judge.
    Unknown,
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl StrengthLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Weak => "Weak",
            Self::Medium => "Medium",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score (0..=4) and label of a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Strength {
    pub score: u8,
    pub label: StrengthLabel,
}

/// Classify a plaintext secret.
///
/// One point each for: at least [`STRONG_LENGTH`] characters, an uppercase
/// letter, a lowercase letter, a digit, a symbol. Below [`MIN_LENGTH`]
/// characters the score is 1 regardless. Five points clamp to four.
pub fn classify_strength(secret: &str) -> Strength {
    if secret.is_empty() {
        return Strength {
            score: 0,
            label: StrengthLabel::Unknown,
        };
    }

    let length = secret.chars().count();
    let predicates = [
        length >= STRONG_LENGTH,
        secret.chars().any(|c| c.is_ascii_uppercase()),
        secret.chars().any(|c| c.is_ascii_lowercase()),
        secret.chars().any(|c| c.is_ascii_digit()),
        secret.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];

    let mut score = predicates.iter().filter(|p| **p).count() as u8;
    if length < MIN_LENGTH {
        score = 1;
    }

    let label = match score {
        0 | 1 => StrengthLabel::Weak,
        2 => StrengthLabel::Medium,
        3 => StrengthLabel::Strong,
        _ => StrengthLabel::VeryStrong,
    };

    Strength {
        score: score.min(4),
        label,
    }
}

/// Active entries sharing a candidate secret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    pub count: usize,
    pub matching: Vec<EntryId>,
}

/// Find active entries (other than `exclude`) whose secret equals `candidate`.
pub fn detect_duplicates(
    entries: &[CredentialEntry],
    cipher: &Cipher,
    candidate: &str,
    exclude: Option<&EntryId>,
) -> DuplicateReport {
    if candidate.is_empty() {
        return DuplicateReport::default();
    }

    let matching: Vec<EntryId> = entries
        .iter()
        .filter(|e| e.is_active())
        .filter(|e| Some(&e.id) != exclude)
        .filter(|e| cipher.decrypt(&e.secret) == candidate)
        .map(|e| e.id.clone())
        .collect();

    DuplicateReport {
        count: matching.len(),
        matching,
    }
}

/// Sorted union of the tags of active entries.
pub fn aggregate_tags(entries: &[CredentialEntry]) -> BTreeSet<String> {
    entries
        .iter()
        .filter(|e| e.is_active())
        .flat_map(|e| e.tags.iter().cloned())
        .collect()
}

/// Number of active entries per strength label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrengthDistribution {
    pub weak: usize,
    pub medium: usize,
    pub strong: usize,
    pub very_strong: usize,
}

impl StrengthDistribution {
    pub fn total(&self) -> usize {
        self.weak + self.medium + self.strong + self.very_strong
    }
}

pub fn strength_distribution(entries: &[CredentialEntry], cipher: &Cipher) -> StrengthDistribution {
    let mut dist = StrengthDistribution::default();
    for entry in entries.iter().filter(|e| e.is_active()) {
        match classify_strength(&cipher.decrypt(&entry.secret)).label {
            StrengthLabel::Unknown => {}
            StrengthLabel::Weak => dist.weak += 1,
            StrengthLabel::Medium => dist.medium += 1,
            StrengthLabel::Strong => dist.strong += 1,
            StrengthLabel::VeryStrong => dist.very_strong += 1,
        }
    }
    dist
}

/// Number of distinct secrets used by more than one active entry.
pub fn reused_secret_count(entries: &[CredentialEntry], cipher: &Cipher) -> usize {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in entries.iter().filter(|e| e.is_active()) {
        *counts.entry(cipher.decrypt(&entry.secret)).or_default() += 1;
    }
    counts.values().filter(|n| **n > 1).count()
}

/// An action suggested by the security report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Recommendation {
    UpdateWeak { count: usize },
    ChangeReused { count: usize },
    ImproveMedium { count: usize },
    AllGood,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpdateWeak { count } => write!(f, "Update {count} weak password(s)"),
            Self::ChangeReused { count } => write!(f, "Change {count} reused password(s)"),
            Self::ImproveMedium { count } => {
                write!(f, "Improve {count} medium-strength password(s)")
            }
            Self::AllGood => f.write_str("Your vault is in good shape"),
        }
    }
}

/// Summary line of a recently added entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub id: EntryId,
    pub service_name: String,
    pub vault_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Number of recent entries in a report.
pub const RECENT_LIMIT: usize = 5;

/// Dashboard-style overview of a vault set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    pub vault_count: usize,
    pub active_count: usize,
    pub trashed_count: usize,
    pub favorite_count: usize,
    pub distribution: StrengthDistribution,
    pub reused_count: usize,
    pub recommendations: Vec<Recommendation>,
    pub recent: Vec<RecentEntry>,
}

pub fn security_report(
    entries: &[CredentialEntry],
    vaults: &[Vault],
    cipher: &Cipher,
) -> SecurityReport {
    let active: Vec<&CredentialEntry> = entries.iter().filter(|e| e.is_active()).collect();
    let distribution = strength_distribution(entries, cipher);
    let reused_count = reused_secret_count(entries, cipher);

    let mut recommendations = Vec::new();
    if distribution.weak > 0 {
        recommendations.push(Recommendation::UpdateWeak {
            count: distribution.weak,
        });
    }
    if reused_count > 0 {
        recommendations.push(Recommendation::ChangeReused {
            count: reused_count,
        });
    }
    if distribution.medium > 0 {
        recommendations.push(Recommendation::ImproveMedium {
            count: distribution.medium,
        });
    }
    if recommendations.is_empty() {
        recommendations.push(Recommendation::AllGood);
    }

    let mut by_created = active.clone();
    by_created.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let recent = by_created
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|e| RecentEntry {
            id: e.id.clone(),
            service_name: e.service_name.clone(),
            vault_name: vaults
                .iter()
                .find(|v| v.id == e.vault_id)
                .map(|v| v.name.clone())
                .unwrap_or_default(),
            created_at: e.created_at,
        })
        .collect();

    SecurityReport {
        vault_count: vaults.len(),
        active_count: active.len(),
        trashed_count: entries.len() - active.len(),
        favorite_count: active.iter().filter(|e| e.is_favorite).count(),
        distribution,
        reused_count,
        recommendations,
        recent,
    }
}
