//! Roster Journal: tamper-evident record of relationship edits.
//!
//! Every reconciliation that reaches the union store is journaled: the edit
//! that triggered it, which mutation path was chosen, and each store call
//! with its result. A reconciliation that leaves an orphan union behind is
//! recorded with an [`Outcome::Orphaned`] outcome so it can be cleaned up by
//! hand. Entries are content-hashed with BLAKE3 and stored as JSON files.

pub mod hash;
pub mod session;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Core Types ───────────────────────────────────────────────────

/// Unique identifier for a journal entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct JournalId(pub Uuid);

impl JournalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JournalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JournalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which mutation path a reconciliation took, and why.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub choice: String,
    pub rationale: String,
    pub timestamp: DateTime<Utc>,
}

/// One call made against the union store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Store operation, e.g. "create_union" or "remove_participant".
    pub call: String,
    /// Request parameters and, on failure, the error message.
    pub details: serde_json::Value,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// How a reconciliation ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every store call succeeded.
    Committed,
    /// The first store call failed; nothing changed.
    Failed,
    /// A union was created but its participants could not be added.
    Orphaned,
}

/// The full record of one reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id: JournalId,
    /// Focal character whose relationship list was edited.
    pub character_id: i64,
    /// Short name of the edit, e.g. "create_liaison".
    pub operation: String,
    /// The edited row before and after the edit.
    pub context: serde_json::Value,
    pub decisions: Vec<Decision>,
    pub steps: Vec<Step>,
    pub outcome: Option<Outcome>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// BLAKE3 content hash (hex), set on finalization.
    pub content_hash: Option<String>,
}

impl JournalEntry {
    /// Compute the BLAKE3 hash over every field except `content_hash`.
    pub fn compute_hash(&self) -> String {
        hash::compute_entry_hash(self)
    }

    /// Verify that the stored content_hash matches a freshly computed hash.
    pub fn verify_integrity(&self) -> bool {
        match &self.content_hash {
            Some(stored) => stored == &self.compute_hash(),
            None => false,
        }
    }
}
