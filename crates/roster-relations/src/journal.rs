//! Journal helpers for reconciliations that reach the union store.

use std::sync::Arc;

use roster_core::{CharacterId, RelationshipRow};
use roster_journal::session::JournalSession;
use roster_journal::store::{FileJournalStore, JournalStore};
use roster_journal::{JournalEntry, Outcome};

use crate::types::Edit;

/// Shared handle to wherever journal entries are written.
pub type SharedJournal = Arc<dyn JournalStore + Send + Sync>;

/// Open a file-backed journal under `dir`.
pub fn open(dir: &str) -> crate::error::Result<SharedJournal> {
    let store = FileJournalStore::new(dir)?;
    tracing::info!(dir, "Reconciliation journal enabled");
    Ok(Arc::new(store))
}

/// Start a session for one edit of `focal`'s relationship list.
pub fn start_edit_session(
    focal: CharacterId,
    operation: &str,
    before: &RelationshipRow,
    edit: &Edit,
    after: &RelationshipRow,
) -> JournalSession {
    let mut session = JournalSession::new(focal.0, operation);
    session.set_context(serde_json::json!({
        "before": before,
        "edit": edit,
        "after": after,
    }));
    session
}

/// Record the result of one store call.
pub fn record_call(
    session: &mut JournalSession,
    call: &str,
    params: serde_json::Value,
    error: Option<&dyn std::error::Error>,
) {
    let details = match error {
        Some(e) => serde_json::json!({ "params": params, "error": e.to_string() }),
        None => serde_json::json!({ "params": params }),
    };
    session.add_step(call, details, error.is_none());
}

/// Finalize the session and store the entry. Storage failures are logged,
/// never returned: the store mutation has already happened.
pub fn finalize_and_store(
    session: JournalSession,
    outcome: Outcome,
    journal: &SharedJournal,
) -> JournalEntry {
    let entry = session.finalize(outcome);
    match journal.save(&entry) {
        Ok(()) => {
            tracing::info!(journal_id = %entry.id, ?outcome, "Journal entry recorded");
        }
        Err(e) => {
            tracing::warn!(journal_id = %entry.id, error = %e, "Failed to store journal entry");
        }
    }
    entry
}
