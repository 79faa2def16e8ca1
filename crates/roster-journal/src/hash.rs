//! BLAKE3 content hashing for tamper evidence.

use serde::Serialize;

use crate::JournalEntry;

/// Hashable view of a journal entry (excludes content_hash).
#[derive(Serialize)]
struct HashableEntry<'a> {
    id: &'a crate::JournalId,
    character_id: i64,
    operation: &'a str,
    context: &'a serde_json::Value,
    decisions: &'a [crate::Decision],
    steps: &'a [crate::Step],
    outcome: &'a Option<crate::Outcome>,
    started_at: &'a chrono::DateTime<chrono::Utc>,
    completed_at: &'a Option<chrono::DateTime<chrono::Utc>>,
}

/// Serialize all fields except `content_hash` to JSON and hash the bytes.
/// Returns the hex-encoded hash.
pub fn compute_entry_hash(entry: &JournalEntry) -> String {
    let hashable = HashableEntry {
        id: &entry.id,
        character_id: entry.character_id,
        operation: &entry.operation,
        context: &entry.context,
        decisions: &entry.decisions,
        steps: &entry.steps,
        outcome: &entry.outcome,
        started_at: &entry.started_at,
        completed_at: &entry.completed_at,
    };

    let json = serde_json::to_vec(&hashable).expect("Journal entry serialization should not fail");
    blake3::hash(&json).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use crate::session::JournalSession;
    use crate::Outcome;

    #[test]
    fn hash_changes_with_content() {
        let mut session = JournalSession::new(7, "update_union");
        session.add_step("update_union", serde_json::json!({"union_id": 5}), true);
        let entry = session.finalize(Outcome::Committed);

        let mut tampered = entry.clone();
        tampered.steps[0].success = false;

        assert_eq!(entry.compute_hash(), entry.compute_hash());
        assert_ne!(entry.compute_hash(), tampered.compute_hash());
    }
}
