//! Incremental recorder for one reconciliation.
//!
//! ```no_run
//! # use roster_journal::session::JournalSession;
//! # use roster_journal::Outcome;
//! let mut session = JournalSession::new(3, "add_child");
//! session.set_context(serde_json::json!({"row": {"type": 7, "source": 5, "target": 4}}));
//! session.add_decision("add_participants", "Parents row with union and child selected");
//! session.add_step("add_participants", serde_json::json!({"union_id": 5}), true);
//! let entry = session.finalize(Outcome::Committed);
//! assert!(entry.content_hash.is_some());
//! ```

use chrono::Utc;

use crate::{Decision, JournalEntry, JournalId, Outcome, Step};

pub struct JournalSession {
    entry: JournalEntry,
}

impl JournalSession {
    pub fn new(character_id: i64, operation: &str) -> Self {
        Self {
            entry: JournalEntry {
                id: JournalId::new(),
                character_id,
                operation: operation.to_string(),
                context: serde_json::Value::Null,
                decisions: Vec::new(),
                steps: Vec::new(),
                outcome: None,
                started_at: Utc::now(),
                completed_at: None,
                content_hash: None,
            },
        }
    }

    pub fn set_context(&mut self, context: serde_json::Value) {
        self.entry.context = context;
    }

    pub fn add_decision(&mut self, choice: &str, rationale: &str) {
        self.entry.decisions.push(Decision {
            choice: choice.to_string(),
            rationale: rationale.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn add_step(&mut self, call: &str, details: serde_json::Value, success: bool) {
        self.entry.steps.push(Step {
            call: call.to_string(),
            details,
            success,
            timestamp: Utc::now(),
        });
    }

    pub fn id(&self) -> JournalId {
        self.entry.id
    }

    /// Set the outcome and completion time, then compute the content hash.
    pub fn finalize(mut self, outcome: Outcome) -> JournalEntry {
        self.entry.outcome = Some(outcome);
        self.entry.completed_at = Some(Utc::now());
        let hash = self.entry.compute_hash();
        self.entry.content_hash = Some(hash);
        self.entry
    }
}
