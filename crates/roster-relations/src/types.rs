//! Request and response types for relationship operations.

use serde::{Deserialize, Serialize};

use roster_core::events::RosterEvent;
use roster_core::{
    Character, CharacterId, CharacterSummary, RelationshipRow, RelationshipType, UnionId,
    UnionOption,
};

/// A character's relationships flattened for editing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Expansion {
    /// Liaisons that may be chosen as the source of a row.
    pub unions: Vec<UnionOption>,
    pub relations: Vec<RelationshipRow>,
}

/// A single change to one relationship row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Edit {
    SetType(RelationshipType),
    SetSource(Option<UnionId>),
    SetTarget(Option<CharacterId>),
    Delete,
}

/// An edit addressed to a row, as read by the CLI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EditRequest {
    pub index: usize,
    pub edit: Edit,
}

/// What applying an edit did.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Kept in the local list only; the row is incomplete or not persistable.
    Staged,
    /// Removed from the local list without touching the store.
    Removed,
    /// The store was mutated and the rows were re-expanded from a fresh fetch.
    Committed,
}

/// Result of [`RelationEditor::apply`](crate::reconcile::RelationEditor::apply).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyReport {
    pub effect: Effect,
    /// One event per successful store mutation.
    pub events: Vec<RosterEvent>,
    pub journal_id: Option<String>,
}

impl ApplyReport {
    pub fn local(effect: Effect) -> Self {
        Self {
            effect,
            events: Vec::new(),
            journal_id: None,
        }
    }
}

/// Statistics about a built family graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphStats {
    pub person_count: usize,
    pub hub_count: usize,
    pub edge_count: usize,
    /// Unions left out because they failed validation.
    pub skipped_unions: usize,
}

/// Everything needed to render one character's page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterView {
    pub character: Character,
    pub expansion: Expansion,
    /// Other roster characters that may be chosen as relationship targets.
    pub candidates: Vec<CharacterSummary>,
}
