//! Event types reported to callers of the relationship engine.
//!
//! Graph interactions produce navigation events; reconciliation produces
//! one event per union-store mutation it performed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::UnionTerms;
use crate::types::{CharacterId, ParticipantLink, UnionId};

/// Unique identifier for an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// An event emitted by a roster component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEvent {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub source: EventSource,
    pub payload: EventPayload,
}

impl RosterEvent {
    pub fn new(source: EventSource, payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Utc::now(),
            source,
            payload,
        }
    }
}

/// Which component emitted the event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Graph,
    Editor,
}

/// The event payload, tagged by type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event_type")]
pub enum EventPayload {
    // ── Graph events ──────────────────────────────────────────
    /// A person node was clicked; the caller should show this character.
    Navigate { character_id: CharacterId },

    // ── Union store mutations ─────────────────────────────────
    UnionCreated { union_id: UnionId, terms: UnionTerms },
    UnionUpdated { union_id: UnionId, terms: UnionTerms },
    ParticipantsAdded {
        union_id: UnionId,
        participants: Vec<ParticipantLink>,
    },
    ParticipantRemoved {
        union_id: UnionId,
        character_id: CharacterId,
    },
    /// A union was created but its participants could not be added.
    OrphanUnion { union_id: UnionId },
}
