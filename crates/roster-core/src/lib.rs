//! roster-core: Shared types, classification, and configuration for the roster.
//!
//! This crate provides the foundational types used across all roster components:
//! - Characters, unions (liaisons and factions), and role-tagged participants
//! - The closed relationship-type enum and the editable relationship row
//! - The relationship classifier (union terms <-> relationship type)
//! - Event types reported to callers
//! - Configuration loading
//! - Common error types

pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use classify::{decode, encode, encode_participant, UnionTerms};
pub use error::RosterError;
pub use types::{
    Character, CharacterId, CharacterSummary, FactionOption, Participant, ParticipantLink, Person,
    RelationshipRow, RelationshipType, Role, Sex, Union, UnionDraft, UnionId, UnionKind,
    UnionOption,
};
