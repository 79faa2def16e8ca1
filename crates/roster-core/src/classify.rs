//! Relationship classifier.
//!
//! The only place where union terms and relationship types are mapped onto
//! each other. Everything else branches on [`RelationshipType`] variants.
//!
//! | legitimate | is_primary | type      |
//! |------------|------------|-----------|
//! | true       | true       | Spouse    |
//! | true       | false      | Concubine |
//! | false      | any        | Lover     |

use serde::{Deserialize, Serialize};

use crate::types::{CharacterId, Participant, RelationshipType, Role, Union, UnionKind};

/// The editable terms of a liaison union.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnionTerms {
    pub legitimate: bool,
    pub is_primary: bool,
}

impl UnionTerms {
    pub fn of(union: &Union) -> Self {
        Self {
            legitimate: union.legitimate,
            is_primary: union.is_primary,
        }
    }
}

/// Classify the partnership a liaison union represents.
pub fn encode(union: &Union) -> RelationshipType {
    encode_terms(UnionTerms::of(union))
}

pub fn encode_terms(terms: UnionTerms) -> RelationshipType {
    match (terms.legitimate, terms.is_primary) {
        (true, true) => RelationshipType::Spouse,
        (true, false) => RelationshipType::Concubine,
        (false, _) => RelationshipType::Lover,
    }
}

/// Classify how `participant` relates to the union as seen from `focal`.
///
/// Child-side participants are always `Parents` rows regardless of
/// legitimacy; faction participants are `Member` for the focal character
/// and `Peer` for everyone else.
pub fn encode_participant(
    union: &Union,
    participant: &Participant,
    focal: CharacterId,
) -> RelationshipType {
    match (union.kind, participant.role) {
        (UnionKind::Faction, _) | (UnionKind::Liaison, Role::Member) => {
            if participant.id == focal {
                RelationshipType::Member
            } else {
                RelationshipType::Peer
            }
        }
        (UnionKind::Liaison, Role::Child) => RelationshipType::Parents,
        (UnionKind::Liaison, Role::Parent) => encode(union),
    }
}

/// Recover union terms from a relationship type.
///
/// Defined for Spouse, Concubine and Lover only. Every other type has no
/// representation in union terms and yields `None`.
pub fn decode(kind: RelationshipType) -> Option<UnionTerms> {
    match kind {
        RelationshipType::Spouse => Some(UnionTerms {
            legitimate: true,
            is_primary: true,
        }),
        RelationshipType::Concubine => Some(UnionTerms {
            legitimate: true,
            is_primary: false,
        }),
        RelationshipType::Lover => Some(UnionTerms {
            legitimate: false,
            is_primary: false,
        }),
        _ => None,
    }
}
