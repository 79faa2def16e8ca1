//! Core domain types for the roster relationship store.
//!
//! These mirror the union store's wire format: numeric ids, numeric
//! role/kind/sex codes, and snake_case field names.

use serde::{Deserialize, Serialize};

use crate::error::RosterError;

// ── Identifiers ───────────────────────────────────────────────────

/// Identifier of a character in the roster.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct CharacterId(pub i64);

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a union (liaison or faction) in the union store.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct UnionId(pub i64);

impl UnionId {
    /// Source marker for rows that are not backed by an editable union.
    pub const DERIVED: UnionId = UnionId(0);

    pub fn is_derived(self) -> bool {
        self == Self::DERIVED
    }
}

impl std::fmt::Display for UnionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Characters ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "u8", into = "u8")]
pub enum Sex {
    Male,
    #[default]
    Female,
}

impl From<u8> for Sex {
    fn from(code: u8) -> Self {
        match code {
            1 => Sex::Male,
            _ => Sex::Female,
        }
    }
}

impl From<Sex> for u8 {
    fn from(sex: Sex) -> Self {
        match sex {
            Sex::Male => 1,
            Sex::Female => 2,
        }
    }
}

impl Sex {
    /// Gender tag used by graph front ends.
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// The identity view of a character used by the relationship engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Person {
    pub id: CharacterId,
    pub name: String,
    pub sex: Sex,
}

/// An entry of the roster listing (`id`, `name` only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CharacterSummary {
    pub id: CharacterId,
    pub name: String,
}

/// A full character record as held by the character store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub appearance: String,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub roleplaying: Vec<String>,
    #[serde(default)]
    pub background: String,
}

impl Character {
    pub fn person(&self) -> Person {
        Person {
            id: self.id,
            name: self.name.clone(),
            sex: self.sex,
        }
    }
}

// ── Unions ────────────────────────────────────────────────────────

/// What a union models.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum UnionKind {
    /// Marriage, affair, or lover pairing plus its children.
    Liaison,
    /// Group membership.
    Faction,
}

impl TryFrom<u8> for UnionKind {
    type Error = RosterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(UnionKind::Liaison),
            2 => Ok(UnionKind::Faction),
            _ => Err(RosterError::UnknownCode {
                field: "union type",
                code,
            }),
        }
    }
}

impl From<UnionKind> for u8 {
    fn from(kind: UnionKind) -> Self {
        match kind {
            UnionKind::Liaison => 1,
            UnionKind::Faction => 2,
        }
    }
}

/// The role a participant plays inside a union.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    Parent,
    Child,
    Member,
}

impl TryFrom<u8> for Role {
    type Error = RosterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Role::Parent),
            2 => Ok(Role::Child),
            3 => Ok(Role::Member),
            _ => Err(RosterError::UnknownCode {
                field: "participant role",
                code,
            }),
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        match role {
            Role::Parent => 1,
            Role::Child => 2,
            Role::Member => 3,
        }
    }
}

/// A character's membership in a union, as returned in connection snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    #[serde(alias = "character_id")]
    pub id: CharacterId,
    pub role: Role,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sex: Sex,
}

impl Participant {
    /// Adult side of a union: partners of a liaison, members of a faction.
    pub fn is_parent_side(&self) -> bool {
        matches!(self.role, Role::Parent | Role::Member)
    }

    pub fn is_child_side(&self) -> bool {
        self.role == Role::Child
    }

    pub fn person(&self) -> Person {
        Person {
            id: self.id,
            name: self.name.clone(),
            sex: self.sex,
        }
    }
}

/// A union record from the union store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Union {
    pub id: UnionId,
    #[serde(rename = "type")]
    pub kind: UnionKind,
    #[serde(default)]
    pub legitimate: bool,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Union {
    pub fn parent_side(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_parent_side())
    }

    pub fn child_side(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_child_side())
    }

    pub fn has_parent(&self, id: CharacterId) -> bool {
        self.parent_side().any(|p| p.id == id)
    }

    pub fn has_child(&self, id: CharacterId) -> bool {
        self.child_side().any(|p| p.id == id)
    }

    pub fn has_participant(&self, id: CharacterId) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }

    /// Check the structural invariant: at least one parent-side participant.
    pub fn validate(&self) -> Result<(), RosterError> {
        if self.parent_side().next().is_none() {
            return Err(RosterError::InvalidUnion {
                union_id: self.id.0,
                reason: "no parent-side participant".to_string(),
            });
        }
        Ok(())
    }
}

/// Payload for creating a union.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnionDraft {
    #[serde(rename = "type")]
    pub kind: UnionKind,
    pub legitimate: bool,
    pub is_primary: bool,
}

/// Payload entry for adding a participant to a union.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantLink {
    pub character_id: CharacterId,
    pub role: Role,
}

/// Display option for choosing a liaison as a relationship's source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnionOption {
    pub value: UnionId,
    pub label: String,
}

/// A named faction as listed by the union store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactionOption {
    pub id: UnionId,
    pub name: String,
}

// ── Relationships ─────────────────────────────────────────────────

/// Every relationship type the roster knows about.
///
/// Codes are stable and shared with the union store and front ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum RelationshipType {
    Spouse = 1,
    Concubine = 2,
    Consort = 3,
    Betrothed = 4,
    Lover = 5,
    Paramour = 6,
    Parents = 7,
    Child = 8,
    Guardian = 9,
    Ward = 10,
    Mentor = 11,
    Lord = 12,
    Vassal = 13,
    Patron = 14,
    Client = 15,
    Protege = 16,
    Employer = 17,
    Employee = 18,
    Master = 19,
    Friend = 20,
    Commander = 21,
    Subordinate = 22,
    Liege = 23,
    Retainer = 24,
    Sibling = 25,
    Member = 26,
    Peer = 27,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 27] = [
        Self::Spouse,
        Self::Concubine,
        Self::Consort,
        Self::Betrothed,
        Self::Lover,
        Self::Paramour,
        Self::Parents,
        Self::Child,
        Self::Guardian,
        Self::Ward,
        Self::Mentor,
        Self::Lord,
        Self::Vassal,
        Self::Patron,
        Self::Client,
        Self::Protege,
        Self::Employer,
        Self::Employee,
        Self::Master,
        Self::Friend,
        Self::Commander,
        Self::Subordinate,
        Self::Liege,
        Self::Retainer,
        Self::Sibling,
        Self::Member,
        Self::Peer,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Spouse => "Spouse",
            Self::Concubine => "Concubine",
            Self::Consort => "Consort",
            Self::Betrothed => "Betrothed",
            Self::Lover => "Lover",
            Self::Paramour => "Paramour",
            Self::Parents => "Parents",
            Self::Child => "Child",
            Self::Guardian => "Guardian",
            Self::Ward => "Ward",
            Self::Mentor => "Mentor",
            Self::Lord => "Lord",
            Self::Vassal => "Vassal",
            Self::Patron => "Patron",
            Self::Client => "Client",
            Self::Protege => "Protégé",
            Self::Employer => "Employer",
            Self::Employee => "Employee",
            Self::Master => "Master",
            Self::Friend => "Friend",
            Self::Commander => "Commander",
            Self::Subordinate => "Subordinate",
            Self::Liege => "Liege",
            Self::Retainer => "Retainer",
            Self::Sibling => "Sibling",
            Self::Member => "Member",
            Self::Peer => "Peer",
        }
    }

    /// Rows of these types are computed from shared membership, never stored.
    pub fn is_derived(self) -> bool {
        matches!(self, Self::Sibling | Self::Peer)
    }

    /// Types backed by the terms of a liaison union.
    pub fn is_liaison(self) -> bool {
        matches!(self, Self::Spouse | Self::Concubine | Self::Lover)
    }

    /// Types stored as a participant link in a union.
    pub fn is_persistable(self) -> bool {
        self.is_liaison() || matches!(self, Self::Parents | Self::Child | Self::Member)
    }

    /// Whether a row of this type may be chosen in an editor.
    pub fn is_editable(self) -> bool {
        !self.is_derived()
    }
}

impl TryFrom<u8> for RelationshipType {
    type Error = RosterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.code() == code)
            .ok_or(RosterError::UnknownCode {
                field: "relationship type",
                code,
            })
    }
}

impl From<RelationshipType> for u8 {
    fn from(t: RelationshipType) -> Self {
        t.code()
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One editable (or derived) line of a character's relationship list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RelationshipRow {
    #[serde(rename = "type")]
    pub kind: Option<RelationshipType>,
    pub source: Option<UnionId>,
    pub target: Option<CharacterId>,
}

impl RelationshipRow {
    pub fn new(kind: RelationshipType, source: UnionId, target: CharacterId) -> Self {
        Self {
            kind: Some(kind),
            source: Some(source),
            target: Some(target),
        }
    }

    /// A row computed from shared membership (`source` is the derived marker).
    pub fn derived(kind: RelationshipType, target: CharacterId) -> Self {
        Self::new(kind, UnionId::DERIVED, target)
    }

    pub fn is_derived(&self) -> bool {
        self.kind.is_some_and(RelationshipType::is_derived)
            || self.source.is_some_and(UnionId::is_derived)
    }

    /// The union this row is persisted in, if any.
    pub fn union(&self) -> Option<UnionId> {
        self.source.filter(|s| !s.is_derived())
    }
}
