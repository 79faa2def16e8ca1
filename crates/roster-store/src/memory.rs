//! In-memory union store.
//!
//! Holds characters and unions in ordered maps and answers the same calls as
//! the REST backend. Used by tests (with call logging and failure injection)
//! and by the CLI for offline JSON fixtures.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use roster_core::{
    Character, CharacterId, CharacterSummary, FactionOption, Participant, ParticipantLink, Sex,
    Union, UnionDraft, UnionId, UnionKind, UnionTerms,
};

use crate::client::StoreError;
use crate::store::UnionStore;

/// A union as persisted: participants are bare links, hydrated on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUnion {
    pub id: UnionId,
    #[serde(rename = "type")]
    pub kind: UnionKind,
    #[serde(default)]
    pub legitimate: bool,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub participants: Vec<ParticipantLink>,
}

/// Serializable contents of a [`MemoryUnionStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub unions: Vec<StoredUnion>,
    /// Display names of faction unions.
    #[serde(default)]
    pub factions: Vec<FactionOption>,
}

/// The store operations, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreCall {
    FetchConnections,
    FetchNamedFactions,
    FetchCharacter,
    ListCharacters,
    CreateUnion,
    UpdateUnion,
    AddParticipants,
    RemoveParticipant,
}

impl StoreCall {
    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::CreateUnion | Self::UpdateUnion | Self::AddParticipants | Self::RemoveParticipant
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchConnections => "fetch_connections",
            Self::FetchNamedFactions => "fetch_named_factions",
            Self::FetchCharacter => "fetch_character",
            Self::ListCharacters => "list_characters",
            Self::CreateUnion => "create_union",
            Self::UpdateUnion => "update_union",
            Self::AddParticipants => "add_participants",
            Self::RemoveParticipant => "remove_participant",
        }
    }
}

#[derive(Default)]
struct Inner {
    characters: BTreeMap<CharacterId, Character>,
    unions: BTreeMap<UnionId, StoredUnion>,
    faction_names: BTreeMap<UnionId, String>,
    calls: Vec<StoreCall>,
    failing: HashSet<StoreCall>,
}

#[derive(Default)]
pub struct MemoryUnionStore {
    inner: Mutex<Inner>,
}

impl MemoryUnionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let inner = Inner {
            characters: snapshot.characters.into_iter().map(|c| (c.id, c)).collect(),
            unions: snapshot.unions.into_iter().map(|u| (u.id, u)).collect(),
            faction_names: snapshot
                .factions
                .into_iter()
                .map(|f| (f.id, f.name))
                .collect(),
            ..Default::default()
        };
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let snapshot: Snapshot =
            serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn snapshot(&self) -> Snapshot {
        let inner = self.lock();
        Snapshot {
            characters: inner.characters.values().cloned().collect(),
            unions: inner.unions.values().cloned().collect(),
            factions: inner
                .faction_names
                .iter()
                .map(|(id, name)| FactionOption {
                    id: *id,
                    name: name.clone(),
                })
                .collect(),
        }
    }

    pub fn insert_character(&self, character: Character) {
        self.lock().characters.insert(character.id, character);
    }

    pub fn insert_union(&self, union: StoredUnion) {
        self.lock().unions.insert(union.id, union);
    }

    pub fn name_faction(&self, id: UnionId, name: &str) {
        self.lock().faction_names.insert(id, name.to_string());
    }

    /// Make every subsequent `call` fail with a 500 status.
    pub fn fail_on(&self, call: StoreCall) {
        self.lock().failing.insert(call);
    }

    pub fn clear_failures(&self) {
        self.lock().failing.clear();
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.lock().calls.iter().filter(|c| c.is_mutation()).count()
    }

    pub fn union(&self, id: UnionId) -> Option<StoredUnion> {
        self.lock().unions.get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Log the call and apply failure injection.
    fn begin(&self, call: StoreCall) -> Result<MutexGuard<'_, Inner>, StoreError> {
        let mut inner = self.lock();
        inner.calls.push(call);
        if inner.failing.contains(&call) {
            return Err(StoreError::Status {
                method: "MEMORY".to_string(),
                path: call.as_str().to_string(),
                status: 500,
                body: "injected failure".to_string(),
            });
        }
        Ok(inner)
    }
}

impl Inner {
    fn hydrate(&self, stored: &StoredUnion) -> Union {
        Union {
            id: stored.id,
            kind: stored.kind,
            legitimate: stored.legitimate,
            is_primary: stored.is_primary,
            participants: stored
                .participants
                .iter()
                .map(|link| {
                    let (name, sex) = self
                        .characters
                        .get(&link.character_id)
                        .map(|c| (c.name.clone(), c.sex))
                        .unwrap_or_else(|| (String::new(), Sex::default()));
                    Participant {
                        id: link.character_id,
                        role: link.role,
                        name,
                        sex,
                    }
                })
                .collect(),
        }
    }

    fn union_mut(&mut self, id: UnionId) -> Result<&mut StoredUnion, StoreError> {
        self.unions
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                entity: "union",
                id: id.0,
            })
    }
}

#[async_trait]
impl UnionStore for MemoryUnionStore {
    async fn fetch_connections(
        &self,
        character: CharacterId,
        degree: u32,
    ) -> Result<Vec<Union>, StoreError> {
        let inner = self.begin(StoreCall::FetchConnections)?;

        let mut found: BTreeSet<UnionId> = BTreeSet::new();
        let mut reached: BTreeSet<CharacterId> = BTreeSet::from([character]);
        let mut frontier = reached.clone();

        for _ in 0..=degree {
            let mut next = BTreeSet::new();
            for union in inner.unions.values() {
                if found.contains(&union.id) {
                    continue;
                }
                if union
                    .participants
                    .iter()
                    .any(|p| frontier.contains(&p.character_id))
                {
                    found.insert(union.id);
                    for p in &union.participants {
                        if reached.insert(p.character_id) {
                            next.insert(p.character_id);
                        }
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Ok(found
            .iter()
            .filter_map(|id| inner.unions.get(id))
            .map(|u| inner.hydrate(u))
            .collect())
    }

    async fn fetch_named_factions(&self) -> Result<Vec<FactionOption>, StoreError> {
        let inner = self.begin(StoreCall::FetchNamedFactions)?;
        Ok(inner
            .faction_names
            .iter()
            .filter(|(id, _)| {
                inner
                    .unions
                    .get(id)
                    .is_some_and(|u| u.kind == UnionKind::Faction)
            })
            .map(|(id, name)| FactionOption {
                id: *id,
                name: name.clone(),
            })
            .collect())
    }

    async fn fetch_character(&self, id: CharacterId) -> Result<Character, StoreError> {
        let inner = self.begin(StoreCall::FetchCharacter)?;
        inner
            .characters
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "character",
                id: id.0,
            })
    }

    async fn list_characters(&self) -> Result<Vec<CharacterSummary>, StoreError> {
        let inner = self.begin(StoreCall::ListCharacters)?;
        let mut listing: Vec<CharacterSummary> = inner
            .characters
            .values()
            .map(|c| CharacterSummary {
                id: c.id,
                name: c.name.clone(),
            })
            .collect();
        listing.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(listing)
    }

    async fn create_union(&self, draft: UnionDraft) -> Result<UnionId, StoreError> {
        let mut inner = self.begin(StoreCall::CreateUnion)?;
        let id = UnionId(inner.unions.keys().next_back().map_or(1, |last| last.0 + 1));
        inner.unions.insert(
            id,
            StoredUnion {
                id,
                kind: draft.kind,
                legitimate: draft.legitimate,
                is_primary: draft.is_primary,
                participants: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn update_union(&self, id: UnionId, terms: UnionTerms) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreCall::UpdateUnion)?;
        let union = inner.union_mut(id)?;
        union.legitimate = terms.legitimate;
        union.is_primary = terms.is_primary;
        Ok(())
    }

    async fn add_participants(
        &self,
        id: UnionId,
        links: &[ParticipantLink],
    ) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreCall::AddParticipants)?;
        if let Some(missing) = links
            .iter()
            .find(|l| !inner.characters.contains_key(&l.character_id))
        {
            return Err(StoreError::NotFound {
                entity: "character",
                id: missing.character_id.0,
            });
        }

        let union = inner.union_mut(id)?;
        for link in links {
            match union
                .participants
                .iter_mut()
                .find(|p| p.character_id == link.character_id)
            {
                Some(existing) => existing.role = link.role,
                None => union.participants.push(*link),
            }
        }
        Ok(())
    }

    async fn remove_participant(
        &self,
        id: UnionId,
        character: CharacterId,
    ) -> Result<(), StoreError> {
        let mut inner = self.begin(StoreCall::RemoveParticipant)?;
        let union = inner.union_mut(id)?;
        let before = union.participants.len();
        union.participants.retain(|p| p.character_id != character);
        if union.participants.len() == before {
            return Err(StoreError::NotFound {
                entity: "participant",
                id: character.0,
            });
        }
        Ok(())
    }
}
