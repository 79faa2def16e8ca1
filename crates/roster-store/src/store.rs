//! The union store interface consumed by the relationship engine.

use std::sync::Arc;

use async_trait::async_trait;

use roster_core::{
    Character, CharacterId, CharacterSummary, FactionOption, ParticipantLink, Union, UnionDraft,
    UnionId, UnionTerms,
};

use crate::client::{HttpUnionStore, StoreError};

/// Snapshot reads and mutation requests against the union store.
///
/// Implementations perform no retries; every failure is returned as-is.
#[async_trait]
pub trait UnionStore: Send + Sync {
    /// Unions reachable within `degree` hops of `character`.
    async fn fetch_connections(
        &self,
        character: CharacterId,
        degree: u32,
    ) -> Result<Vec<Union>, StoreError>;

    async fn fetch_named_factions(&self) -> Result<Vec<FactionOption>, StoreError>;

    async fn fetch_character(&self, id: CharacterId) -> Result<Character, StoreError>;

    async fn list_characters(&self) -> Result<Vec<CharacterSummary>, StoreError>;

    async fn create_union(&self, draft: UnionDraft) -> Result<UnionId, StoreError>;

    async fn update_union(&self, id: UnionId, terms: UnionTerms) -> Result<(), StoreError>;

    async fn add_participants(
        &self,
        id: UnionId,
        links: &[ParticipantLink],
    ) -> Result<(), StoreError>;

    async fn remove_participant(
        &self,
        id: UnionId,
        character: CharacterId,
    ) -> Result<(), StoreError>;
}

#[async_trait]
impl UnionStore for HttpUnionStore {
    async fn fetch_connections(
        &self,
        character: CharacterId,
        degree: u32,
    ) -> Result<Vec<Union>, StoreError> {
        self.get_connections(character, degree).await
    }

    async fn fetch_named_factions(&self) -> Result<Vec<FactionOption>, StoreError> {
        self.get_named_factions().await
    }

    async fn fetch_character(&self, id: CharacterId) -> Result<Character, StoreError> {
        self.get_character(id).await
    }

    async fn list_characters(&self) -> Result<Vec<CharacterSummary>, StoreError> {
        self.get_character_ids().await
    }

    async fn create_union(&self, draft: UnionDraft) -> Result<UnionId, StoreError> {
        self.post_union(draft).await
    }

    async fn update_union(&self, id: UnionId, terms: UnionTerms) -> Result<(), StoreError> {
        self.put_union(id, terms).await
    }

    async fn add_participants(
        &self,
        id: UnionId,
        links: &[ParticipantLink],
    ) -> Result<(), StoreError> {
        self.post_participants(id, links).await
    }

    async fn remove_participant(
        &self,
        id: UnionId,
        character: CharacterId,
    ) -> Result<(), StoreError> {
        self.delete_participant(id, character).await
    }
}

#[async_trait]
impl<S: UnionStore + ?Sized> UnionStore for Arc<S> {
    async fn fetch_connections(
        &self,
        character: CharacterId,
        degree: u32,
    ) -> Result<Vec<Union>, StoreError> {
        (**self).fetch_connections(character, degree).await
    }

    async fn fetch_named_factions(&self) -> Result<Vec<FactionOption>, StoreError> {
        (**self).fetch_named_factions().await
    }

    async fn fetch_character(&self, id: CharacterId) -> Result<Character, StoreError> {
        (**self).fetch_character(id).await
    }

    async fn list_characters(&self) -> Result<Vec<CharacterSummary>, StoreError> {
        (**self).list_characters().await
    }

    async fn create_union(&self, draft: UnionDraft) -> Result<UnionId, StoreError> {
        (**self).create_union(draft).await
    }

    async fn update_union(&self, id: UnionId, terms: UnionTerms) -> Result<(), StoreError> {
        (**self).update_union(id, terms).await
    }

    async fn add_participants(
        &self,
        id: UnionId,
        links: &[ParticipantLink],
    ) -> Result<(), StoreError> {
        (**self).add_participants(id, links).await
    }

    async fn remove_participant(
        &self,
        id: UnionId,
        character: CharacterId,
    ) -> Result<(), StoreError> {
        (**self).remove_participant(id, character).await
    }
}
