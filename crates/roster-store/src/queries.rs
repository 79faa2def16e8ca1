//! Read operations against the REST union store.

use roster_core::{Character, CharacterId, CharacterSummary, FactionOption, Union};

use crate::client::{HttpUnionStore, StoreError};

impl HttpUnionStore {
    /// Unions reachable within `degree` hops of a character.
    ///
    /// Degree 0 returns only the unions that directly contain the character.
    pub async fn get_connections(
        &self,
        character: CharacterId,
        degree: u32,
    ) -> Result<Vec<Union>, StoreError> {
        let path = connections_path(character, degree);
        let unions: Vec<Union> = self.get_json(&path).await?;
        tracing::debug!(%character, degree, unions = unions.len(), "Fetched connections");
        Ok(unions)
    }

    pub async fn get_named_factions(&self) -> Result<Vec<FactionOption>, StoreError> {
        self.get_json("/factions").await
    }

    pub async fn get_character(&self, id: CharacterId) -> Result<Character, StoreError> {
        match self.get_json(&format!("/characters/{id}")).await {
            Err(StoreError::Status { status: 404, .. }) => Err(StoreError::NotFound {
                entity: "character",
                id: id.0,
            }),
            other => other,
        }
    }

    /// Id/name listing of every character, sorted by name.
    pub async fn get_character_ids(&self) -> Result<Vec<CharacterSummary>, StoreError> {
        self.get_json("/characters?fields=id,name&sort=name").await
    }
}

fn connections_path(character: CharacterId, degree: u32) -> String {
    if degree == 0 {
        format!("/characters/{character}/connections")
    } else {
        format!("/characters/{character}/connections?degree={degree}")
    }
}
