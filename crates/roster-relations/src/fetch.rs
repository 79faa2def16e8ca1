//! Reads from the union store, mapped onto relations errors.

use roster_core::{Character, CharacterId, CharacterSummary, Union};
use roster_store::UnionStore;

use crate::error::{RelationsError, Result};

/// Fetch the unions within `degree` hops of `character`.
pub async fn fetch_connections(
    store: &dyn UnionStore,
    character: CharacterId,
    degree: u32,
) -> Result<Vec<Union>> {
    store
        .fetch_connections(character, degree)
        .await
        .map_err(|source| RelationsError::Fetch {
            character_id: character,
            source,
        })
}

/// Fetch a character's record, connections and the roster listing
/// concurrently. Fails as soon as any of the three fails.
pub async fn fetch_character_page(
    store: &dyn UnionStore,
    character: CharacterId,
    degree: u32,
) -> Result<(Character, Vec<Union>, Vec<CharacterSummary>)> {
    tokio::try_join!(
        async {
            store
                .fetch_character(character)
                .await
                .map_err(RelationsError::from)
        },
        fetch_connections(store, character, degree),
        async { store.list_characters().await.map_err(RelationsError::from) },
    )
}
