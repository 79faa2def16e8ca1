//! Error types for the roster-relations crate.

use thiserror::Error;

use roster_core::{CharacterId, UnionId};
use roster_store::StoreError;

#[derive(Error, Debug)]
pub enum RelationsError {
    /// Listing a character's connections failed. No local state changed.
    #[error("Failed to fetch connections for character {character_id}: {source}")]
    Fetch {
        character_id: CharacterId,
        #[source]
        source: StoreError,
    },

    /// A create/update/add/remove call failed. The edit was not applied.
    #[error("Union store call {call} failed: {source}")]
    Mutation {
        call: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Union {union_id} was created but its participants could not be added: {source}")]
    OrphanUnion {
        union_id: UnionId,
        #[source]
        source: StoreError,
    },

    #[error("Row {index} is derived from shared membership and cannot be edited")]
    DerivedRow { index: usize },

    #[error("Row index {index} out of range ({len} rows)")]
    RowIndex { index: usize, len: usize },

    #[error("Journal error: {0}")]
    Journal(#[from] roster_journal::store::StoreError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RelationsError>;
