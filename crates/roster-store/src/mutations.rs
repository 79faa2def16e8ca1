//! Write operations against the REST union store.
//!
//! Each call is a single request. Multi-step sequences (create a union, then
//! add its participants) are composed by the caller and are not atomic.

use reqwest::Method;
use serde::Deserialize;

use roster_core::{CharacterId, ParticipantLink, UnionDraft, UnionId, UnionTerms};

use crate::client::{HttpUnionStore, StoreError};

#[derive(Deserialize)]
struct Created {
    id: UnionId,
}

impl HttpUnionStore {
    pub async fn post_union(&self, draft: UnionDraft) -> Result<UnionId, StoreError> {
        let created: Created = self
            .send_json(Method::POST, "/partnerships", &draft)
            .await?;
        tracing::info!(union_id = %created.id, kind = ?draft.kind, "Union created");
        Ok(created.id)
    }

    pub async fn put_union(&self, id: UnionId, terms: UnionTerms) -> Result<(), StoreError> {
        self.send(Method::PUT, &format!("/partnerships/{id}"), Some(&terms))
            .await?;
        tracing::info!(union_id = %id, ?terms, "Union updated");
        Ok(())
    }

    pub async fn post_participants(
        &self,
        id: UnionId,
        links: &[ParticipantLink],
    ) -> Result<(), StoreError> {
        self.send(
            Method::POST,
            &format!("/partnerships/{id}/participants"),
            Some(&links),
        )
        .await?;
        tracing::info!(union_id = %id, added = links.len(), "Participants added");
        Ok(())
    }

    pub async fn delete_participant(
        &self,
        id: UnionId,
        character: CharacterId,
    ) -> Result<(), StoreError> {
        self.send::<()>(
            Method::DELETE,
            &format!("/partnerships/{id}/participants/{character}"),
            None,
        )
        .await?;
        tracing::info!(union_id = %id, %character, "Participant removed");
        Ok(())
    }
}
