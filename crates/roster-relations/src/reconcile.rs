//! Reconciliation of relationship-row edits with the union store.
//!
//! A [`RelationEditor`] holds one character's expanded rows. Each edit is
//! applied to a copy of the row and the result decides what happens:
//!
//! | row after the edit                            | store calls                                   |
//! |-----------------------------------------------|-----------------------------------------------|
//! | Spouse/Concubine/Lover, source, target        | `update_union`                                |
//! | Spouse/Concubine/Lover, no source, target     | `create_union`, then `add_participants` ×2    |
//! | Parents, source, target                       | `add_participants` (target as Child)          |
//! | Child, source                                 | `add_participants` (focal as Child)           |
//! | Member, source                                | `add_participants` (focal as Member)          |
//! | deleted, stored type, union source and target | `remove_participant`                          |
//! | anything else                                 | none, the row is kept locally                 |
//!
//! After a successful call every local row is discarded and the list is
//! rebuilt from a fresh fetch. A failed call leaves the rows as they were.
//! Create-then-add is not atomic: if adding participants fails, the new
//! union is left behind and reported as [`RelationsError::OrphanUnion`].

use std::sync::Arc;

use roster_core::events::{EventPayload, EventSource, RosterEvent};
use roster_core::{
    decode, CharacterId, ParticipantLink, RelationshipRow, RelationshipType, Role, Union,
    UnionDraft, UnionId, UnionKind, UnionOption, UnionTerms,
};
use roster_journal::session::JournalSession;
use roster_journal::Outcome;
use roster_store::{StoreError, UnionStore};

use crate::error::{RelationsError, Result};
use crate::expand::expand;
use crate::fetch::fetch_connections;
use crate::journal::{self, SharedJournal};
use crate::types::{ApplyReport, Edit, Effect, Expansion};

/// A store mutation chosen for an edited row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    UpdateTerms {
        union_id: UnionId,
        terms: UnionTerms,
    },
    CreateLiaison {
        terms: UnionTerms,
        partner: CharacterId,
    },
    AddParticipant {
        union_id: UnionId,
        link: ParticipantLink,
    },
    RemoveParticipant {
        union_id: UnionId,
        character: CharacterId,
    },
}

impl Mutation {
    fn name(self) -> &'static str {
        match self {
            Mutation::UpdateTerms { .. } => "update_union",
            Mutation::CreateLiaison { .. } => "create_liaison",
            Mutation::AddParticipant { .. } => "add_participants",
            Mutation::RemoveParticipant { .. } => "remove_participant",
        }
    }

    fn rationale(self) -> &'static str {
        match self {
            Mutation::UpdateTerms { .. } => "Partnership row backed by an existing union",
            Mutation::CreateLiaison { .. } => "Partnership row with a partner but no union",
            Mutation::AddParticipant { link, .. } => match link.role {
                Role::Child => "Parent union and child selected",
                _ => "Faction selected for the focal character",
            },
            Mutation::RemoveParticipant { .. } => "Stored row deleted",
        }
    }
}

/// Apply `edit` to a copy of `row` using the editor's local rules.
///
/// Choosing `Parents` clears source and target; a `Child` row always
/// targets the focal character.
fn edit_row(row: RelationshipRow, edit: Edit, focal: CharacterId) -> RelationshipRow {
    let mut row = row;
    match edit {
        Edit::SetType(kind) => {
            row.kind = Some(kind);
            if kind == RelationshipType::Parents {
                row.source = None;
                row.target = None;
            }
        }
        Edit::SetSource(source) => row.source = source,
        Edit::SetTarget(target) => row.target = target,
        Edit::Delete => {}
    }
    if row.kind == Some(RelationshipType::Child) {
        row.target = Some(focal);
    }
    row
}

/// Decide which store call, if any, persists `row`.
fn plan(row: &RelationshipRow, focal: CharacterId) -> Option<Mutation> {
    let kind = row.kind?;
    let source = row.union();

    if let Some(terms) = decode(kind) {
        let partner = row.target?;
        return Some(match source {
            Some(union_id) => Mutation::UpdateTerms { union_id, terms },
            None => Mutation::CreateLiaison { terms, partner },
        });
    }

    let (union_id, link) = match kind {
        RelationshipType::Parents => (
            source?,
            ParticipantLink {
                character_id: row.target?,
                role: Role::Child,
            },
        ),
        RelationshipType::Child => (
            source?,
            ParticipantLink {
                character_id: focal,
                role: Role::Child,
            },
        ),
        RelationshipType::Member => (
            source?,
            ParticipantLink {
                character_id: focal,
                role: Role::Member,
            },
        ),
        _ => return None,
    };
    Some(Mutation::AddParticipant { union_id, link })
}

fn editor_event(payload: EventPayload) -> RosterEvent {
    RosterEvent::new(EventSource::Editor, payload)
}

/// Journal one store call, if a session is open.
fn note(
    session: &mut Option<JournalSession>,
    call: &str,
    params: serde_json::Value,
    error: Option<&StoreError>,
) {
    if let Some(session) = session.as_mut() {
        journal::record_call(
            session,
            call,
            params,
            error.map(|e| e as &dyn std::error::Error),
        );
    }
}

/// The editable relationship list of one character.
///
/// Edits take `&mut self`, so a second edit cannot start until the previous
/// mutate, re-fetch, re-expand round trip has finished.
pub struct RelationEditor {
    store: Arc<dyn UnionStore>,
    journal: Option<SharedJournal>,
    focal: CharacterId,
    degree: u32,
    unions: Vec<Union>,
    expansion: Expansion,
}

impl RelationEditor {
    /// Fetch `focal`'s connections and expand them.
    pub async fn load(store: Arc<dyn UnionStore>, focal: CharacterId, degree: u32) -> Result<Self> {
        let unions = fetch_connections(store.as_ref(), focal, degree).await?;
        let expansion = expand(&unions, focal);
        Ok(Self {
            store,
            journal: None,
            focal,
            degree,
            unions,
            expansion,
        })
    }

    /// Record every reconciliation that reaches the store.
    pub fn with_journal(mut self, journal: SharedJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn focal(&self) -> CharacterId {
        self.focal
    }

    pub fn rows(&self) -> &[RelationshipRow] {
        &self.expansion.relations
    }

    /// Liaisons that may be chosen as a row's source.
    pub fn options(&self) -> &[UnionOption] {
        &self.expansion.unions
    }

    /// Faction unions among the loaded connections, named or not.
    pub fn factions(&self) -> impl Iterator<Item = &Union> {
        self.unions.iter().filter(|u| u.kind == UnionKind::Faction)
    }

    pub fn expansion(&self) -> &Expansion {
        &self.expansion
    }

    /// Append an empty row and return its index.
    pub fn add_row(&mut self) -> usize {
        self.expansion.relations.push(RelationshipRow::default());
        self.expansion.relations.len() - 1
    }

    /// Discard local rows and re-expand from a fresh fetch.
    pub async fn refresh(&mut self) -> Result<()> {
        let unions = fetch_connections(self.store.as_ref(), self.focal, self.degree).await?;
        self.expansion = expand(&unions, self.focal);
        self.unions = unions;
        Ok(())
    }

    /// Apply one edit to the row at `index`.
    pub async fn apply(&mut self, index: usize, edit: Edit) -> Result<ApplyReport> {
        let before = self.row(index)?;
        match edit {
            Edit::Delete => self.delete(index, before).await,
            _ => self.update(index, before, edit).await,
        }
    }

    fn row(&self, index: usize) -> Result<RelationshipRow> {
        self.expansion
            .relations
            .get(index)
            .copied()
            .ok_or(RelationsError::RowIndex {
                index,
                len: self.expansion.relations.len(),
            })
    }

    async fn delete(&mut self, index: usize, row: RelationshipRow) -> Result<ApplyReport> {
        let stored = !row.is_derived() && row.kind.is_some_and(RelationshipType::is_persistable);
        if let (true, Some(union_id), Some(character)) = (stored, row.union(), row.target) {
            let mutation = Mutation::RemoveParticipant {
                union_id,
                character,
            };
            return self.commit(row, Edit::Delete, row, mutation).await;
        }

        self.expansion.relations.remove(index);
        tracing::debug!(focal = %self.focal, index, "Removed row locally");
        Ok(ApplyReport::local(Effect::Removed))
    }

    async fn update(
        &mut self,
        index: usize,
        before: RelationshipRow,
        edit: Edit,
    ) -> Result<ApplyReport> {
        let derived_edit = match edit {
            Edit::SetType(kind) => kind.is_derived(),
            Edit::SetSource(source) => source.is_some_and(UnionId::is_derived),
            _ => false,
        };
        if before.is_derived() || derived_edit {
            return Err(RelationsError::DerivedRow { index });
        }

        let after = edit_row(before, edit, self.focal);
        match plan(&after, self.focal) {
            Some(mutation) => self.commit(before, edit, after, mutation).await,
            None => {
                if let Some(kind) = after.kind {
                    if !kind.is_persistable() {
                        tracing::warn!(
                            focal = %self.focal,
                            kind = %kind,
                            "Relationship type has no union representation; kept locally"
                        );
                    }
                }
                self.expansion.relations[index] = after;
                Ok(ApplyReport::local(Effect::Staged))
            }
        }
    }

    async fn commit(
        &mut self,
        before: RelationshipRow,
        edit: Edit,
        after: RelationshipRow,
        mutation: Mutation,
    ) -> Result<ApplyReport> {
        let mut session = self.journal.as_ref().map(|_| {
            let mut session =
                journal::start_edit_session(self.focal, mutation.name(), &before, &edit, &after);
            session.add_decision(mutation.name(), mutation.rationale());
            session
        });

        let result = self.execute(mutation, &mut session).await;

        let outcome = match &result {
            Ok(_) => Outcome::Committed,
            Err(RelationsError::OrphanUnion { .. }) => Outcome::Orphaned,
            Err(_) => Outcome::Failed,
        };
        let journal_id = match (session, &self.journal) {
            (Some(session), Some(store)) => {
                Some(journal::finalize_and_store(session, outcome, store).id.to_string())
            }
            _ => None,
        };

        let events = result?;
        self.refresh().await?;
        Ok(ApplyReport {
            effect: Effect::Committed,
            events,
            journal_id,
        })
    }

    async fn execute(
        &self,
        mutation: Mutation,
        session: &mut Option<JournalSession>,
    ) -> Result<Vec<RosterEvent>> {
        let store = self.store.as_ref();
        match mutation {
            Mutation::UpdateTerms { union_id, terms } => {
                let result = store.update_union(union_id, terms).await;
                note(
                    session,
                    "update_union",
                    serde_json::json!({ "union_id": union_id, "terms": terms }),
                    result.as_ref().err(),
                );
                result.map_err(|source| RelationsError::Mutation {
                    call: "update_union",
                    source,
                })?;
                Ok(vec![editor_event(EventPayload::UnionUpdated {
                    union_id,
                    terms,
                })])
            }

            Mutation::CreateLiaison { terms, partner } => {
                let draft = UnionDraft {
                    kind: UnionKind::Liaison,
                    legitimate: terms.legitimate,
                    is_primary: terms.is_primary,
                };
                let created = store.create_union(draft).await;
                note(
                    session,
                    "create_union",
                    serde_json::json!({ "draft": draft }),
                    created.as_ref().err(),
                );
                let union_id = created.map_err(|source| RelationsError::Mutation {
                    call: "create_union",
                    source,
                })?;

                let participants = vec![
                    ParticipantLink {
                        character_id: self.focal,
                        role: Role::Parent,
                    },
                    ParticipantLink {
                        character_id: partner,
                        role: Role::Parent,
                    },
                ];
                let added = store.add_participants(union_id, &participants).await;
                note(
                    session,
                    "add_participants",
                    serde_json::json!({ "union_id": union_id, "participants": participants }),
                    added.as_ref().err(),
                );
                if let Err(source) = added {
                    tracing::error!(
                        union_id = %union_id,
                        focal = %self.focal,
                        partner = %partner,
                        error = %source,
                        "Union created but its participants could not be added; orphan union left in store"
                    );
                    return Err(RelationsError::OrphanUnion { union_id, source });
                }

                Ok(vec![
                    editor_event(EventPayload::UnionCreated { union_id, terms }),
                    editor_event(EventPayload::ParticipantsAdded {
                        union_id,
                        participants,
                    }),
                ])
            }

            Mutation::AddParticipant { union_id, link } => {
                let result = store.add_participants(union_id, &[link]).await;
                note(
                    session,
                    "add_participants",
                    serde_json::json!({ "union_id": union_id, "participants": [link] }),
                    result.as_ref().err(),
                );
                result.map_err(|source| RelationsError::Mutation {
                    call: "add_participants",
                    source,
                })?;
                Ok(vec![editor_event(EventPayload::ParticipantsAdded {
                    union_id,
                    participants: vec![link],
                })])
            }

            Mutation::RemoveParticipant {
                union_id,
                character,
            } => {
                let result = store.remove_participant(union_id, character).await;
                note(
                    session,
                    "remove_participant",
                    serde_json::json!({ "union_id": union_id, "character_id": character }),
                    result.as_ref().err(),
                );
                result.map_err(|source| RelationsError::Mutation {
                    call: "remove_participant",
                    source,
                })?;
                Ok(vec![editor_event(EventPayload::ParticipantRemoved {
                    union_id,
                    character_id: character,
                })])
            }
        }
    }
}

impl RelationsError {
    /// The event describing an inconsistency this error left in the store.
    pub fn event(&self) -> Option<RosterEvent> {
        match self {
            RelationsError::OrphanUnion { union_id, .. } => {
                Some(editor_event(EventPayload::OrphanUnion {
                    union_id: *union_id,
                }))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{Character, Sex};
    use roster_journal::store::JournalQuery;
    use roster_store::memory::StoredUnion;
    use roster_store::{MemoryUnionStore, StoreCall};

    fn character(id: i64, name: &str) -> Character {
        Character {
            id: CharacterId(id),
            name: name.to_string(),
            appearance: String::new(),
            sex: Sex::Female,
            images: vec![],
            roleplaying: vec![],
            background: String::new(),
        }
    }

    fn link(id: i64, role: Role) -> ParticipantLink {
        ParticipantLink {
            character_id: CharacterId(id),
            role,
        }
    }

    /// Alice & Bob (union 5) with Carol and Dan; Alice and Fay in faction 8;
    /// Gwen unattached.
    fn roster() -> Arc<MemoryUnionStore> {
        let store = MemoryUnionStore::new();
        for (id, name) in [
            (1, "Alice"),
            (2, "Bob"),
            (3, "Carol"),
            (4, "Dan"),
            (6, "Fay"),
            (7, "Gwen"),
        ] {
            store.insert_character(character(id, name));
        }
        store.insert_union(StoredUnion {
            id: UnionId(5),
            kind: UnionKind::Liaison,
            legitimate: true,
            is_primary: true,
            participants: vec![
                link(1, Role::Parent),
                link(2, Role::Parent),
                link(3, Role::Child),
                link(4, Role::Child),
            ],
        });
        store.insert_union(StoredUnion {
            id: UnionId(8),
            kind: UnionKind::Faction,
            legitimate: false,
            is_primary: false,
            participants: vec![link(1, Role::Member), link(6, Role::Member)],
        });
        store.name_faction(UnionId(8), "Night Watch");
        Arc::new(store)
    }

    async fn editor(store: &Arc<MemoryUnionStore>, focal: i64) -> RelationEditor {
        let shared: Arc<dyn UnionStore> = store.clone();
        RelationEditor::load(shared, CharacterId(focal), 0)
            .await
            .unwrap()
    }

    #[test]
    fn local_edit_rules() {
        let focal = CharacterId(9);
        let row = RelationshipRow::new(RelationshipType::Spouse, UnionId(5), CharacterId(2));

        let parents = edit_row(row, Edit::SetType(RelationshipType::Parents), focal);
        assert_eq!(parents.source, None);
        assert_eq!(parents.target, None);

        let child = edit_row(row, Edit::SetType(RelationshipType::Child), focal);
        assert_eq!(child.target, Some(focal));
        let child = edit_row(child, Edit::SetTarget(Some(CharacterId(4))), focal);
        assert_eq!(child.target, Some(focal));
    }

    #[test]
    fn planning_follows_row_shape() {
        let focal = CharacterId(1);
        let terms = decode(RelationshipType::Concubine).unwrap();

        let row = RelationshipRow::new(RelationshipType::Concubine, UnionId(5), CharacterId(2));
        assert_eq!(
            plan(&row, focal),
            Some(Mutation::UpdateTerms {
                union_id: UnionId(5),
                terms
            })
        );

        let unsaved = RelationshipRow {
            source: None,
            ..row
        };
        assert_eq!(
            plan(&unsaved, focal),
            Some(Mutation::CreateLiaison {
                terms,
                partner: CharacterId(2)
            })
        );

        let no_target = RelationshipRow {
            target: None,
            ..row
        };
        assert_eq!(plan(&no_target, focal), None);

        let guardian = RelationshipRow::new(RelationshipType::Guardian, UnionId(5), CharacterId(2));
        assert_eq!(plan(&guardian, focal), None);
        assert_eq!(plan(&RelationshipRow::default(), focal), None);
    }

    #[tokio::test]
    async fn changing_partnership_type_updates_union() {
        let store = roster();
        let mut editor = editor(&store, 1).await;
        assert_eq!(editor.rows()[0].kind, Some(RelationshipType::Spouse));

        let report = editor
            .apply(0, Edit::SetType(RelationshipType::Lover))
            .await
            .unwrap();

        assert_eq!(report.effect, Effect::Committed);
        assert_eq!(report.events.len(), 1);
        assert!(!store.union(UnionId(5)).unwrap().legitimate);
        assert_eq!(editor.rows()[0].kind, Some(RelationshipType::Lover));
        assert_eq!(store.mutation_count(), 1);
    }

    #[tokio::test]
    async fn new_partner_creates_union_then_adds_both() {
        let store = roster();
        let mut editor = editor(&store, 1).await;
        let index = editor.add_row();

        let staged = editor
            .apply(index, Edit::SetType(RelationshipType::Concubine))
            .await
            .unwrap();
        assert_eq!(staged.effect, Effect::Staged);
        assert_eq!(store.mutation_count(), 0);

        let report = editor
            .apply(index, Edit::SetTarget(Some(CharacterId(7))))
            .await
            .unwrap();
        assert_eq!(report.effect, Effect::Committed);
        assert!(matches!(
            report.events[0].payload,
            EventPayload::UnionCreated {
                union_id: UnionId(9),
                ..
            }
        ));

        let created = store.union(UnionId(9)).unwrap();
        assert!(created.legitimate && !created.is_primary);
        assert_eq!(
            created.participants,
            vec![link(1, Role::Parent), link(7, Role::Parent)]
        );
        assert!(editor.rows().contains(&RelationshipRow::new(
            RelationshipType::Concubine,
            UnionId(9),
            CharacterId(7)
        )));
        assert!(editor
            .options()
            .iter()
            .any(|o| o.value == UnionId(9) && o.label == "Alice & Gwen"));
    }

    #[tokio::test]
    async fn failed_participant_add_reports_orphan_union() {
        let store = roster();
        let dir = tempfile::tempdir().unwrap();
        let journal = journal::open(dir.path().to_str().unwrap()).unwrap();
        let mut editor = editor(&store, 1).await.with_journal(journal.clone());

        let index = editor.add_row();
        editor
            .apply(index, Edit::SetType(RelationshipType::Lover))
            .await
            .unwrap();
        store.fail_on(StoreCall::AddParticipants);

        let err = editor
            .apply(index, Edit::SetTarget(Some(CharacterId(7))))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelationsError::OrphanUnion {
                union_id: UnionId(9),
                ..
            }
        ));
        assert_eq!(
            err.event().map(|e| e.payload),
            Some(EventPayload::OrphanUnion {
                union_id: UnionId(9)
            })
        );

        // The union exists without participants; the local row is unchanged.
        assert!(store.union(UnionId(9)).unwrap().participants.is_empty());
        assert_eq!(editor.rows()[index].target, None);

        let entries = journal
            .list(&JournalQuery {
                outcome: Some(Outcome::Orphaned),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].steps.len(), 2);
        assert!(entries[0].steps[0].success);
        assert!(!entries[0].steps[1].success);
    }

    #[tokio::test]
    async fn parents_row_adds_child() {
        let store = roster();
        let mut editor = editor(&store, 1).await;
        let index = editor.add_row();

        for edit in [
            Edit::SetType(RelationshipType::Parents),
            Edit::SetSource(Some(UnionId(5))),
        ] {
            let report = editor.apply(index, edit).await.unwrap();
            assert_eq!(report.effect, Effect::Staged);
        }
        editor
            .apply(index, Edit::SetTarget(Some(CharacterId(7))))
            .await
            .unwrap();

        assert!(store
            .union(UnionId(5))
            .unwrap()
            .participants
            .contains(&link(7, Role::Child)));
        assert!(editor.rows().contains(&RelationshipRow::new(
            RelationshipType::Parents,
            UnionId(5),
            CharacterId(7)
        )));
    }

    #[tokio::test]
    async fn child_row_joins_focal_to_parent_union() {
        let store = roster();
        let mut editor = editor(&store, 7).await;
        assert!(editor.rows().is_empty());

        let index = editor.add_row();
        editor
            .apply(index, Edit::SetType(RelationshipType::Child))
            .await
            .unwrap();
        assert_eq!(editor.rows()[index].target, Some(CharacterId(7)));

        editor
            .apply(index, Edit::SetSource(Some(UnionId(5))))
            .await
            .unwrap();

        assert_eq!(
            editor.rows(),
            &[
                RelationshipRow::derived(RelationshipType::Sibling, CharacterId(3)),
                RelationshipRow::derived(RelationshipType::Sibling, CharacterId(4)),
            ]
        );
    }

    #[tokio::test]
    async fn deleting_derived_rows_never_calls_store() {
        let store = roster();
        let mut editor = editor(&store, 3).await;
        assert_eq!(editor.rows().len(), 1);
        let calls_after_load = store.calls().len();

        let report = editor.apply(0, Edit::Delete).await.unwrap();
        assert_eq!(report.effect, Effect::Removed);
        assert!(editor.rows().is_empty());
        assert_eq!(store.calls().len(), calls_after_load);
    }

    #[tokio::test]
    async fn deleting_peer_row_never_calls_store() {
        let store = roster();
        let mut editor = editor(&store, 1).await;
        let peer = editor
            .rows()
            .iter()
            .position(|r| r.kind == Some(RelationshipType::Peer))
            .unwrap();

        editor.apply(peer, Edit::Delete).await.unwrap();
        assert_eq!(store.mutation_count(), 0);
        assert_eq!(store.union(UnionId(8)).unwrap().participants.len(), 2);
    }

    #[tokio::test]
    async fn derived_rows_cannot_be_edited() {
        let store = roster();
        let mut editor = editor(&store, 3).await;

        let err = editor
            .apply(0, Edit::SetTarget(Some(CharacterId(2))))
            .await
            .unwrap_err();
        assert!(matches!(err, RelationsError::DerivedRow { index: 0 }));

        let index = editor.add_row();
        let err = editor
            .apply(index, Edit::SetType(RelationshipType::Sibling))
            .await
            .unwrap_err();
        assert!(matches!(err, RelationsError::DerivedRow { .. }));
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn deleting_stored_row_removes_participant() {
        let store = roster();
        let mut editor = editor(&store, 1).await;
        let carol = RelationshipRow::new(RelationshipType::Parents, UnionId(5), CharacterId(3));
        let index = editor.rows().iter().position(|r| *r == carol).unwrap();

        let report = editor.apply(index, Edit::Delete).await.unwrap();
        assert_eq!(
            report.events[0].payload,
            EventPayload::ParticipantRemoved {
                union_id: UnionId(5),
                character_id: CharacterId(3)
            }
        );
        assert!(!editor.rows().contains(&carol));
        assert_eq!(store.calls().last(), Some(&StoreCall::FetchConnections));
    }

    #[tokio::test]
    async fn deleting_staged_row_keeps_store_links() {
        let store = roster();
        let mut editor = editor(&store, 1).await;
        let index = editor.add_row();

        for edit in [
            Edit::SetType(RelationshipType::Guardian),
            Edit::SetSource(Some(UnionId(5))),
            Edit::SetTarget(Some(CharacterId(3))),
        ] {
            let report = editor.apply(index, edit).await.unwrap();
            assert_eq!(report.effect, Effect::Staged);
        }

        let report = editor.apply(index, Edit::Delete).await.unwrap();
        assert_eq!(report.effect, Effect::Removed);
        assert_eq!(store.mutation_count(), 0);
        assert!(store
            .union(UnionId(5))
            .unwrap()
            .participants
            .contains(&link(3, Role::Child)));
    }

    #[tokio::test]
    async fn retyped_stored_row_is_removed_locally() {
        let store = roster();
        let mut editor = editor(&store, 1).await;
        let carol = RelationshipRow::new(RelationshipType::Parents, UnionId(5), CharacterId(3));
        let index = editor.rows().iter().position(|r| *r == carol).unwrap();

        editor
            .apply(index, Edit::SetType(RelationshipType::Guardian))
            .await
            .unwrap();
        let report = editor.apply(index, Edit::Delete).await.unwrap();

        assert_eq!(report.effect, Effect::Removed);
        assert_eq!(store.mutation_count(), 0);
        assert_eq!(store.union(UnionId(5)).unwrap().participants.len(), 4);
    }

    #[tokio::test]
    async fn derived_marker_is_not_a_source() {
        let store = roster();
        let mut editor = editor(&store, 1).await;
        let index = editor.add_row();

        let err = editor
            .apply(index, Edit::SetSource(Some(UnionId::DERIVED)))
            .await
            .unwrap_err();
        assert!(matches!(err, RelationsError::DerivedRow { .. }));
        assert_eq!(editor.rows()[index], RelationshipRow::default());

        let report = editor
            .apply(index, Edit::SetType(RelationshipType::Member))
            .await
            .unwrap();
        assert_eq!(report.effect, Effect::Staged);
    }

    #[tokio::test]
    async fn failed_mutation_leaves_rows_untouched() {
        let store = roster();
        let mut editor = editor(&store, 1).await;
        let before = editor.rows().to_vec();
        store.fail_on(StoreCall::UpdateUnion);

        let err = editor
            .apply(0, Edit::SetType(RelationshipType::Lover))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RelationsError::Mutation {
                call: "update_union",
                ..
            }
        ));
        assert_eq!(editor.rows(), before.as_slice());
        assert!(store.union(UnionId(5)).unwrap().legitimate);
    }

    #[tokio::test]
    async fn non_decodable_type_is_only_staged() {
        let store = roster();
        let mut editor = editor(&store, 1).await;

        let report = editor
            .apply(0, Edit::SetType(RelationshipType::Consort))
            .await
            .unwrap();
        assert_eq!(report.effect, Effect::Staged);
        assert_eq!(editor.rows()[0].kind, Some(RelationshipType::Consort));
        assert_eq!(store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn commit_discards_other_staged_rows() {
        let store = roster();
        let mut editor = editor(&store, 1).await;
        let loaded = editor.rows().len();
        editor.add_row();

        editor
            .apply(0, Edit::SetType(RelationshipType::Concubine))
            .await
            .unwrap();
        assert_eq!(editor.rows().len(), loaded);
    }

    #[tokio::test]
    async fn out_of_range_index_is_rejected() {
        let store = roster();
        let mut editor = editor(&store, 7).await;
        let err = editor.apply(0, Edit::Delete).await.unwrap_err();
        assert!(matches!(err, RelationsError::RowIndex { index: 0, len: 0 }));
    }

    #[tokio::test]
    async fn member_row_joins_faction() {
        let store = roster();
        let mut editor = editor(&store, 7).await;
        let index = editor.add_row();
        editor
            .apply(index, Edit::SetType(RelationshipType::Member))
            .await
            .unwrap();
        editor
            .apply(index, Edit::SetSource(Some(UnionId(8))))
            .await
            .unwrap();

        assert_eq!(editor.factions().count(), 1);
        assert_eq!(
            editor.rows(),
            &[
                RelationshipRow::new(RelationshipType::Member, UnionId(8), CharacterId(7)),
                RelationshipRow::derived(RelationshipType::Peer, CharacterId(1)),
                RelationshipRow::derived(RelationshipType::Peer, CharacterId(6)),
            ]
        );
    }
}
