//! End-to-end tests for `RelationsEngine` against the sample fixture.

use std::sync::Arc;

use roster_core::config::RelationsSettings;
use roster_core::events::EventPayload;
use roster_core::{CharacterId, RelationshipRow, RelationshipType, UnionId};
use roster_journal::store::{FileJournalStore, JournalQuery, JournalStore};
use roster_journal::Outcome;
use roster_relations::graph::EdgeKind;
use roster_relations::layout::FixedLayout;
use roster_relations::{Edit, Effect, RelationsEngine, RelationsError};
use roster_store::{MemoryUnionStore, StoreCall, UnionStore};

const FIXTURE: &str = include_str!("../../../fixtures/roster.json");

fn fixture_store() -> Arc<MemoryUnionStore> {
    Arc::new(MemoryUnionStore::from_json(FIXTURE).unwrap())
}

fn engine(store: &Arc<MemoryUnionStore>, settings: RelationsSettings) -> RelationsEngine {
    let shared: Arc<dyn UnionStore> = store.clone();
    RelationsEngine::new(shared, settings).unwrap()
}

#[tokio::test]
async fn expansion_uses_editor_degree() {
    let store = fixture_store();
    let engine = engine(&store, RelationsSettings::default());

    let expansion = engine.expansion(CharacterId(1)).await.unwrap();
    assert_eq!(
        expansion.relations,
        vec![
            RelationshipRow::new(RelationshipType::Spouse, UnionId(5), CharacterId(2)),
            RelationshipRow::new(RelationshipType::Parents, UnionId(5), CharacterId(3)),
            RelationshipRow::new(RelationshipType::Parents, UnionId(5), CharacterId(4)),
            RelationshipRow::new(RelationshipType::Member, UnionId(8), CharacterId(1)),
            RelationshipRow::derived(RelationshipType::Peer, CharacterId(6)),
        ]
    );
    // Bob's affair is two hops away and not loaded at degree 0.
    assert!(expansion.unions.iter().all(|o| o.value != UnionId(6)));
}

#[tokio::test]
async fn graph_reaches_across_unions() {
    let store = fixture_store();
    let engine = engine(&store, RelationsSettings::default());

    let graph = engine.graph(CharacterId(3)).await.unwrap();
    let stats = graph.stats();
    assert_eq!(stats.hub_count, 3);
    assert_eq!(stats.person_count, 7);
    assert_eq!(stats.edge_count, 9);
    assert!(graph
        .edges
        .iter()
        .any(|e| e.source == "7" && e.target == "hub:6" && e.kind == EdgeKind::Affair));

    let one_hop = engine.graph_at(CharacterId(3), 0).await.unwrap();
    assert_eq!(one_hop.stats().hub_count, 1);
}

#[tokio::test]
async fn placed_graph_respects_generations() {
    let store = fixture_store();
    let engine = engine(
        &store,
        RelationsSettings {
            generation_gap: 50.0,
            ..Default::default()
        },
    );

    let graph = engine.graph(CharacterId(1)).await.unwrap();
    let layout = FixedLayout::new(
        graph
            .nodes
            .iter()
            .map(|n| (n.id.clone(), roster_relations::layout::Point { x: 0.0, y: 0.0 }))
            .collect(),
    );
    let positions = engine.place(&graph, &layout);

    for edge in graph.edges.iter().filter(|e| e.kind == EdgeKind::ParentChild) {
        assert!(positions[&edge.target].y >= positions[&edge.source].y + 50.0);
    }

    let elements = graph.to_elements(Some(&positions));
    assert!(elements.iter().all(|e| e.get("position").is_some() || e["data"].get("source").is_some()));
}

#[tokio::test]
async fn character_view_joins_three_reads() {
    let store = fixture_store();
    let engine = engine(&store, RelationsSettings::default());

    let view = engine.character_view(CharacterId(9)).await.unwrap();
    assert_eq!(view.character.name, "Ivo");
    assert_eq!(view.expansion.unions.len(), 1);
    assert_eq!(view.expansion.unions[0].label, "Bob & Gwen");
    assert!(view.candidates.iter().all(|c| c.id != CharacterId(9)));
    assert_eq!(view.candidates.len(), 6);
    // Listing is sorted by name.
    assert_eq!(view.candidates[0].name, "Alice");

    let mut calls = store.calls();
    calls.sort_by_key(|c| c.as_str());
    assert_eq!(
        calls,
        vec![
            StoreCall::FetchCharacter,
            StoreCall::FetchConnections,
            StoreCall::ListCharacters
        ]
    );
}

#[tokio::test]
async fn character_view_fails_for_unknown_character() {
    let store = fixture_store();
    let engine = engine(&store, RelationsSettings::default());

    let err = engine.character_view(CharacterId(404)).await.unwrap_err();
    assert!(matches!(err, RelationsError::Store(_)));
}

#[tokio::test]
async fn failed_listing_is_a_fetch_error() {
    let store = fixture_store();
    store.fail_on(StoreCall::FetchConnections);
    let engine = engine(&store, RelationsSettings::default());

    let err = engine.expansion(CharacterId(1)).await.unwrap_err();
    assert!(matches!(
        err,
        RelationsError::Fetch {
            character_id: CharacterId(1),
            ..
        }
    ));
}

#[tokio::test]
async fn factions_are_listed_by_name() {
    let store = fixture_store();
    let engine = engine(&store, RelationsSettings::default());

    let factions = engine.factions().await.unwrap();
    assert_eq!(factions.len(), 1);
    assert_eq!(factions[0].name, "Night Watch");
}

#[tokio::test]
async fn journaled_edit_round_trip() {
    let store = fixture_store();
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(
        &store,
        RelationsSettings {
            journal_dir: Some(dir.path().to_string_lossy().into_owned()),
            ..Default::default()
        },
    );

    let mut editor = engine.editor(CharacterId(2)).await.unwrap();
    let affair = editor
        .rows()
        .iter()
        .position(|r| r.kind == Some(RelationshipType::Lover))
        .unwrap();

    let report = editor
        .apply(affair, Edit::SetType(RelationshipType::Concubine))
        .await
        .unwrap();
    assert_eq!(report.effect, Effect::Committed);
    assert!(matches!(
        report.events[0].payload,
        EventPayload::UnionUpdated {
            union_id: UnionId(6),
            ..
        }
    ));

    let journal = FileJournalStore::new(dir.path()).unwrap();
    let entries = journal
        .list(&JournalQuery {
            character_id: Some(2),
            outcome: Some(Outcome::Committed),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(report.journal_id, Some(entries[0].id.to_string()));
    assert!(entries[0].verify_integrity());

    let fresh = engine.expansion(CharacterId(2)).await.unwrap();
    assert!(fresh.relations.contains(&RelationshipRow::new(
        RelationshipType::Concubine,
        UnionId(6),
        CharacterId(7)
    )));
}
