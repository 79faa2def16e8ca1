//! roster-relations: Relationship expansion, family graphs and edit
//! reconciliation for the roster.
//!
//! Fetches a character's unions from the union store and turns them into an
//! editable relationship list (with derived sibling and peer rows) or a
//! genealogical graph of person and hub nodes. Edits to the list are
//! reconciled back into union-store mutations, optionally journaled.

pub mod error;
pub mod expand;
pub mod fetch;
pub mod graph;
pub mod journal;
pub mod layout;
pub mod reconcile;
pub mod types;

pub use error::RelationsError;
pub use expand::expand;
pub use graph::{build_graph, FamilyGraph};
pub use layout::{enforce_generations, Layout, Positions};
pub use reconcile::RelationEditor;
pub use types::{ApplyReport, CharacterView, Edit, EditRequest, Effect, Expansion};

use std::sync::Arc;

use roster_core::config::RelationsSettings;
use roster_core::{CharacterId, FactionOption};
use roster_store::UnionStore;

use crate::journal::SharedJournal;

/// Entry point tying the union store to expansion, graphs and editing.
pub struct RelationsEngine {
    store: Arc<dyn UnionStore>,
    settings: RelationsSettings,
    journal: Option<SharedJournal>,
}

impl RelationsEngine {
    /// Create an engine. Opens the journal when `settings.journal_dir` is set.
    pub fn new(store: Arc<dyn UnionStore>, settings: RelationsSettings) -> error::Result<Self> {
        let journal = settings
            .journal_dir
            .as_deref()
            .map(journal::open)
            .transpose()?;
        Ok(Self {
            store,
            settings,
            journal,
        })
    }

    pub fn settings(&self) -> &RelationsSettings {
        &self.settings
    }

    /// Relationship rows of `focal` at the editor's connection degree.
    pub async fn expansion(&self, focal: CharacterId) -> error::Result<Expansion> {
        self.expansion_at(focal, self.settings.editor_degree).await
    }

    pub async fn expansion_at(&self, focal: CharacterId, degree: u32) -> error::Result<Expansion> {
        let unions = fetch::fetch_connections(self.store.as_ref(), focal, degree).await?;
        Ok(expand(&unions, focal))
    }

    /// Family graph around `focal` at the graph's connection degree.
    pub async fn graph(&self, focal: CharacterId) -> error::Result<FamilyGraph> {
        self.graph_at(focal, self.settings.graph_degree).await
    }

    pub async fn graph_at(&self, focal: CharacterId, degree: u32) -> error::Result<FamilyGraph> {
        let unions = fetch::fetch_connections(self.store.as_ref(), focal, degree).await?;
        let graph = build_graph(&unions);
        let stats = graph.stats();
        tracing::info!(
            focal = %focal,
            degree,
            persons = stats.person_count,
            hubs = stats.hub_count,
            edges = stats.edge_count,
            "Family graph built"
        );
        Ok(graph)
    }

    /// Run `layout` on `graph` and correct generations with the configured gap.
    pub fn place(&self, graph: &FamilyGraph, layout: &dyn Layout) -> Positions {
        crate::layout::place(graph, layout, self.settings.generation_gap)
    }

    /// Character record, relationships and candidate targets, fetched concurrently.
    pub async fn character_view(&self, focal: CharacterId) -> error::Result<CharacterView> {
        let (character, unions, roster) =
            fetch::fetch_character_page(self.store.as_ref(), focal, self.settings.editor_degree)
                .await?;
        Ok(CharacterView {
            character,
            expansion: expand(&unions, focal),
            candidates: roster.into_iter().filter(|c| c.id != focal).collect(),
        })
    }

    pub async fn factions(&self) -> error::Result<Vec<FactionOption>> {
        Ok(self.store.fetch_named_factions().await?)
    }

    /// Open the relationship editor for `focal`.
    pub async fn editor(&self, focal: CharacterId) -> error::Result<RelationEditor> {
        let editor =
            RelationEditor::load(self.store.clone(), focal, self.settings.editor_degree).await?;
        Ok(match &self.journal {
            Some(journal) => editor.with_journal(journal.clone()),
            None => editor,
        })
    }
}
