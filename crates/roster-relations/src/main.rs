//! CLI entry point for roster-relations.
//!
//! Reads configuration from `roster.toml` and `ROSTER__*` variables, talks to
//! the REST union store (or a JSON fixture with `--fixture`), and writes JSON
//! results to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use roster_core::config::RosterConfig;
use roster_core::CharacterId;
use roster_relations::layout::FixedLayout;
use roster_relations::{EditRequest, RelationsEngine};
use roster_store::{HttpUnionStore, MemoryUnionStore, StoreConfig, UnionStore};

#[derive(Parser)]
#[command(name = "roster-relations")]
#[command(about = "Relationship expansion, family graphs and edit reconciliation for the roster")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: roster).
    #[arg(short, long, default_value = "roster", global = true)]
    config: String,

    /// Use a JSON snapshot instead of the REST union store.
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a character's relationship rows and liaison options.
    Expand {
        #[arg(long)]
        character: i64,
        /// Connection degree (default: relations.editor_degree).
        #[arg(long)]
        degree: Option<u32>,
    },
    /// Print a character's family graph as front-end elements.
    Graph {
        #[arg(long)]
        character: i64,
        /// Connection degree (default: relations.graph_degree).
        #[arg(long)]
        degree: Option<u32>,
        /// JSON file of node positions to correct and attach.
        #[arg(long)]
        positions: Option<PathBuf>,
    },
    /// Print a character's record, relationships and candidate targets.
    View {
        #[arg(long)]
        character: i64,
    },
    /// List named factions.
    Factions,
    /// Apply edits read from stdin (one `{index, edit}` object or an array).
    ///
    /// An index equal to the current row count appends a new row first.
    Edit {
        #[arg(long)]
        character: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = RosterConfig::load(&cli.config)?;

    let store: Arc<dyn UnionStore> = match &cli.fixture {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Arc::new(MemoryUnionStore::from_json(&raw)?)
        }
        None => Arc::new(HttpUnionStore::connect(&StoreConfig::from(&config.store))?),
    };
    let engine = RelationsEngine::new(store, config.relations)?;

    match cli.command {
        Command::Expand { character, degree } => {
            let focal = CharacterId(character);
            let expansion = match degree {
                Some(degree) => engine.expansion_at(focal, degree).await?,
                None => engine.expansion(focal).await?,
            };
            println!("{}", serde_json::to_string(&expansion)?);
        }
        Command::Graph {
            character,
            degree,
            positions,
        } => {
            let focal = CharacterId(character);
            let graph = match degree {
                Some(degree) => engine.graph_at(focal, degree).await?,
                None => engine.graph(focal).await?,
            };
            let placed = match positions {
                Some(path) => Some(engine.place(&graph, &FixedLayout::from_file(&path)?)),
                None => None,
            };
            let output = serde_json::json!({
                "elements": graph.to_elements(placed.as_ref()),
                "stats": graph.stats(),
            });
            println!("{}", serde_json::to_string(&output)?);
        }
        Command::View { character } => {
            let view = engine.character_view(CharacterId(character)).await?;
            println!("{}", serde_json::to_string(&view)?);
        }
        Command::Factions => {
            let factions = engine.factions().await?;
            println!("{}", serde_json::to_string(&factions)?);
        }
        Command::Edit { character } => {
            let input = std::io::read_to_string(std::io::stdin())?;
            let requests = parse_requests(&input)?;
            let mut editor = engine.editor(CharacterId(character)).await?;

            let mut reports = Vec::with_capacity(requests.len());
            for request in requests {
                if request.index == editor.rows().len() {
                    editor.add_row();
                }
                match editor.apply(request.index, request.edit).await {
                    Ok(report) => reports.push(report),
                    Err(e) => {
                        if let Some(event) = e.event() {
                            eprintln!("{}", serde_json::to_string(&event)?);
                        }
                        return Err(e.into());
                    }
                }
            }

            let output = serde_json::json!({
                "reports": reports,
                "expansion": editor.expansion(),
            });
            println!("{}", serde_json::to_string(&output)?);
        }
    }

    Ok(())
}

fn parse_requests(input: &str) -> anyhow::Result<Vec<EditRequest>> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    Ok(if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    })
}
