//! Configuration management for roster services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (ROSTER__ prefix, `__` as section separator)
//! 2. Config file (roster.toml)
//! 3. Defaults

use serde::Deserialize;

use crate::error::RosterError;

/// Top-level roster configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub relations: RelationsSettings,
}

/// Where the union store lives.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Base URL of the REST backend (default: "http://localhost:8080/api").
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Retries are left to the transport.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Tuning for expansion, graph rendering, and reconciliation.
#[derive(Debug, Clone, Deserialize)]
pub struct RelationsSettings {
    /// Connection degree fetched for the relationship editor.
    #[serde(default)]
    pub editor_degree: u32,

    /// Connection degree fetched for the family graph.
    #[serde(default = "default_graph_degree")]
    pub graph_degree: u32,

    /// Minimum vertical distance between a parent hub and its children.
    #[serde(default = "default_generation_gap")]
    pub generation_gap: f64,

    /// Directory for reconciliation journal entries. Disabled when unset.
    #[serde(default)]
    pub journal_dir: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_graph_degree() -> u32 {
    3
}

fn default_generation_gap() -> f64 {
    100.0
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RelationsSettings {
    fn default() -> Self {
        Self {
            editor_degree: 0,
            graph_degree: default_graph_degree(),
            generation_gap: default_generation_gap(),
            journal_dir: None,
        }
    }
}

impl RosterConfig {
    /// Load from `{file_prefix}.toml` (optional) and `ROSTER__*` variables.
    pub fn load(file_prefix: &str) -> Result<Self, RosterError> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("ROSTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: RosterConfig = cfg.try_deserialize()?;
        tracing::debug!(base_url = %loaded.store.base_url, "Configuration loaded");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RosterConfig::default();
        assert_eq!(config.store.base_url, "http://localhost:8080/api");
        assert_eq!(config.store.timeout_secs, 30);
        assert_eq!(config.relations.editor_degree, 0);
        assert_eq!(config.relations.graph_degree, 3);
        assert_eq!(config.relations.generation_gap, 100.0);
        assert!(config.relations.journal_dir.is_none());
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(
                "[relations]\ngraph_degree = 1\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let loaded: RosterConfig = cfg.try_deserialize().unwrap();
        assert_eq!(loaded.relations.graph_degree, 1);
        assert_eq!(loaded.relations.generation_gap, 100.0);
        assert_eq!(loaded.store.timeout_secs, 30);
    }
}
