//! Node positions and the generation correction pass.
//!
//! Physical layout is computed elsewhere (a force-directed simulation in the
//! front end, or a positions file handed to the CLI). The simulation knows
//! nothing about generations, so after it runs every child is pushed below
//! its parents' hubs.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RelationsError, Result};
use crate::graph::{FamilyGraph, NodeKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Node id → position. Larger `y` is further down.
pub type Positions = HashMap<String, Point>;

/// An external layout step.
pub trait Layout {
    fn positions(&self, graph: &FamilyGraph) -> Positions;
}

/// Positions computed ahead of time, e.g. loaded from a file.
#[derive(Debug, Clone, Default)]
pub struct FixedLayout {
    positions: Positions,
}

impl FixedLayout {
    pub fn new(positions: Positions) -> Self {
        Self { positions }
    }

    /// Read a JSON object of `{ "<node id>": { "x": .., "y": .. } }`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let positions: Positions =
            serde_json::from_str(&raw).map_err(|e| RelationsError::Serialization(e.to_string()))?;
        Ok(Self::new(positions))
    }
}

impl Layout for FixedLayout {
    fn positions(&self, graph: &FamilyGraph) -> Positions {
        graph
            .nodes
            .iter()
            .filter_map(|n| self.positions.get(&n.id).map(|p| (n.id.clone(), *p)))
            .collect()
    }
}

/// Run `layout` and then the generation correction pass.
pub fn place(graph: &FamilyGraph, layout: &dyn Layout, gap: f64) -> Positions {
    let mut positions = layout.positions(graph);
    enforce_generations(graph, &mut positions, gap);
    positions
}

/// Push every person with parent hubs at least `gap` below them.
///
/// The floor for a child is its deepest parent hub plus `gap`, so every
/// `parent_child` edge ends at least `gap` below its hub. Nodes and hubs
/// without a position are left alone. Returns the number of nodes moved.
pub fn enforce_generations(graph: &FamilyGraph, positions: &mut Positions, gap: f64) -> usize {
    let mut moved = 0;

    for node in graph.nodes.iter().filter(|n| n.kind == NodeKind::Person) {
        let Some(deepest) = graph
            .parent_hubs(&node.id)
            .filter_map(|hub| positions.get(hub).map(|p| p.y))
            .reduce(f64::max)
        else {
            continue;
        };
        let floor = deepest + gap;

        if let Some(point) = positions.get_mut(&node.id) {
            if point.y < floor {
                tracing::trace!(node = %node.id, from = point.y, to = floor, "Lowering child below parents");
                point.y = floor;
                moved += 1;
            }
        }
    }

    moved
}
