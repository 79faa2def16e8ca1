//! Family graph construction.
//!
//! Every union becomes one invisible hub node and each participant is
//! connected to the hub, never to other participants, so a union with `k`
//! participants contributes exactly `k` edges. Person nodes are keyed by
//! character id; hub ids carry the `hub:` prefix and cannot collide with them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use roster_core::events::{EventPayload, EventSource, RosterEvent};
use roster_core::{CharacterId, Participant, Role, Sex, Union, UnionId, UnionKind};

use crate::layout::Positions;
use crate::types::GraphStats;

/// Prefix that namespaces hub node ids.
pub const HUB_PREFIX: &str = "hub:";

pub fn hub_id(union: UnionId) -> String {
    format!("{HUB_PREFIX}{union}")
}

pub fn person_id(character: CharacterId) -> String {
    character.to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Person,
    MarriageUnit,
    Faction,
}

impl NodeKind {
    pub fn is_hub(self) -> bool {
        !matches!(self, NodeKind::Person)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Person => "person",
            NodeKind::MarriageUnit => "marriage_unit",
            NodeKind::Faction => "faction",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    /// Character name for person nodes, empty for hubs.
    pub label: String,
    pub sex: Option<Sex>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Partner of a legitimate liaison.
    Spouse,
    /// Partner of an illegitimate liaison.
    Affair,
    ParentChild,
    OrgMember,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::Spouse => "spouse",
            EdgeKind::Affair => "affair",
            EdgeKind::ParentChild => "parent_child",
            EdgeKind::OrgMember => "org_member",
        }
    }

    pub fn is_directed(self) -> bool {
        !matches!(self, EdgeKind::Spouse | EdgeKind::Affair)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

/// Person and hub nodes plus the edges between them, in construction order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FamilyGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Unions left out because they failed validation.
    pub skipped: Vec<UnionId>,
    #[serde(skip)]
    node_index: HashMap<String, usize>,
}

/// Build the family graph of a union snapshot.
pub fn build_graph(unions: &[Union]) -> FamilyGraph {
    let mut graph = FamilyGraph::default();

    for union in unions {
        if let Err(e) = union.validate() {
            tracing::warn!(union_id = %union.id, error = %e, "Skipping invalid union in graph");
            graph.skipped.push(union.id);
            continue;
        }

        let hub = hub_id(union.id);
        let hub_kind = match union.kind {
            UnionKind::Liaison => NodeKind::MarriageUnit,
            UnionKind::Faction => NodeKind::Faction,
        };
        graph.insert_node(Node {
            id: hub.clone(),
            kind: hub_kind,
            label: String::new(),
            sex: None,
        });

        for participant in &union.participants {
            let person = graph.see_person(participant);
            let edge = match (union.kind, participant.role) {
                (UnionKind::Faction, _) => Edge {
                    source: hub.clone(),
                    target: person,
                    kind: EdgeKind::OrgMember,
                },
                (UnionKind::Liaison, Role::Child) => Edge {
                    source: hub.clone(),
                    target: person,
                    kind: EdgeKind::ParentChild,
                },
                (UnionKind::Liaison, Role::Parent | Role::Member) => Edge {
                    source: person,
                    target: hub.clone(),
                    kind: if union.legitimate {
                        EdgeKind::Spouse
                    } else {
                        EdgeKind::Affair
                    },
                },
            };
            graph.edges.push(edge);
        }
    }

    tracing::debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        skipped = graph.skipped.len(),
        "Built family graph"
    );
    graph
}

impl FamilyGraph {
    /// Add a node unless its id is already present. First sighting wins.
    fn insert_node(&mut self, node: Node) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    fn see_person(&mut self, participant: &Participant) -> String {
        let id = person_id(participant.id);
        self.insert_node(Node {
            id: id.clone(),
            kind: NodeKind::Person,
            label: participant.name.clone(),
            sex: Some(participant.sex),
        });
        id
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    /// Hubs with a `parent_child` edge into `id`.
    pub fn parent_hubs<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.kind == EdgeKind::ParentChild && e.target == id)
            .map(|e| e.source.as_str())
    }

    /// Translate a node click into a navigation event.
    ///
    /// Only person nodes navigate; hub ids and unknown ids yield nothing.
    pub fn node_click(&self, node_id: &str) -> Option<RosterEvent> {
        if node_id.starts_with(HUB_PREFIX) {
            return None;
        }
        let node = self.node(node_id)?;
        if node.kind.is_hub() {
            return None;
        }
        let character_id = node.id.parse::<i64>().ok().map(CharacterId)?;
        Some(RosterEvent::new(
            EventSource::Graph,
            EventPayload::Navigate { character_id },
        ))
    }

    pub fn stats(&self) -> GraphStats {
        let hub_count = self.nodes.iter().filter(|n| n.kind.is_hub()).count();
        GraphStats {
            person_count: self.nodes.len() - hub_count,
            hub_count,
            edge_count: self.edges.len(),
            skipped_unions: self.skipped.len(),
        }
    }

    /// Render as Cytoscape-style elements, with positions when known.
    pub fn to_elements(&self, positions: Option<&Positions>) -> Vec<serde_json::Value> {
        let nodes = self.nodes.iter().map(|node| {
            let mut data = serde_json::json!({
                "id": node.id,
                "type": node.kind.as_str(),
            });
            if let Some(sex) = node.sex {
                data["gender"] = sex.as_str().into();
                data["label"] = node.label.clone().into();
            }
            let mut element = serde_json::json!({ "data": data });
            if let Some(point) = positions.and_then(|p| p.get(&node.id)) {
                element["position"] = serde_json::json!({ "x": point.x, "y": point.y });
            }
            element
        });

        let edges = self.edges.iter().enumerate().map(|(i, edge)| {
            serde_json::json!({
                "data": {
                    "id": format!("e{i}"),
                    "source": edge.source,
                    "target": edge.target,
                    "type": edge.kind.as_str(),
                    "directed": edge.kind.is_directed(),
                }
            })
        });

        nodes.chain(edges).collect()
    }
}
