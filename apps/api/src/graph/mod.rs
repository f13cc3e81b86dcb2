//! Knowledge graph: an owned, read-only attributed graph of jobs, skills and
//! the entities around them (companies, locations, fields, levels, types).
//!
//! The graph is produced elsewhere and only loaded here (see [`loader`]). Once
//! built it is shared behind an `Arc` and never mutated by scoring code.

pub mod binary;
pub mod graphml;
pub mod handle;
pub mod handlers;
pub mod loader;

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

pub use handle::GraphHandle;
pub use loader::{load_graph, FileGraphLoader, GraphError, GraphLoader};

/// Markers graph producers write for "no value" (stringified pandas NaN etc).
const EMPTY_MARKERS: &[&str] = &["nan", "none", "null"];

// ────────────────────────────────────────────────────────────────────────────
// Nodes and edges
// ────────────────────────────────────────────────────────────────────────────

/// Kind of entity a node represents, derived from its `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Job,
    Skill,
    Company,
    Location,
    Position,
    Level,
    JobType,
    Other,
}

impl NodeKind {
    pub fn from_type_attr(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "job" => NodeKind::Job,
            "skill" | "tech_skill" => NodeKind::Skill,
            "company" => NodeKind::Company,
            "location" => NodeKind::Location,
            "position" => NodeKind::Position,
            "level" => NodeKind::Level,
            "type" => NodeKind::JobType,
            _ => NodeKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub attrs: BTreeMap<String, String>,
}

impl Node {
    pub fn new(id: impl Into<String>, attrs: BTreeMap<String, String>) -> Self {
        let kind = kind_of(&attrs);
        Self {
            id: id.into(),
            kind,
            attrs,
        }
    }

    /// Returns a trimmed, non-empty attribute value. Empty markers such as
    /// `"nan"` count as missing.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .filter(|v| !EMPTY_MARKERS.iter().any(|m| v.eq_ignore_ascii_case(m)))
    }

    /// First present attribute among `keys`, in order.
    pub fn first_attr(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.attr(k))
    }

    /// Display label: `label`, then `name`, then the id.
    pub fn label(&self) -> &str {
        self.first_attr(&["label", "name"]).unwrap_or(&self.id)
    }
}

fn kind_of(attrs: &BTreeMap<String, String>) -> NodeKind {
    attrs
        .get("type")
        .map(|t| NodeKind::from_type_attr(t))
        .unwrap_or(NodeKind::Other)
}

/// Edge payload. Job ↔ skill edges carry `requires`; other relations are
/// descriptive (`offers`, `based_in`, `belongs_to_field`, `has_level`, `has_type`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub kind: String,
    /// Confidence in [0, 1]; 1.0 when absent or unparsable.
    pub weight: f64,
    pub reason: Option<String>,
}

impl Relation {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            weight: 1.0,
            reason: None,
        }
    }

    pub fn requires() -> Self {
        Self::new("requires")
    }

    pub fn from_attrs(attrs: &BTreeMap<String, String>) -> Self {
        let kind = attrs
            .get("relation")
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .unwrap_or("related")
            .to_string();
        let weight = ["confidence", "weight"]
            .iter()
            .filter_map(|k| attrs.get(*k))
            .find_map(|v| v.trim().parse::<f64>().ok())
            .filter(|w| w.is_finite())
            .map(|w| w.clamp(0.0, 1.0))
            .unwrap_or(1.0);
        let reason = attrs
            .get("reason")
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Self {
            kind,
            weight,
            reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub jobs: usize,
    pub skills: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Graph
// ────────────────────────────────────────────────────────────────────────────

/// Undirected attributed graph keyed by string node ids.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: UnGraph<Node, Relation>,
    index: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, or merges `attrs` into an existing node with the same id.
    pub fn upsert_node(&mut self, id: &str, attrs: BTreeMap<String, String>) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            let node = &mut self.graph[idx];
            node.attrs.extend(attrs);
            node.kind = kind_of(&node.attrs);
            return idx;
        }
        let idx = self.graph.add_node(Node::new(id, attrs));
        self.index.insert(id.to_string(), idx);
        idx
    }

    /// Connects two nodes, creating bare endpoints when missing. A second edge
    /// between the same pair replaces the first.
    pub fn add_edge(&mut self, a: &str, b: &str, relation: Relation) {
        let ia = self.ensure_node(a);
        let ib = self.ensure_node(b);
        self.graph.update_edge(ia, ib, relation);
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(id) {
            return idx;
        }
        self.upsert_node(id, BTreeMap::new())
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.graph[idx])
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes().filter(move |n| n.kind == kind)
    }

    /// All edges as `(endpoint, endpoint, relation)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&Node, &Node, &Relation)> {
        self.graph.edge_references().map(move |e| {
            (
                &self.graph[e.source()],
                &self.graph[e.target()],
                e.weight(),
            )
        })
    }

    /// Neighbours of `id` with the connecting relation, ordered by edge
    /// insertion. Unknown ids have no neighbours.
    pub fn neighbors(&self, id: &str) -> Vec<(&Node, &Relation)> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges(idx).collect();
        edges.sort_by_key(|e| e.id().index());
        edges
            .into_iter()
            .map(|e| {
                let other = if e.source() == idx { e.target() } else { e.source() };
                (&self.graph[other], e.weight())
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            jobs: self.nodes_of_kind(NodeKind::Job).count(),
            skills: self.nodes_of_kind(NodeKind::Skill).count(),
        }
    }
}
