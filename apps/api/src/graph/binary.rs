//! Binary graph snapshots: a 4-byte magic, a format version byte, then a
//! bincode-encoded node/edge list. Loads much faster than GraphML for large
//! job graphs.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::graph::loader::GraphError;
use crate::graph::{KnowledgeGraph, Relation};

pub const MAGIC: &[u8; 4] = b"JRKG";
pub const FORMAT_VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: String,
    attrs: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    source: String,
    target: String,
    relation: Relation,
}

pub fn is_snapshot(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

pub fn encode(graph: &KnowledgeGraph) -> Result<Vec<u8>, GraphError> {
    let snapshot = Snapshot {
        nodes: graph
            .nodes()
            .map(|n| NodeRecord {
                id: n.id.clone(),
                attrs: n.attrs.clone(),
            })
            .collect(),
        edges: graph
            .edges()
            .map(|(a, b, relation)| EdgeRecord {
                source: a.id.clone(),
                target: b.id.clone(),
                relation: relation.clone(),
            })
            .collect(),
    };

    let mut out = Vec::with_capacity(MAGIC.len() + 1);
    out.extend_from_slice(MAGIC);
    out.push(FORMAT_VERSION);
    bincode::serialize_into(&mut out, &snapshot)
        .map_err(|e| GraphError::Format(format!("failed to encode snapshot: {e}")))?;
    Ok(out)
}

pub fn decode(bytes: &[u8]) -> Result<KnowledgeGraph, GraphError> {
    if !is_snapshot(bytes) {
        return Err(GraphError::Format("missing snapshot header".to_string()));
    }
    let version = bytes.get(MAGIC.len()).copied();
    if version != Some(FORMAT_VERSION) {
        return Err(GraphError::Format(format!(
            "unsupported snapshot version {version:?} (expected {FORMAT_VERSION})"
        )));
    }

    let snapshot: Snapshot = bincode::deserialize(&bytes[MAGIC.len() + 1..])
        .map_err(|e| GraphError::Format(format!("corrupt snapshot: {e}")))?;

    let mut graph = KnowledgeGraph::new();
    for node in snapshot.nodes {
        graph.upsert_node(&node.id, node.attrs);
    }
    for edge in snapshot.edges {
        graph.add_edge(&edge.source, &edge.target, edge.relation);
    }
    Ok(graph)
}

/// Writes `graph` as a binary snapshot at `path`.
pub fn save_binary(graph: &KnowledgeGraph, path: impl AsRef<Path>) -> Result<(), GraphError> {
    let path = path.as_ref();
    let bytes = encode(graph)?;
    std::fs::write(path, &bytes)?;
    info!(
        path = %path.display(),
        bytes = bytes.len(),
        "Wrote knowledge graph snapshot"
    );
    Ok(())
}
