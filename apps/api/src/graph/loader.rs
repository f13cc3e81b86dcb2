//! Graph loading. Sniffs the file content and dispatches to the GraphML or
//! binary snapshot reader.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::graph::{binary, graphml, KnowledgeGraph};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unrecognized or corrupt graph file: {0}")]
    Format(String),

    #[error("I/O error while reading graph: {0}")]
    Io(#[from] io::Error),
}

/// Loads a knowledge graph from `path`.
///
/// - missing path → `GraphError::NotFound`
/// - content that is neither a binary snapshot nor GraphML, or a corrupt
///   instance of either → `GraphError::Format`
pub fn load_graph(path: impl AsRef<Path>) -> Result<KnowledgeGraph, GraphError> {
    let path = path.as_ref();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(GraphError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(GraphError::Io(e)),
    };

    let graph = decode_graph(&bytes)?;
    let stats = graph.stats();
    info!(
        path = %path.display(),
        nodes = stats.nodes,
        edges = stats.edges,
        jobs = stats.jobs,
        skills = stats.skills,
        "Knowledge graph loaded"
    );
    Ok(graph)
}

/// Decodes an in-memory serialized graph of either supported format.
pub fn decode_graph(bytes: &[u8]) -> Result<KnowledgeGraph, GraphError> {
    if binary::is_snapshot(bytes) {
        return binary::decode(bytes);
    }

    let text = std::str::from_utf8(bytes).map_err(|_| {
        GraphError::Format("content is neither a binary snapshot nor UTF-8 GraphML".to_string())
    })?;
    let body = text.trim_start_matches('\u{feff}').trim_start();
    if body.starts_with('<') {
        return graphml::parse_graphml(body);
    }

    Err(GraphError::Format("unrecognized graph format".to_string()))
}

/// Source of knowledge graphs for the service. Swap implementations to load
/// from somewhere other than the local filesystem.
#[async_trait]
pub trait GraphLoader: Send + Sync {
    async fn load(&self) -> Result<KnowledgeGraph, GraphError>;

    /// Human-readable origin, for logs.
    fn source(&self) -> String;
}

/// Loads from a file path, parsing on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct FileGraphLoader {
    path: PathBuf,
}

impl FileGraphLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl GraphLoader for FileGraphLoader {
    async fn load(&self) -> Result<KnowledgeGraph, GraphError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_graph(path))
            .await
            .map_err(|e| GraphError::Io(io::Error::new(io::ErrorKind::Other, e)))?
    }

    fn source(&self) -> String {
        self.path.display().to_string()
    }
}
