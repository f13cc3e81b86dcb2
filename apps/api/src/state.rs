use std::sync::Arc;

use crate::config::Config;
use crate::graph::{GraphHandle, GraphLoader};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Current knowledge graph snapshot; empty until a load succeeds.
    pub graph: GraphHandle,
    /// Pluggable graph source used by startup and `POST /api/v1/graph/reload`.
    /// Default: FileGraphLoader over GRAPH_PATH.
    pub loader: Arc<dyn GraphLoader>,
}
