//! Axum route handlers for the Graph API.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::graph::GraphStats;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub source: String,
    pub stats: GraphStats,
    pub replaced: bool,
}

/// GET /api/v1/graph/stats
pub async fn handle_graph_stats(State(state): State<AppState>) -> Result<Json<GraphStats>, AppError> {
    let graph = state.graph.snapshot().ok_or(AppError::GraphUnavailable)?;
    Ok(Json(graph.stats()))
}

/// POST /api/v1/graph/reload
///
/// Rebuilds the graph from the configured loader and swaps it in. On failure
/// the previous graph stays in service.
pub async fn handle_graph_reload(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, AppError> {
    let source = state.loader.source();
    let graph = state.loader.load().await.map_err(|e| {
        warn!(source = %source, "Graph reload failed: {e}");
        e
    })?;

    let stats = graph.stats();
    let replaced = state.graph.replace(graph).is_some();
    info!(source = %source, nodes = stats.nodes, edges = stats.edges, "Graph reloaded");

    Ok(Json(ReloadResponse {
        source,
        stats,
        replaced,
    }))
}
