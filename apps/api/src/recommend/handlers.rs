//! Axum route handlers for the Recommendation API.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::errors::AppError;
use crate::recommend::explain::RandomPhrase;
use crate::recommend::query::JobView;
use crate::recommend::{browse, recommend, BrowseRequest, RecommendRequest, Recommendation};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub results: Vec<Recommendation>,
    pub total_matched: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub jobs: Vec<JobView>,
    pub count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/recommendations
///
/// Scores every active job against the submitted skills and returns the best
/// matches, explained. An empty `results` list is not an error.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let graph = state.graph.snapshot();
    let outcome = recommend(
        graph.as_deref(),
        &request,
        &state.config.recommend,
        Utc::now().date_naive(),
        &mut RandomPhrase::new(),
    )?;

    let message = if outcome.results.is_empty() {
        "No jobs matched your skills".to_string()
    } else {
        format!(
            "Showing {} of {} matching jobs",
            outcome.results.len(),
            outcome.total_matched
        )
    };

    Ok(Json(RecommendResponse {
        results: outcome.results,
        total_matched: outcome.total_matched,
        message,
    }))
}

/// GET /api/v1/jobs?country=&city=&limit=
///
/// Location-only browsing, newest postings first.
pub async fn handle_browse(
    State(state): State<AppState>,
    Query(request): Query<BrowseRequest>,
) -> Result<Json<BrowseResponse>, AppError> {
    let graph = state.graph.snapshot();
    let jobs = browse(
        graph.as_deref(),
        &request,
        &state.config.recommend,
        Utc::now().date_naive(),
    )?;
    Ok(Json(BrowseResponse {
        count: jobs.len(),
        jobs,
    }))
}
