pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::graph::handlers as graph_handlers;
use crate::recommend::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Recommendation API
        .route("/api/v1/recommendations", post(handlers::handle_recommend))
        .route("/api/v1/jobs", get(handlers::handle_browse))
        // Graph API
        .route("/api/v1/graph/stats", get(graph_handlers::handle_graph_stats))
        .route(
            "/api/v1/graph/reload",
            post(graph_handlers::handle_graph_reload),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::graph::{GraphError, GraphHandle, GraphLoader, KnowledgeGraph};
    use crate::test_support::sample_graph;

    /// Serves the fixture graph, or fails with a format error.
    struct FixtureLoader {
        fail: bool,
    }

    #[async_trait]
    impl GraphLoader for FixtureLoader {
        async fn load(&self) -> Result<KnowledgeGraph, GraphError> {
            if self.fail {
                Err(GraphError::Format("truncated snapshot".to_string()))
            } else {
                Ok(sample_graph())
            }
        }

        fn source(&self) -> String {
            "fixture".to_string()
        }
    }

    fn state(graph: GraphHandle, fail: bool) -> AppState {
        let config = Config::from_lookup(|key| match key {
            "GRAPH_PATH" => Some("fixture.graphml".to_string()),
            // Fixture postings are from early 2024
            "FRESHNESS_DAYS" => Some("100000".to_string()),
            _ => None,
        })
        .unwrap();
        AppState {
            config,
            graph,
            loader: Arc::new(FixtureLoader { fail }),
        }
    }

    fn loaded() -> AppState {
        state(GraphHandle::with_graph(sample_graph()), false)
    }

    async fn send(state: AppState, req: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state).oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_graph_state() {
        let (status, body) = send(loaded(), get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["graph_loaded"], true);

        let (_, body) = send(state(GraphHandle::empty(), false), get_req("/health")).await;
        assert_eq!(body["graph_loaded"], false);
    }

    #[tokio::test]
    async fn test_recommendations_from_comma_separated_string() {
        let req = post_json(
            "/api/v1/recommendations",
            json!({ "skills": "Python, SQL", "country": "Indonesia" }),
        );
        let (status, body) = send(loaded(), req).await;
        assert_eq!(status, StatusCode::OK);

        let results = body["results"].as_array().unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0]["title"], "Data Analyst");
        assert_eq!(results[0]["match_percent"], 66.7);
        assert_eq!(results[0]["fit_level"], "moderately_suitable");
        assert_eq!(results[0]["missing_skills"], json!(["excel"]));
        assert!(results[0]["explanation"].as_str().unwrap().contains("Data Analyst"));
    }

    #[tokio::test]
    async fn test_no_match_is_ok_with_message() {
        let req = post_json("/api/v1/recommendations", json!({ "skills": ["cooking"] }));
        let (status, body) = send(loaded(), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!([]));
        assert_eq!(body["total_matched"], 0);
        assert_eq!(body["message"], "No jobs matched your skills");
    }

    #[tokio::test]
    async fn test_empty_skills_is_bad_request() {
        let req = post_json("/api/v1/recommendations", json!({ "skills": [] }));
        let (status, body) = send(loaded(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INPUT_ERROR");
    }

    #[tokio::test]
    async fn test_missing_graph_is_service_unavailable() {
        let req = post_json("/api/v1/recommendations", json!({ "skills": ["python"] }));
        let (status, body) = send(state(GraphHandle::empty(), false), req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "GRAPH_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_browse_by_location() {
        let (status, body) = send(loaded(), get_req("/api/v1/jobs?country=indonesia&limit=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["jobs"][0]["title"], "Data Analyst");
    }

    #[tokio::test]
    async fn test_graph_stats() {
        let (status, body) = send(loaded(), get_req("/api/v1/graph/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["jobs"], 3);

        let (status, _) = send(state(GraphHandle::empty(), false), get_req("/api/v1/graph/stats")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_reload_installs_graph() {
        let app_state = state(GraphHandle::empty(), false);
        let handle = app_state.graph.clone();

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/graph/reload")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app_state, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["replaced"], false);
        assert_eq!(body["stats"]["jobs"], 3);
        assert!(handle.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_graph() {
        let mut previous = KnowledgeGraph::new();
        previous.upsert_node("only", Default::default());
        let app_state = state(GraphHandle::with_graph(previous), true);
        let handle = app_state.graph.clone();

        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/graph/reload")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app_state, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "GRAPH_FORMAT_ERROR");
        assert_eq!(handle.snapshot().unwrap().node_count(), 1);
    }
}
