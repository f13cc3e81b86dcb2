use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobrec_api::config::Config;
use jobrec_api::graph::{FileGraphLoader, GraphHandle, GraphLoader};
use jobrec_api::routes::build_router;
use jobrec_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing GRAPH_PATH or bad values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "jobrec_api={level},tower_http={level}",
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobrec API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Matching: strategy={} threshold={} freshness={}d bonus={}",
        config.recommend.strategy,
        config.recommend.threshold,
        config.recommend.freshness_days,
        config.recommend.bonus.rule
    );

    // Load the knowledge graph. A failure leaves the service up, answering
    // GRAPH_UNAVAILABLE until a reload succeeds.
    let loader: Arc<dyn GraphLoader> = Arc::new(FileGraphLoader::new(config.graph_path.clone()));
    let graph = GraphHandle::empty();
    match loader.load().await {
        Ok(g) => {
            graph.replace(g);
        }
        Err(e) => warn!("Knowledge graph not loaded from {}: {e}", loader.source()),
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        graph,
        loader,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
