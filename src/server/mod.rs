//! HTTP wrapper around the discovery pipeline.

mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use crate::osm::GeocodeCache;
use crate::pipeline::{DiscoveryPipeline, FixedDelay, HttpOsmSource};

pub fn build_router() -> Router {
    let pipeline = DiscoveryPipeline::new(HttpOsmSource, FixedDelay::default(), GeocodeCache::load());
    let state = Arc::new(AppState {
        pipeline: Mutex::new(pipeline),
    });

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/discover", post(handlers::discover))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16) {
    let app = build_router();
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Grimoire survey server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        });
}
