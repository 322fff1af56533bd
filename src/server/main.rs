//! Server binary: exposes the discovery pipeline over HTTP.
//!
//! Bind address comes from the HOST/PORT environment (defaults
//! 127.0.0.1:8080); everything else arrives per request.

#[tokio::main]
async fn main() {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    grimoire_osm::server::start(&host, port).await;
}
