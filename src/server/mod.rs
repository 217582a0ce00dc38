mod handlers;
mod state;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

pub use handlers::ApiError;
pub use state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/lookup", get(handlers::lookup))
        // Every answer is a fresh lookup; nothing here may be cached downstream.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until the listener fails.
///
/// The caller must hold its own `state` handle past the runtime's
/// `block_on`: the system resolver owns a runtime, which may not be dropped
/// from async code.
pub async fn start(host: &str, port: u16, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("domain_geo server listening on http://{}", addr);

    axum::serve(listener, app).await
}
