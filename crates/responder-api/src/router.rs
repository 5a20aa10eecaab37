//! Router configuration and server setup.

use std::future::Future;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::ApiConfig;
use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Phone automation
        .route("/webhook/dnd", post(handlers::dnd_webhook))
        // Health
        .route("/api/health", get(handlers::health))
        // Status
        .route("/api/status", get(handlers::status))
        // Whitelist
        .route("/api/whitelist", get(handlers::list_whitelist))
        .route("/api/whitelist/add", post(handlers::add_to_whitelist))
        .route("/api/whitelist/remove", post(handlers::remove_from_whitelist))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server and runs until `shutdown` resolves.
pub async fn serve<F>(config: ApiConfig, state: AppState, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);
    info!("DND webhook URL: http://{}/webhook/dnd", addr);
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
