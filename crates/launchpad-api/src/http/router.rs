//! Axum router configuration with middleware.
//!
//! Routes:
//! - `POST /api/chat`: one non-streaming turn
//! - `POST /api/chat/stream`: one streaming turn as SSE
//! - `POST /api/deploy`: submit and poll a directive
//! - `GET /api/deployments/{id}`: single status read
//! - `GET /health`

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/chat", post(handlers::chat::chat))
        .route("/chat/stream", post(handlers::chat::stream_chat))
        .route("/deploy", post(handlers::deploy::deploy))
        .route("/deployments/{id}", get(handlers::deploy::deployment_status));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}
