//! Axum router construction.
//!
//! Endpoints sit at the root, matching the paths the web client calls.
//! CORS is permissive and every request is traced.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::state::AppState;

/// Build the complete router with middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/chat", post(handlers::chat::post_chat))
        .route("/chat/{id}", get(handlers::chat::get_chat_messages))
        .route("/chats", get(handlers::chat::list_chats))
        .route("/smart-prompt", post(handlers::smart_prompt::optimize_prompt))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
