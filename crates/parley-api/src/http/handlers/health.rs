//! Liveness endpoint.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::state::AppState;

/// GET /health - Status, version and which optional services are wired.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "web_search": state.orchestrator.has_search(),
        "smart_prompt": state.smart_prompt.is_some(),
    }))
}
