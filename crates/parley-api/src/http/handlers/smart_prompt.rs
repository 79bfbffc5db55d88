//! Smart prompt HTTP handler.
//!
//! Endpoint:
//! - POST /smart-prompt - Ask the utility model to tighten a draft prompt

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;

use parley_types::prompt::SmartPromptResult;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for POST /smart-prompt.
#[derive(Debug, Deserialize)]
pub struct SmartPromptRequest {
    pub prompt: String,
}

/// POST /smart-prompt - Issues found plus the optimized prompt.
///
/// Any failure of the utility model returns the draft unchanged.
pub async fn optimize_prompt(
    State(state): State<AppState>,
    payload: Result<Json<SmartPromptRequest>, JsonRejection>,
) -> Result<Json<SmartPromptResult>, AppError> {
    let Json(request) = payload?;

    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt must not be empty".to_string()));
    }

    let result = match &state.smart_prompt {
        Some(service) => service.optimize(&request.prompt).await,
        None => {
            let tokens = state.token_counter.count(&request.prompt);
            SmartPromptResult::unchanged(&request.prompt, tokens)
        }
    };

    Ok(Json(result))
}
