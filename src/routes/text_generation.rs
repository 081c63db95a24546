use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::models::{
    GenerationParameters, TextGenerationHistoryItem, TextGenerationRequest, TextGenerationResult,
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use crate::routes::{json_body, required_text};
use crate::services::registry_service;
use crate::services::text_generation_service::TextGenerationService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/text-generation/", post(generate_text))
        .route("/api/text-generation/history/", get(text_generation_history))
}

/// POST /ai_services/api/text-generation/
#[axum::debug_handler]
pub async fn generate_text(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<TextGenerationRequest>, JsonRejection>,
) -> Result<Json<TextGenerationResult>, AppError> {
    let request = json_body(payload)?;
    let prompt = required_text(request.prompt.as_deref())
        .ok_or_else(|| AppError::Validation("Prompt is required".to_string()))?;

    let parameters = GenerationParameters {
        max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
    };

    info!(
        "POST /ai_services/api/text-generation/ - max_tokens: {}, temperature: {}",
        parameters.max_tokens, parameters.temperature
    );

    let result = TextGenerationService::new(&state.pool, state.llm.as_ref())
        .generate(prompt, parameters, user_id)
        .await
        .map_err(|e| {
            error!("Text generation failed: {}", e);
            e
        })?;

    Ok(Json(result))
}

/// GET /ai_services/api/text-generation/history/
#[axum::debug_handler]
pub async fn text_generation_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<TextGenerationHistoryItem>>, AppError> {
    info!("GET /ai_services/api/text-generation/history/");

    let history = registry_service::text_generation_history(&state.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch text generation history: {}", e);
            e
        })?;

    Ok(Json(history))
}
