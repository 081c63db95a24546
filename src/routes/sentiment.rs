use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::models::{SentimentHistoryItem, SentimentRequest, SentimentResult};
use crate::routes::{json_body, required_text};
use crate::services::registry_service;
use crate::services::sentiment_service::SentimentService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sentiment/", post(analyze_sentiment))
        .route("/api/sentiment/history/", get(sentiment_history))
}

/// POST /ai_services/api/sentiment/
#[axum::debug_handler]
pub async fn analyze_sentiment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<SentimentRequest>, JsonRejection>,
) -> Result<Json<SentimentResult>, AppError> {
    let request = json_body(payload)?;
    let text = required_text(request.text.as_deref())
        .ok_or_else(|| AppError::Validation("Text is required".to_string()))?;

    info!("POST /ai_services/api/sentiment/ - {} chars", text.chars().count());

    let result = SentimentService::new(&state.pool)
        .analyze(text, user_id)
        .await
        .map_err(|e| {
            error!("Sentiment analysis failed: {}", e);
            e
        })?;

    Ok(Json(result))
}

/// GET /ai_services/api/sentiment/history/
#[axum::debug_handler]
pub async fn sentiment_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<SentimentHistoryItem>>, AppError> {
    info!("GET /ai_services/api/sentiment/history/");

    let history = registry_service::sentiment_history(&state.pool).await.map_err(|e| {
        error!("Failed to fetch sentiment history: {}", e);
        e
    })?;

    Ok(Json(history))
}
