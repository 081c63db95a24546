use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tracing::{error, info};

use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::models::{AnalysisType, DataAnalysisHistoryItem, DataAnalysisRequest, DataAnalysisResult};
use crate::routes::json_body;
use crate::services::data_analysis_service::DataAnalysisService;
use crate::services::registry_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/data-analysis/", post(analyze_data))
        .route("/api/data-analysis/history/", get(data_analysis_history))
}

fn is_empty_data(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// POST /ai_services/api/data-analysis/
#[axum::debug_handler]
pub async fn analyze_data(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<DataAnalysisRequest>, JsonRejection>,
) -> Result<Json<DataAnalysisResult>, AppError> {
    let request = json_body(payload)?;
    let data = request
        .data
        .filter(|d| !is_empty_data(d))
        .ok_or_else(|| AppError::Validation("Data is required".to_string()))?;

    let analysis_type = match request.analysis_type.as_deref() {
        Some(tag) => tag.parse::<AnalysisType>().map_err(AppError::Validation)?,
        None => AnalysisType::default(),
    };

    info!("POST /ai_services/api/data-analysis/ - type: {}", analysis_type);

    let result = DataAnalysisService::new(&state.pool)
        .analyze(&data, analysis_type, user_id)
        .await
        .map_err(|e| {
            error!("Data analysis ({}) failed: {}", analysis_type, e);
            e
        })?;

    Ok(Json(result))
}

/// GET /ai_services/api/data-analysis/history/
#[axum::debug_handler]
pub async fn data_analysis_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<DataAnalysisHistoryItem>>, AppError> {
    info!("GET /ai_services/api/data-analysis/history/");

    let history = registry_service::data_analysis_history(&state.pool)
        .await
        .map_err(|e| {
            error!("Failed to fetch data analysis history: {}", e);
            e
        })?;

    Ok(Json(history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_data_detection() {
        assert!(is_empty_data(&Value::Null));
        assert!(is_empty_data(&json!([])));
        assert!(is_empty_data(&json!({})));
        assert!(!is_empty_data(&json!([{"x": 1}])));
        assert!(!is_empty_data(&json!({"x": 1})));
    }
}
