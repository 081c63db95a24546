use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::CurrentUser;
use crate::models::{AiRequestView, AiServiceSummary, UsageStat, UsageStatsQuery};
use crate::routes::{path_param, query_params};
use crate::services::registry_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/services/", get(list_services))
        .route("/api/usage-stats/", get(usage_stats))
        .route("/api/requests/", get(recent_requests))
        .route("/api/requests/:id/", get(request_detail))
        .route("/v1/models/", get(models))
}

#[derive(Debug, Deserialize)]
pub struct RecentRequestsQuery {
    pub limit: Option<i64>,
}

/// GET /ai_services/api/services/
#[axum::debug_handler]
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<AiServiceSummary>>, AppError> {
    info!("GET /ai_services/api/services/");

    let services = registry_service::active_services(&state.pool).await.map_err(|e| {
        error!("Failed to list AI services: {}", e);
        e
    })?;

    Ok(Json(services))
}

/// GET /ai_services/api/usage-stats/?days=30
#[axum::debug_handler]
pub async fn usage_stats(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    query: Result<Query<UsageStatsQuery>, QueryRejection>,
) -> Result<Json<Vec<UsageStat>>, AppError> {
    let query = query_params(query)?;
    info!("GET /ai_services/api/usage-stats/ - days: {:?}", query.days);

    let stats = registry_service::usage_stats(&state.pool, user_id, query.days)
        .await
        .map_err(|e| {
            error!("Failed to fetch usage stats: {}", e);
            e
        })?;

    Ok(Json(stats))
}

/// GET /ai_services/api/requests/?limit=10
#[axum::debug_handler]
pub async fn recent_requests(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    query: Result<Query<RecentRequestsQuery>, QueryRejection>,
) -> Result<Json<Vec<AiRequestView>>, AppError> {
    let query = query_params(query)?;
    info!("GET /ai_services/api/requests/ - limit: {:?}", query.limit);

    let requests = registry_service::recent_requests(&state.pool, user_id, query.limit)
        .await
        .map_err(|e| {
            error!("Failed to fetch recent requests: {}", e);
            e
        })?;

    Ok(Json(requests))
}

/// GET /ai_services/api/requests/:id/
#[axum::debug_handler]
pub async fn request_detail(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AiRequestView>, AppError> {
    let id = path_param(id)?;
    info!("GET /ai_services/api/requests/{}/", id);

    let request = registry_service::request_detail(&state.pool, id).await?;
    Ok(Json(request))
}

/// GET /ai_services/v1/models/
pub async fn models() -> Json<Value> {
    Json(json!({
        "message": "This is the /v1/models endpoint.",
        "version": "1.0"
    }))
}
