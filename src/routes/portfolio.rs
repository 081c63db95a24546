use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{ContactCreated, CreateContact, Project, Skill, SkillQuery};
use crate::routes::{json_body, query_params};
use crate::services::portfolio_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/skills/", get(list_skills))
        .route("/projects/", get(list_projects))
        .route("/contact/", post(submit_contact))
}

/// GET /api/skills/?category=
#[axum::debug_handler]
pub async fn list_skills(
    State(state): State<AppState>,
    query: Result<Query<SkillQuery>, QueryRejection>,
) -> Result<Json<Vec<Skill>>, AppError> {
    let query = query_params(query)?;
    info!("GET /api/skills/ - category: {:?}", query.category);

    let skills = portfolio_service::fetch_skills(&state.pool, query.category.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to fetch skills: {}", e);
            e
        })?;

    Ok(Json(skills))
}

/// GET /api/projects/
#[axum::debug_handler]
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, AppError> {
    info!("GET /api/projects/");

    let projects = portfolio_service::fetch_projects(&state.pool).await.map_err(|e| {
        error!("Failed to fetch projects: {}", e);
        e
    })?;

    Ok(Json(projects))
}

/// POST /api/contact/
#[axum::debug_handler]
pub async fn submit_contact(
    State(state): State<AppState>,
    payload: Result<Json<CreateContact>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactCreated>), AppError> {
    let input = json_body(payload)?;
    info!("POST /api/contact/");

    let contact = portfolio_service::submit_contact(&state.pool, input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactCreated {
            message: "Message sent successfully!".to_string(),
            id: contact.id,
        }),
    ))
}
