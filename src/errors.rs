use std::collections::BTreeMap;

use axum::response::IntoResponse;
use axum::Json;
use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Db(sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("Invalid form submission")]
    Form(BTreeMap<String, Vec<String>>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Llm(#[from] LlmError),
    #[error("{0}")]
    Analysis(String),
    #[error("{0}")]
    Service(String),
}

/// Failures talking to the hosted language model.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OpenAI API key not configured")]
    NotConfigured,
    #[error("Request to language model timed out")]
    Timeout,
    #[error("Language model rate limit exceeded")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Form(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Db(_) | AppError::Llm(_) | AppError::Analysis(_) | AppError::Service(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        match self {
            AppError::Form(errors) => (status, Json(json!({ "errors": errors }))).into_response(),
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        AppError::Db(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::Analysis(value.to_string())
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Llm(LlmError::Timeout).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(AppError::Analysis("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages_are_passed_through() {
        let err = AppError::Llm(LlmError::NotConfigured);
        assert_eq!(err.to_string(), "OpenAI API key not configured");

        let err = AppError::Validation("Prompt is required".into());
        assert_eq!(err.to_string(), "Prompt is required");
    }
}
