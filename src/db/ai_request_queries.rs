use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{AiRequest, AiRequestView, RequestStatus};

const REQUEST_COLUMNS: &str = "id, user_id, service_id, input_data, output_data, status, \
     error_message, processing_time, created_at, completed_at";

/// Open a request record directly in the processing state.
pub async fn insert_processing(
    pool: &PgPool,
    service_id: Uuid,
    user_id: Option<Uuid>,
    input_data: &str,
) -> Result<AiRequest, sqlx::Error> {
    sqlx::query_as::<_, AiRequest>(&format!(
        "INSERT INTO ai_requests (id, user_id, service_id, input_data, status)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {}",
        REQUEST_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(service_id)
    .bind(input_data)
    .bind(RequestStatus::Processing)
    .fetch_one(pool)
    .await
}

/// Close a processing request. Returns `None` when the record is missing or
/// already terminal, so a finished record is never transitioned twice.
pub async fn complete(
    conn: &mut PgConnection,
    id: Uuid,
    status: RequestStatus,
    output_data: &str,
    error_message: &str,
    processing_time: f64,
) -> Result<Option<AiRequest>, sqlx::Error> {
    sqlx::query_as::<_, AiRequest>(&format!(
        "UPDATE ai_requests
         SET status = $2, output_data = $3, error_message = $4,
             processing_time = $5, completed_at = $6
         WHERE id = $1 AND status = 'processing'
         RETURNING {}",
        REQUEST_COLUMNS
    ))
    .bind(id)
    .bind(status)
    .bind(output_data)
    .bind(error_message)
    .bind(processing_time)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await
}

pub async fn fetch_one(pool: &PgPool, id: Uuid) -> Result<Option<AiRequestView>, sqlx::Error> {
    sqlx::query_as::<_, AiRequestView>(
        r#"
        SELECT r.id, r.user_id, r.service_id, s.name AS service_name, r.input_data,
               r.output_data, r.status, r.error_message, r.processing_time,
               r.created_at, r.completed_at
        FROM ai_requests r
        JOIN ai_services s ON s.id = r.service_id
        WHERE r.id = $1
        "#
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Newest requests first, optionally restricted to one user.
pub async fn fetch_recent(
    pool: &PgPool,
    user_id: Option<Uuid>,
    limit: i64,
) -> Result<Vec<AiRequestView>, sqlx::Error> {
    sqlx::query_as::<_, AiRequestView>(
        r#"
        SELECT r.id, r.user_id, r.service_id, s.name AS service_name, r.input_data,
               r.output_data, r.status, r.error_message, r.processing_time,
               r.created_at, r.completed_at
        FROM ai_requests r
        JOIN ai_services s ON s.id = r.service_id
        WHERE ($1::uuid IS NULL OR r.user_id = $1)
        ORDER BY r.created_at DESC
        LIMIT $2
        "#
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
