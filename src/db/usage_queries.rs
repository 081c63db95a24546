use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{AiUsage, UsageIncrement, UsageStat};

/// Fold one completed request into its (service, user, date) row.
///
/// Single statement upsert; concurrent completions for the same key serialize
/// on the row lock instead of overwriting each other.
pub async fn record_completion(
    conn: &mut PgConnection,
    increment: &UsageIncrement,
) -> Result<AiUsage, sqlx::Error> {
    let (succeeded, failed) = if increment.succeeded { (1, 0) } else { (0, 1) };

    sqlx::query_as::<_, AiUsage>(
        r#"
        INSERT INTO ai_usage (id, service_id, user_id, usage_date, requests_count,
                              successful_requests, failed_requests, total_processing_time)
        VALUES ($1, $2, $3, $4, 1, $5, $6, $7)
        ON CONFLICT (service_id, user_id, usage_date)
        DO UPDATE SET
            requests_count = ai_usage.requests_count + 1,
            successful_requests = ai_usage.successful_requests + EXCLUDED.successful_requests,
            failed_requests = ai_usage.failed_requests + EXCLUDED.failed_requests,
            total_processing_time = ai_usage.total_processing_time + EXCLUDED.total_processing_time
        RETURNING id, service_id, user_id, usage_date, requests_count, successful_requests,
                  failed_requests, total_processing_time, created_at
        "#
    )
    .bind(Uuid::new_v4())
    .bind(increment.service_id)
    .bind(increment.user_id)
    .bind(increment.usage_date)
    .bind(succeeded)
    .bind(failed)
    .bind(increment.processing_time)
    .fetch_one(conn)
    .await
}

/// Usage rows between two dates (inclusive), newest first.
pub async fn fetch_in_range(
    pool: &PgPool,
    user_id: Option<Uuid>,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<UsageStat>, sqlx::Error> {
    sqlx::query_as::<_, UsageStat>(
        r#"
        SELECT s.name AS service_name, u.usage_date AS date, u.requests_count,
               u.successful_requests, u.failed_requests, u.total_processing_time
        FROM ai_usage u
        JOIN ai_services s ON s.id = u.service_id
        WHERE u.usage_date BETWEEN $1 AND $2
          AND ($3::uuid IS NULL OR u.user_id = $3)
        ORDER BY u.usage_date DESC, s.name ASC
        "#
    )
    .bind(start_date)
    .bind(end_date)
    .bind(user_id)
    .fetch_all(pool)
    .await
}
