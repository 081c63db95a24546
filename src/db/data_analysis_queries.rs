use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateDataAnalysis, DataAnalysis};

pub async fn insert(
    pool: &PgPool,
    input: CreateDataAnalysis,
) -> Result<DataAnalysis, sqlx::Error> {
    sqlx::query_as::<_, DataAnalysis>(
        r#"
        INSERT INTO data_analyses (id, name, analysis_type, input_data, results, visualizations, insights)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, name, analysis_type, input_data, results, visualizations, insights, created_at
        "#
    )
    .bind(Uuid::new_v4())
    .bind(input.analysis_type.record_name())
    .bind(input.analysis_type)
    .bind(Json(input.input_data))
    .bind(Json(input.results))
    .bind(Json(input.visualizations))
    .bind(Json(input.insights))
    .fetch_one(pool)
    .await
}

pub async fn fetch_recent(pool: &PgPool, limit: i64) -> Result<Vec<DataAnalysis>, sqlx::Error> {
    sqlx::query_as::<_, DataAnalysis>(
        r#"
        SELECT id, name, analysis_type, input_data, results, visualizations, insights, created_at
        FROM data_analyses
        ORDER BY created_at DESC
        LIMIT $1
        "#
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
