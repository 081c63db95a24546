use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateTextGeneration, TextGeneration};

pub async fn insert(
    pool: &PgPool,
    input: CreateTextGeneration,
) -> Result<TextGeneration, sqlx::Error> {
    sqlx::query_as::<_, TextGeneration>(
        r#"
        INSERT INTO text_generations (id, prompt, generated_text, model_used, parameters)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, prompt, generated_text, model_used, parameters, created_at
        "#
    )
    .bind(Uuid::new_v4())
    .bind(input.prompt)
    .bind(input.generated_text)
    .bind(input.model_used)
    .bind(Json(input.parameters))
    .fetch_one(pool)
    .await
}

pub async fn fetch_recent(pool: &PgPool, limit: i64) -> Result<Vec<TextGeneration>, sqlx::Error> {
    sqlx::query_as::<_, TextGeneration>(
        r#"
        SELECT id, prompt, generated_text, model_used, parameters, created_at
        FROM text_generations
        ORDER BY created_at DESC
        LIMIT $1
        "#
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
