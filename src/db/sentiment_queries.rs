use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateSentimentAnalysis, SentimentAnalysis};

pub async fn insert(
    pool: &PgPool,
    input: CreateSentimentAnalysis,
) -> Result<SentimentAnalysis, sqlx::Error> {
    sqlx::query_as::<_, SentimentAnalysis>(
        r#"
        INSERT INTO sentiment_analyses (id, text, sentiment, confidence, keywords)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, text, sentiment, confidence, keywords, created_at
        "#
    )
    .bind(Uuid::new_v4())
    .bind(input.text)
    .bind(input.sentiment)
    .bind(input.confidence)
    .bind(Json(input.keywords))
    .fetch_one(pool)
    .await
}

pub async fn fetch_recent(pool: &PgPool, limit: i64) -> Result<Vec<SentimentAnalysis>, sqlx::Error> {
    sqlx::query_as::<_, SentimentAnalysis>(
        r#"
        SELECT id, text, sentiment, confidence, keywords, created_at
        FROM sentiment_analyses
        ORDER BY created_at DESC
        LIMIT $1
        "#
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
