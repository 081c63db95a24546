use sqlx::PgPool;

use crate::models::AiService;

pub async fn fetch_by_name(pool: &PgPool, name: &str) -> Result<Option<AiService>, sqlx::Error> {
    sqlx::query_as::<_, AiService>(
        r#"
        SELECT id, name, service_type, description, is_active, created_at, updated_at
        FROM ai_services
        WHERE name = $1
        "#
    )
    .bind(name)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_active(pool: &PgPool) -> Result<Vec<AiService>, sqlx::Error> {
    sqlx::query_as::<_, AiService>(
        r#"
        SELECT id, name, service_type, description, is_active, created_at, updated_at
        FROM ai_services
        WHERE is_active = TRUE
        ORDER BY name ASC
        "#
    )
    .fetch_all(pool)
    .await
}
