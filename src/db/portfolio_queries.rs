use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Contact, Project, Skill, ValidContact};

/// Skills ordered by category, strongest first within a category.
pub async fn fetch_skills(pool: &PgPool, category: Option<&str>) -> Result<Vec<Skill>, sqlx::Error> {
    sqlx::query_as::<_, Skill>(
        r#"
        SELECT id, name, category, proficiency, icon, description, created_at
        FROM skills
        WHERE ($1::text IS NULL OR category = $1)
        ORDER BY category ASC, proficiency DESC
        "#
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

pub async fn fetch_projects(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        r#"
        SELECT p.id, p.title, p.description, p.short_description, p.image, p.github_url,
               p.live_url, p.status, p.featured,
               COALESCE(
                   ARRAY_AGG(s.name ORDER BY s.name) FILTER (WHERE s.name IS NOT NULL),
                   ARRAY[]::text[]
               ) AS technologies,
               p.created_at
        FROM projects p
        LEFT JOIN project_technologies pt ON pt.project_id = p.id
        LEFT JOIN skills s ON s.id = pt.skill_id
        GROUP BY p.id
        ORDER BY p.created_at DESC
        "#
    )
    .fetch_all(pool)
    .await
}

pub async fn insert_contact(pool: &PgPool, input: ValidContact) -> Result<Contact, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        r#"
        INSERT INTO contacts (id, name, email, subject, message)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, email, subject, message, read, created_at
        "#
    )
    .bind(Uuid::new_v4())
    .bind(input.name)
    .bind(input.email)
    .bind(input.subject)
    .bind(input.message)
    .fetch_one(pool)
    .await
}
