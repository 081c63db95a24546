use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{
    ai_request_queries, ai_service_queries, data_analysis_queries, sentiment_queries,
    text_generation_queries, usage_queries,
};
use crate::errors::AppError;
use crate::models::{
    AiRequestView, AiServiceSummary, DataAnalysisHistoryItem, SentimentHistoryItem,
    TextGenerationHistoryItem, UsageStat,
};

pub const DEFAULT_USAGE_DAYS: i64 = 30;
pub const DEFAULT_REQUEST_LIMIT: i64 = 10;
pub const MAX_REQUEST_LIMIT: i64 = 100;
pub const HISTORY_LIMIT: i64 = 50;

pub async fn active_services(pool: &PgPool) -> Result<Vec<AiServiceSummary>, AppError> {
    let services = ai_service_queries::fetch_active(pool).await?;
    Ok(services.into_iter().map(AiServiceSummary::from).collect())
}

/// Inclusive `[today - days, today]` window.
pub fn usage_window(today: NaiveDate, days: Option<i64>) -> Result<(NaiveDate, NaiveDate), AppError> {
    let days = days.unwrap_or(DEFAULT_USAGE_DAYS);
    if days < 0 {
        return Err(AppError::Validation("days must not be negative".to_string()));
    }
    let start = Duration::try_days(days)
        .and_then(|span| today.checked_sub_signed(span))
        .ok_or_else(|| AppError::Validation(format!("days is out of range: {}", days)))?;
    Ok((start, today))
}

pub async fn usage_stats(
    pool: &PgPool,
    user_id: Option<Uuid>,
    days: Option<i64>,
) -> Result<Vec<UsageStat>, AppError> {
    let (start, end) = usage_window(Utc::now().date_naive(), days)?;
    let stats = usage_queries::fetch_in_range(pool, user_id, start, end).await?;
    Ok(stats)
}

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_REQUEST_LIMIT).clamp(1, MAX_REQUEST_LIMIT)
}

pub async fn recent_requests(
    pool: &PgPool,
    user_id: Option<Uuid>,
    limit: Option<i64>,
) -> Result<Vec<AiRequestView>, AppError> {
    let requests = ai_request_queries::fetch_recent(pool, user_id, clamp_limit(limit)).await?;
    Ok(requests)
}

pub async fn request_detail(pool: &PgPool, id: Uuid) -> Result<AiRequestView, AppError> {
    ai_request_queries::fetch_one(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("AI request not found".to_string()))
}

pub async fn sentiment_history(pool: &PgPool) -> Result<Vec<SentimentHistoryItem>, AppError> {
    let rows = sentiment_queries::fetch_recent(pool, HISTORY_LIMIT).await?;
    Ok(rows.into_iter().map(SentimentHistoryItem::from).collect())
}

pub async fn text_generation_history(pool: &PgPool) -> Result<Vec<TextGenerationHistoryItem>, AppError> {
    let rows = text_generation_queries::fetch_recent(pool, HISTORY_LIMIT).await?;
    Ok(rows.into_iter().map(TextGenerationHistoryItem::from).collect())
}

pub async fn data_analysis_history(pool: &PgPool) -> Result<Vec<DataAnalysisHistoryItem>, AppError> {
    let rows = data_analysis_queries::fetch_recent(pool, HISTORY_LIMIT).await?;
    Ok(rows.into_iter().map(DataAnalysisHistoryItem::from).collect())
}
