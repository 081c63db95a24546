use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Daily per-service, per-user counters.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiUsage {
    pub id: Uuid,
    pub service_id: Uuid,
    pub user_id: Option<Uuid>,
    pub usage_date: NaiveDate,
    pub requests_count: i32,
    pub successful_requests: i32,
    pub failed_requests: i32,
    pub total_processing_time: f64,
    pub created_at: DateTime<Utc>,
}

impl AiUsage {
    pub fn is_consistent(&self) -> bool {
        self.requests_count == self.successful_requests + self.failed_requests
    }
}

/// One completed request to fold into the usage row.
#[derive(Debug, Clone, Copy)]
pub struct UsageIncrement {
    pub service_id: Uuid,
    pub user_id: Option<Uuid>,
    pub usage_date: NaiveDate,
    pub succeeded: bool,
    pub processing_time: f64,
}

/// Usage row as returned by `/api/usage-stats/`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageStat {
    pub service_name: String,
    pub date: NaiveDate,
    pub requests_count: i32,
    pub successful_requests: i32,
    pub failed_requests: i32,
    pub total_processing_time: f64,
}

#[derive(Debug, Deserialize)]
pub struct UsageStatsQuery {
    pub days: Option<i64>,
}
