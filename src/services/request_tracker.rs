use std::future::Future;
use std::time::Instant;

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::{ai_request_queries, ai_service_queries, usage_queries};
use crate::errors::AppError;
use crate::models::{AiRequest, AiService, RequestStatus, ServiceType, UsageIncrement};

pub const SENTIMENT_SERVICE: &str = ServiceType::Sentiment.display_name();
pub const TEXT_GENERATION_SERVICE: &str = ServiceType::TextGen.display_name();
pub const DATA_ANALYSIS_SERVICE: &str = ServiceType::DataAnalysis.display_name();

/// An open request: the record id plus the instant the call started.
#[derive(Debug)]
#[must_use = "an unfinished handle leaves the request in the processing state"]
pub struct RequestHandle {
    pub request_id: Uuid,
    pub user_id: Option<Uuid>,
    started: Instant,
}

impl RequestHandle {
    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

/// Opens and closes `ai_requests` records for one registered service and
/// folds each completion into the daily usage counters.
pub struct RequestTracker<'a> {
    pool: &'a PgPool,
    service: AiService,
}

impl<'a> RequestTracker<'a> {
    /// Look the service up in the registry. Unknown or inactive services are errors.
    pub async fn for_service(pool: &'a PgPool, name: &str) -> Result<Self, AppError> {
        let service = ai_service_queries::fetch_by_name(pool, name)
            .await?
            .ok_or_else(|| AppError::Service(format!("AI service '{}' is not registered", name)))?;

        if !service.is_active {
            return Err(AppError::Service(format!("AI service '{}' is not active", name)));
        }

        Ok(Self { pool, service })
    }

    pub async fn start(&self, user_id: Option<Uuid>, input_data: &str) -> Result<RequestHandle, AppError> {
        let request = ai_request_queries::insert_processing(
            self.pool,
            self.service.id,
            user_id,
            input_data,
        )
        .await?;

        info!("Started {} request {}", self.service.name, request.id);

        Ok(RequestHandle {
            request_id: request.id,
            user_id,
            started: Instant::now(),
        })
    }

    /// Close the request and bump usage in one transaction.
    ///
    /// A non-empty `error_message` marks the request failed.
    pub async fn complete(
        &self,
        handle: RequestHandle,
        output_data: &str,
        error_message: &str,
    ) -> Result<AiRequest, AppError> {
        let processing_time = handle.elapsed_secs();
        let status = RequestStatus::from_outcome(error_message);
        debug_assert!(RequestStatus::Processing.can_transition_to(status));

        let mut tx = self.pool.begin().await?;

        let request = ai_request_queries::complete(
            &mut *tx,
            handle.request_id,
            status,
            output_data,
            error_message,
            processing_time,
        )
        .await?
        .ok_or_else(|| {
            AppError::Service(format!("Request {} is not in the processing state", handle.request_id))
        })?;

        let increment = UsageIncrement {
            service_id: self.service.id,
            user_id: handle.user_id,
            usage_date: request
                .completed_at
                .unwrap_or(request.created_at)
                .date_naive(),
            succeeded: status == RequestStatus::Completed,
            processing_time,
        };
        let usage = usage_queries::record_completion(&mut *tx, &increment).await?;
        if !usage.is_consistent() {
            warn!(
                "Usage row {} is inconsistent: {} requests != {} ok + {} failed",
                usage.id, usage.requests_count, usage.successful_requests, usage.failed_requests
            );
        }

        tx.commit().await?;

        info!(
            "Completed {} request {} as {:?} in {:.3}s",
            self.service.name, request.id, status, processing_time
        );
        Ok(request)
    }

    /// Run `work` between `start` and `complete`.
    ///
    /// On success the serialized result becomes the request output. On failure
    /// the error text is recorded and the original error is returned. If
    /// recording the failure itself fails the request stays in processing; that
    /// is logged and the original error still wins.
    pub async fn track<T, Fut>(
        &self,
        user_id: Option<Uuid>,
        input_data: &str,
        work: Fut,
    ) -> Result<T, AppError>
    where
        T: Serialize,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let handle = self.start(user_id, input_data).await?;

        match work.await {
            Ok(result) => {
                let output = serde_json::to_string(&result)?;
                self.complete(handle, &output, "").await?;
                Ok(result)
            }
            Err(e) => {
                let request_id = handle.request_id;
                let message = failure_message(&e);
                if let Err(record_err) = self.complete(handle, "", &message).await {
                    warn!(
                        "Could not record failure for request {} (left processing): {}",
                        request_id, record_err
                    );
                }
                Err(e)
            }
        }
    }
}

/// Error text stored on a failed request. Never empty, so the record always
/// lands in `failed`.
fn failure_message(error: &AppError) -> String {
    let message = error.to_string();
    if message.is_empty() {
        "Unknown error".to_string()
    } else {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LlmError;

    #[test]
    fn test_failure_message_is_never_empty() {
        assert_eq!(failure_message(&AppError::Analysis(String::new())), "Unknown error");
        assert_eq!(
            failure_message(&AppError::Llm(LlmError::NotConfigured)),
            "OpenAI API key not configured"
        );
    }

    #[test]
    fn test_failed_outcome_maps_to_failed_status() {
        let message = failure_message(&AppError::Analysis("bad input".into()));
        assert_eq!(RequestStatus::from_outcome(&message), RequestStatus::Failed);
    }

    #[test]
    fn test_service_names_match_seeded_registry() {
        assert_eq!(SENTIMENT_SERVICE, "Sentiment Analysis");
        assert_eq!(TEXT_GENERATION_SERVICE, "Text Generation");
        assert_eq!(DATA_ANALYSIS_SERVICE, "Data Analysis");
    }

    /// Migrated pool from `TEST_DATABASE_URL`, or `None` to skip.
    async fn live_pool() -> Option<PgPool> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(4)
            .connect(&url)
            .await
            .ok()?;
        sqlx::migrate!().run(&pool).await.ok()?;
        Some(pool)
    }

    async fn usage_counters(pool: &PgPool, service_id: Uuid, user_id: Uuid) -> (i32, i32, i32) {
        sqlx::query_as::<_, (i32, i32, i32)>(
            "SELECT requests_count, successful_requests, failed_requests
             FROM ai_usage WHERE service_id = $1 AND user_id = $2",
        )
        .bind(service_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_track_records_failure_then_success() {
        let Some(pool) = live_pool().await else { return };
        let tracker = RequestTracker::for_service(&pool, SENTIMENT_SERVICE).await.unwrap();
        let user = Uuid::new_v4();

        let failed = tracker
            .track(Some(user), "broken input", async {
                Err::<serde_json::Value, _>(AppError::Analysis("boom".to_string()))
            })
            .await;
        assert!(matches!(failed, Err(AppError::Analysis(ref m)) if m == "boom"));

        let ok = tracker
            .track(Some(user), "fine input", async {
                Ok::<_, AppError>(serde_json::json!({"sentiment": "positive"}))
            })
            .await
            .unwrap();
        assert_eq!(ok["sentiment"], "positive");

        let rows = sqlx::query_as::<_, (String, RequestStatus, String, String)>(
            "SELECT input_data, status, error_message, output_data
             FROM ai_requests WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user)
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "broken input");
        assert_eq!(rows[0].1, RequestStatus::Failed);
        assert_eq!(rows[0].2, "boom");
        assert_eq!(rows[1].1, RequestStatus::Completed);
        assert_eq!(rows[1].2, "");
        assert_eq!(rows[1].3, r#"{"sentiment":"positive"}"#);

        assert_eq!(usage_counters(&pool, tracker.service.id, user).await, (2, 1, 1));
    }

    #[tokio::test]
    async fn test_finished_request_is_not_completed_twice() {
        let Some(pool) = live_pool().await else { return };
        let tracker = RequestTracker::for_service(&pool, DATA_ANALYSIS_SERVICE).await.unwrap();
        let user = Uuid::new_v4();

        let handle = tracker.start(Some(user), "{}").await.unwrap();
        let request_id = handle.request_id;
        let done = tracker.complete(handle, "{}", "").await.unwrap();
        assert_eq!(done.status, RequestStatus::Completed);
        assert!(done.completed_at.is_some());

        let again = RequestHandle {
            request_id,
            user_id: Some(user),
            started: Instant::now(),
        };
        let second = tracker.complete(again, "", "late failure").await;
        assert!(matches!(second, Err(AppError::Service(_))));

        // The refused completion rolls back, so usage still counts one request.
        assert_eq!(usage_counters(&pool, tracker.service.id, user).await, (1, 1, 0));
        let status: RequestStatus =
            sqlx::query_scalar("SELECT status FROM ai_requests WHERE id = $1")
                .bind(request_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(status, RequestStatus::Completed);
    }

    #[tokio::test]
    async fn test_sequential_completions_keep_counters_consistent() {
        let Some(pool) = live_pool().await else { return };
        let tracker = RequestTracker::for_service(&pool, TEXT_GENERATION_SERVICE).await.unwrap();
        let user = Uuid::new_v4();

        for i in 0..7 {
            let handle = tracker.start(Some(user), "prompt").await.unwrap();
            let error = if i % 3 == 0 { "upstream down" } else { "" };
            tracker.complete(handle, "", error).await.unwrap();
        }

        let (requests, succeeded, failed) = usage_counters(&pool, tracker.service.id, user).await;
        assert_eq!(requests, 7);
        assert_eq!(failed, 3);
        assert_eq!(requests, succeeded + failed);
    }

    #[test]
    fn test_handle_elapsed_is_non_negative() {
        let handle = RequestHandle {
            request_id: Uuid::new_v4(),
            user_id: None,
            started: Instant::now(),
        };
        assert!(handle.elapsed_secs() >= 0.0);
    }
}
