use std::sync::Arc;

use sqlx::PgPool;

use crate::services::llm_service::LlmProvider;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub llm: Arc<dyn LlmProvider>,
}
