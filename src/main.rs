mod app;
mod config;
mod db;
mod errors;
mod identity;
mod logging;
mod models;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::logging::{init_logging, LoggingConfig};
use crate::services::llm_service::OpenAiProvider;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("Database migrations applied");

    if config.llm.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; text generation requests will fail");
    }
    let llm = OpenAiProvider::new(&config.llm)?;
    tracing::info!(
        "Using language model {} at {}",
        config.llm.default_model,
        config.llm.base_url
    );

    let state = AppState {
        pool,
        llm: Arc::new(llm),
    };
    let app = app::create_app(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("AI services backend running at http://{}/", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
