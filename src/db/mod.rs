pub mod ai_service_queries;
pub mod ai_request_queries;
pub mod sentiment_queries;
pub mod text_generation_queries;
pub mod data_analysis_queries;
pub mod usage_queries;
pub mod portfolio_queries;
