pub mod request_tracker;
pub mod sentiment_lexicon;
pub mod sentiment_service;
pub mod llm_service;
pub mod text_generation_service;
pub mod tabular;
pub mod clustering;
pub mod charts;
pub mod data_analysis_service;
pub mod registry_service;
pub mod portfolio_service;
