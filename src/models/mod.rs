mod ai_service;
mod ai_request;
mod sentiment;
mod text_generation;
mod data_analysis;
mod usage;
mod portfolio;
pub mod llm;

pub use ai_service::{AiService, AiServiceSummary, ServiceType};
pub use ai_request::{AiRequest, AiRequestView, RequestStatus};
pub use sentiment::{
    CreateSentimentAnalysis, Sentiment, SentimentAnalysis, SentimentHistoryItem,
    SentimentRequest, SentimentResult,
};
pub use text_generation::{
    CreateTextGeneration, GenerationParameters, TextGeneration, TextGenerationHistoryItem,
    TextGenerationRequest, TextGenerationResult, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
pub use data_analysis::{
    AnalysisOutcome, AnalysisType, ChartSpec, ChartType, CreateDataAnalysis, DataAnalysis,
    DataAnalysisHistoryItem, DataAnalysisRequest, DataAnalysisResult,
};
pub use usage::{AiUsage, UsageIncrement, UsageStat, UsageStatsQuery};
pub use portfolio::{
    Contact, ContactCreated, CreateContact, Project, Skill,
    SkillQuery, ValidContact,
};

/// Cuts `text` to `max_chars` characters and appends "..." when it was longer.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_with_ellipsis;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 100), "short");
        let long = "a".repeat(120);
        let cut = truncate_with_ellipsis(&long, 100);
        assert_eq!(cut.len(), 103);
        assert!(cut.ends_with("..."));
        // Counts characters, not bytes.
        assert_eq!(truncate_with_ellipsis("ééé", 2), "éé...");
    }
}
