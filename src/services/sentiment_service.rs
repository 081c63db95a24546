use sqlx::PgPool;
use uuid::Uuid;

use crate::db::sentiment_queries;
use crate::errors::AppError;
use crate::models::{CreateSentimentAnalysis, Sentiment, SentimentResult};
use crate::services::request_tracker::{RequestTracker, SENTIMENT_SERVICE};
use crate::services::sentiment_lexicon;

const MAX_KEYWORDS: usize = 10;

/// Classification of one text before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct SentimentAssessment {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub polarity: f64,
    pub subjectivity: f64,
    pub keywords: Vec<String>,
}

/// Score, label and extract keywords from `text`. Deterministic.
pub fn assess(text: &str) -> SentimentAssessment {
    let score = sentiment_lexicon::score(text);

    SentimentAssessment {
        sentiment: Sentiment::from_polarity(score.polarity),
        confidence: confidence(score.polarity, score.subjectivity),
        polarity: score.polarity,
        subjectivity: score.subjectivity,
        keywords: extract_keywords(text),
    }
}

/// |polarity| * (1 - subjectivity), kept inside [0, 1].
pub fn confidence(polarity: f64, subjectivity: f64) -> f64 {
    (polarity.abs() * (1.0 - subjectivity)).clamp(0.0, 1.0)
}

/// First ten lower-cased whitespace tokens longer than three characters,
/// in their original order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub struct SentimentService<'a> {
    pool: &'a PgPool,
}

impl<'a> SentimentService<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn analyze(&self, text: &str, user_id: Option<Uuid>) -> Result<SentimentResult, AppError> {
        let tracker = RequestTracker::for_service(self.pool, SENTIMENT_SERVICE).await?;

        tracker
            .track(user_id, text, async {
                let assessment = assess(text);

                let stored = sentiment_queries::insert(
                    self.pool,
                    CreateSentimentAnalysis {
                        text: text.to_string(),
                        sentiment: assessment.sentiment,
                        confidence: assessment.confidence,
                        keywords: assessment.keywords.clone(),
                    },
                )
                .await?;

                Ok::<_, AppError>(SentimentResult {
                    sentiment: assessment.sentiment,
                    confidence: round3(assessment.confidence),
                    polarity: round3(assessment.polarity),
                    subjectivity: round3(assessment.subjectivity),
                    keywords: assessment.keywords,
                    analysis_id: stored.id,
                })
            })
            .await
    }
}
