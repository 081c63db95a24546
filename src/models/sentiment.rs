use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Polarity above 0.1 is positive, below -0.1 negative.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.1 {
            Sentiment::Positive
        } else if polarity < -0.1 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

/// Stored sentiment result.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SentimentAnalysis {
    pub id: Uuid,
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub keywords: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSentimentAnalysis {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub polarity: f64,
    pub subjectivity: f64,
    pub keywords: Vec<String>,
    pub analysis_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentHistoryItem {
    pub id: Uuid,
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SentimentAnalysis> for SentimentHistoryItem {
    fn from(row: SentimentAnalysis) -> Self {
        Self {
            id: row.id,
            text: super::truncate_with_ellipsis(&row.text, 100),
            sentiment: row.sentiment,
            confidence: row.confidence,
            keywords: row.keywords.0,
            created_at: row.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_polarity_thresholds() {
        assert_eq!(Sentiment::from_polarity(0.5), Sentiment::Positive);
        assert_eq!(Sentiment::from_polarity(0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(0.0), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(-0.1), Sentiment::Neutral);
        assert_eq!(Sentiment::from_polarity(-0.11), Sentiment::Negative);
    }
}
