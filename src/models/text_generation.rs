use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_MAX_TOKENS: u32 = 100;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GenerationParameters {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TextGeneration {
    pub id: Uuid,
    pub prompt: String,
    pub generated_text: String,
    pub model_used: String,
    pub parameters: Json<GenerationParameters>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTextGeneration {
    pub prompt: String,
    pub generated_text: String,
    pub model_used: String,
    pub parameters: GenerationParameters,
}

#[derive(Debug, Deserialize)]
pub struct TextGenerationRequest {
    pub prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextGenerationResult {
    pub generated_text: String,
    pub model_used: String,
    pub parameters: GenerationParameters,
    pub generation_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextGenerationHistoryItem {
    pub id: Uuid,
    pub prompt: String,
    pub generated_text: String,
    pub model_used: String,
    pub parameters: GenerationParameters,
    pub created_at: DateTime<Utc>,
}

impl From<TextGeneration> for TextGenerationHistoryItem {
    fn from(row: TextGeneration) -> Self {
        Self {
            id: row.id,
            prompt: super::truncate_with_ellipsis(&row.prompt, 100),
            generated_text: super::truncate_with_ellipsis(&row.generated_text, 200),
            model_used: row.model_used,
            parameters: row.parameters.0,
            created_at: row.created_at,
        }
    }
}
