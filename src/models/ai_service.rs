use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of capability an AI service record stands for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Sentiment,
    TextGen,
    DataAnalysis,
    ImageGen,
    CodeGen,
    Translation,
}

impl ServiceType {
    pub const fn display_name(&self) -> &'static str {
        match self {
            ServiceType::Sentiment => "Sentiment Analysis",
            ServiceType::TextGen => "Text Generation",
            ServiceType::DataAnalysis => "Data Analysis",
            ServiceType::ImageGen => "Image Generation",
            ServiceType::CodeGen => "Code Generation",
            ServiceType::Translation => "Translation",
        }
    }
}

/// Registry entry for a named AI service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiService {
    pub id: Uuid,
    pub name: String,
    pub service_type: ServiceType,
    pub description: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public listing shape for `/api/services/`.
#[derive(Debug, Clone, Serialize)]
pub struct AiServiceSummary {
    pub id: Uuid,
    pub name: String,
    pub service_type: ServiceType,
    pub description: String,
}

impl From<AiService> for AiServiceSummary {
    fn from(service: AiService) -> Self {
        Self {
            id: service.id,
            name: service.name,
            service_type: service.service_type,
            description: service.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ServiceType::TextGen).unwrap(), "\"text_gen\"");
        assert_eq!(serde_json::to_string(&ServiceType::DataAnalysis).unwrap(), "\"data_analysis\"");
        let parsed: ServiceType = serde_json::from_str("\"image_gen\"").unwrap();
        assert_eq!(parsed, ServiceType::ImageGen);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ServiceType::Sentiment.display_name(), "Sentiment Analysis");
        assert_eq!(ServiceType::Translation.display_name(), "Translation");
    }
}
