use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// The four supported analyses over tabular input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Descriptive,
    Correlation,
    Trend,
    Clustering,
}

impl AnalysisType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Descriptive => "descriptive",
            AnalysisType::Correlation => "correlation",
            AnalysisType::Trend => "trend",
            AnalysisType::Clustering => "clustering",
        }
    }

    /// Stored record name, e.g. "Trend Analysis".
    pub fn record_name(&self) -> &'static str {
        match self {
            AnalysisType::Descriptive => "Descriptive Analysis",
            AnalysisType::Correlation => "Correlation Analysis",
            AnalysisType::Trend => "Trend Analysis",
            AnalysisType::Clustering => "Clustering Analysis",
        }
    }
}

impl Default for AnalysisType {
    fn default() -> Self {
        AnalysisType::Descriptive
    }
}

impl std::fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalysisType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "descriptive" => Ok(AnalysisType::Descriptive),
            "correlation" => Ok(AnalysisType::Correlation),
            "trend" => Ok(AnalysisType::Trend),
            "clustering" => Ok(AnalysisType::Clustering),
            other => Err(format!("Unsupported analysis type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Histogram,
    Heatmap,
    Line,
    Scatter,
}

/// One chart: a Plotly figure (`data` + `layout`) plus its title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: Value,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DataAnalysis {
    pub id: Uuid,
    pub name: String,
    pub analysis_type: AnalysisType,
    pub input_data: Json<Value>,
    pub results: Json<Value>,
    pub visualizations: Json<Vec<ChartSpec>>,
    pub insights: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateDataAnalysis {
    pub analysis_type: AnalysisType,
    pub input_data: Value,
    pub results: Value,
    pub visualizations: Vec<ChartSpec>,
    pub insights: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DataAnalysisRequest {
    pub data: Option<Value>,
    pub analysis_type: Option<String>,
}

/// Output of one dispatcher run, before it is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub results: Value,
    pub visualizations: Vec<ChartSpec>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataAnalysisResult {
    pub analysis_type: AnalysisType,
    pub results: Value,
    pub visualizations: Vec<ChartSpec>,
    pub insights: Vec<String>,
    pub analysis_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct DataAnalysisHistoryItem {
    pub id: Uuid,
    pub name: String,
    pub analysis_type: AnalysisType,
    pub insights: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DataAnalysis> for DataAnalysisHistoryItem {
    fn from(row: DataAnalysis) -> Self {
        Self {
            id: row.id,
            name: row.name,
            analysis_type: row.analysis_type,
            insights: row.insights.0,
            created_at: row.created_at,
        }
    }
}
