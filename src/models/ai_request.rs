use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a tracked AI request.
///
/// `Pending -> Processing -> {Completed, Failed}`; the last two are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Failed)
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Processing)
                | (RequestStatus::Processing, RequestStatus::Completed)
                | (RequestStatus::Processing, RequestStatus::Failed)
        )
    }

    /// Terminal status for a finished call given its error text.
    pub fn from_outcome(error_message: &str) -> Self {
        if error_message.is_empty() {
            RequestStatus::Completed
        } else {
            RequestStatus::Failed
        }
    }
}

/// Audit record of one service invocation and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiRequest {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub service_id: Uuid,
    pub input_data: String,
    pub output_data: String,
    pub status: RequestStatus,
    pub error_message: String,
    pub processing_time: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Request record joined with the name of its service, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiRequestView {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub service_id: Uuid,
    pub service_name: String,
    pub input_data: String,
    pub output_data: String,
    pub status: RequestStatus,
    pub error_message: String,
    pub processing_time: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_outcome() {
        assert_eq!(RequestStatus::from_outcome(""), RequestStatus::Completed);
        assert_eq!(RequestStatus::from_outcome("boom"), RequestStatus::Failed);
    }

    #[test]
    fn test_terminal_states_do_not_transition() {
        for terminal in [RequestStatus::Completed, RequestStatus::Failed] {
            assert!(terminal.is_terminal());
            for next in [
                RequestStatus::Pending,
                RequestStatus::Processing,
                RequestStatus::Completed,
                RequestStatus::Failed,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_allowed_transitions() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Processing));
        assert!(RequestStatus::Processing.can_transition_to(RequestStatus::Completed));
        assert!(RequestStatus::Processing.can_transition_to(RequestStatus::Failed));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Completed));
    }
}
