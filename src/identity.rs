use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::errors::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Optional caller identity taken from the `X-User-Id` header.
///
/// A missing header is an anonymous caller. A header that is present but not
/// a UUID is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Option<Uuid>);

impl CurrentUser {
    pub fn from_header(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(CurrentUser(None)),
            Some(raw) => Uuid::parse_str(raw)
                .map(|id| CurrentUser(Some(id)))
                .map_err(|_| AppError::Validation(format!("Invalid X-User-Id header: {}", raw))),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = match parts.headers.get(USER_ID_HEADER) {
            Some(value) => Some(
                value
                    .to_str()
                    .map_err(|_| AppError::Validation("Invalid X-User-Id header".to_string()))?,
            ),
            None => None,
        };
        CurrentUser::from_header(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_header_is_anonymous() {
        assert_eq!(CurrentUser::from_header(None).unwrap(), CurrentUser(None));
        assert_eq!(CurrentUser::from_header(Some("  ")).unwrap(), CurrentUser(None));
    }

    #[test]
    fn test_uuid_header() {
        let id = Uuid::new_v4();
        let user = CurrentUser::from_header(Some(&id.to_string())).unwrap();
        assert_eq!(user, CurrentUser(Some(id)));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        assert!(matches!(
            CurrentUser::from_header(Some("bob")),
            Err(AppError::Validation(_))
        ));
    }
}
