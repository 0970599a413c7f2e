use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::repository::RepositoryError;
use crate::access::DenialReason;

/// Failure taxonomy shared by every board operation.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("authentication required")]
    NotAuthenticated,
    #[error("access denied ({reason})")]
    AccessDenied { reason: DenialReason },
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Repository(RepositoryError),
}

impl BoardError {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        BoardError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Stable machine-readable discriminator for clients.
    pub fn kind(&self) -> &'static str {
        match self {
            BoardError::NotAuthenticated => "not_authenticated",
            BoardError::AccessDenied { .. } => "access_denied",
            BoardError::Validation { .. } => "validation_error",
            BoardError::Conflict(_) => "conflict",
            BoardError::InvalidState(_) => "invalid_state",
            BoardError::NotFound(_) => "not_found",
            BoardError::Repository(_) => "unavailable",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BoardError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            BoardError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            BoardError::Validation { .. } => StatusCode::BAD_REQUEST,
            BoardError::Conflict(_) | BoardError::InvalidState(_) => StatusCode::CONFLICT,
            BoardError::NotFound(_) => StatusCode::NOT_FOUND,
            BoardError::Repository(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<DenialReason> for BoardError {
    fn from(reason: DenialReason) -> Self {
        match reason {
            DenialReason::NotAuthenticated => BoardError::NotAuthenticated,
            reason => BoardError::AccessDenied { reason },
        }
    }
}

impl From<RepositoryError> for BoardError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateApplication { .. }
            | RepositoryError::DuplicateEmail(_)
            | RepositoryError::DuplicateTag(_) => BoardError::Conflict(err.to_string()),
            RepositoryError::Refused(refusal) => BoardError::InvalidState(refusal.to_string()),
            RepositoryError::StatusChanged { .. } | RepositoryError::JobStatusChanged { .. } => {
                BoardError::InvalidState(err.to_string())
            }
            RepositoryError::NotFound(what) => BoardError::NotFound(what),
            RepositoryError::Unavailable(_) => BoardError::Repository(err),
        }
    }
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let mut payload = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        match &self {
            BoardError::AccessDenied { reason } => payload["reason"] = json!(reason),
            BoardError::Validation { field, .. } => payload["field"] = json!(field),
            _ => {}
        }
        (self.status(), Json(payload)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::PrincipalId;
    use crate::board::domain::{AdmissionRefusal, ApplicationStatus, JobId, JobStatus};

    #[test]
    fn every_kind_maps_to_a_fixed_status() {
        let cases = [
            (BoardError::NotAuthenticated, StatusCode::UNAUTHORIZED),
            (
                BoardError::AccessDenied {
                    reason: DenialReason::NotOwner,
                },
                StatusCode::FORBIDDEN,
            ),
            (BoardError::validation("title", "too short"), StatusCode::BAD_REQUEST),
            (BoardError::Conflict("dup".into()), StatusCode::CONFLICT),
            (BoardError::InvalidState("closed".into()), StatusCode::CONFLICT),
            (BoardError::NotFound("job-000001".into()), StatusCode::NOT_FOUND),
            (
                BoardError::Repository(RepositoryError::Unavailable("offline".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.status(), status, "{}", error.kind());
        }
    }

    #[test]
    fn repository_errors_translate_into_the_taxonomy() {
        let duplicate = RepositoryError::DuplicateApplication {
            job_id: JobId(1),
            applicant: PrincipalId(2),
        };
        assert!(matches!(BoardError::from(duplicate), BoardError::Conflict(_)));

        let full = RepositoryError::Refused(AdmissionRefusal::AtCapacity { max_applicants: 1 });
        assert!(matches!(BoardError::from(full), BoardError::InvalidState(_)));

        let raced = RepositoryError::StatusChanged {
            current: ApplicationStatus::Accepted,
        };
        assert!(matches!(BoardError::from(raced), BoardError::InvalidState(_)));

        let moved = RepositoryError::JobStatusChanged {
            current: JobStatus::Filled,
        };
        match BoardError::from(moved) {
            BoardError::InvalidState(message) => assert_eq!(message, "job is already filled"),
            other => panic!("expected invalid state, got {other:?}"),
        }
    }
}
