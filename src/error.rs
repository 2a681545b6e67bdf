//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Check-in rejections are rendered in the checkpoint response shape
//! (`{ "ok": false, "message", "code" }`) instead of the generic envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{CheckInRejection, RejectionCode};

/// Structured JSON error response body.
///
/// All non-check-in error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: token must not be empty",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Failure body returned by the check-in endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckInRejectedResponse {
    /// Always `false`.
    pub ok: bool,
    /// Human-readable reason.
    pub message: String,
    /// Machine-readable rejection code.
    pub code: RejectionCode,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(uuid::Uuid),

    /// Participant with the given ID was not found.
    #[error("participant not found: {0}")]
    ParticipantNotFound(uuid::Uuid),

    /// The participant already holds a registration for the event.
    #[error("participant {participant_id} is already registered for event {event_id}")]
    AlreadyRegistered {
        /// Event identifier.
        event_id: uuid::Uuid,
        /// Participant identifier.
        participant_id: uuid::Uuid,
    },

    /// The scan was permanently rejected by the check-in engine.
    #[error(transparent)]
    CheckInRejected(#[from] CheckInRejection),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::EventNotFound(_) => 2001,
            Self::ParticipantNotFound(_) => 2002,
            Self::AlreadyRegistered { .. } => 2003,
            Self::CheckInRejected(CheckInRejection::NotFound) => 2004,
            Self::CheckInRejected(CheckInRejection::WrongEvent { .. }) => 2005,
            Self::PersistenceError(_) => 3001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_)
            | Self::ParticipantNotFound(_)
            | Self::CheckInRejected(CheckInRejection::NotFound) => StatusCode::NOT_FOUND,
            Self::AlreadyRegistered { .. }
            | Self::CheckInRejected(CheckInRejection::WrongEvent { .. }) => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = match self {
            Self::CheckInRejected(rejection) => axum::Json(CheckInRejectedResponse {
                ok: false,
                message: rejection.to_string(),
                code: rejection.code(),
            })
            .into_response(),
            other => {
                if status.is_server_error() {
                    tracing::error!(error = %other, "request failed");
                }
                axum::Json(ErrorResponse {
                    error: ErrorBody {
                        code: other.error_code(),
                        message: other.to_string(),
                        details: None,
                    },
                })
                .into_response()
            }
        };
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::EventId;

    #[test]
    fn rejection_statuses() {
        assert_eq!(
            GatewayError::from(CheckInRejection::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        let wrong = CheckInRejection::WrongEvent {
            expected: EventId::new(),
            actual: EventId::new(),
        };
        assert_eq!(GatewayError::from(wrong).status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_is_bad_request() {
        let err = GatewayError::InvalidRequest("token must not be empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
    }

    #[test]
    fn persistence_is_server_error() {
        let err = GatewayError::PersistenceError("connection reset".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn rejection_renders_checkpoint_shape() {
        let response = GatewayError::from(CheckInRejection::NotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
