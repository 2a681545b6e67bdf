//! Checkpoint endpoints.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{CheckInRequest, CheckInResponse};
use crate::api::extract::HandlerIdentity;
use crate::app_state::AppState;
use crate::domain::{EventId, HandlerId};
use crate::error::{CheckInRejectedResponse, ErrorResponse, GatewayError};
use crate::service::CheckInCommand;

/// `POST /check-in` — General checkpoint.
///
/// # Errors
///
/// Returns [`GatewayError`] for an empty token, an unknown token, a token
/// scoped to another event (when `eventId` is sent), or a storage failure.
#[utoipa::path(
    post,
    path = "/api/v1/check-in",
    tag = "Check-in",
    summary = "Check in a scanned token",
    description = "Resolves the token, classifies the scan against the event window and records it. \
                   An `invalid` status is a successful call that does not count as attendance.",
    params(
        ("x-handler-id" = Option<uuid::Uuid>, Header, description = "Operator or device account"),
    ),
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Scan recorded", body = CheckInResponse),
        (status = 400, description = "Empty token or malformed handler header", body = ErrorResponse),
        (status = 404, description = "Unknown token (NOT_FOUND)", body = CheckInRejectedResponse),
        (status = 409, description = "Token belongs to another event (WRONG_EVENT)", body = CheckInRejectedResponse),
    )
)]
pub async fn check_in(
    State(state): State<AppState>,
    HandlerIdentity(handler_id): HandlerIdentity,
    Json(req): Json<CheckInRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let expected_event_id = req.event_id;
    run_check_in(&state, req, expected_event_id, handler_id).await
}

/// `POST /events/:id/check-in` — Event-scoped checkpoint.
///
/// # Errors
///
/// Returns [`GatewayError`] as for the general checkpoint, plus a
/// validation error if the body names a different event than the path.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/check-in",
    tag = "Check-in",
    summary = "Check in at an event checkpoint",
    description = "Same as the general checkpoint, but tokens registered for any other event are rejected with WRONG_EVENT.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        ("x-handler-id" = Option<uuid::Uuid>, Header, description = "Operator or device account"),
    ),
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Scan recorded", body = CheckInResponse),
        (status = 400, description = "Empty token or conflicting event ids", body = ErrorResponse),
        (status = 404, description = "Unknown token (NOT_FOUND)", body = CheckInRejectedResponse),
        (status = 409, description = "Token belongs to another event (WRONG_EVENT)", body = CheckInRejectedResponse),
    )
)]
pub async fn check_in_at_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    HandlerIdentity(handler_id): HandlerIdentity,
    Json(req): Json<CheckInRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let event_id = EventId::from_uuid(id);
    if let Some(body_event) = req.event_id
        && body_event != event_id
    {
        return Err(GatewayError::InvalidRequest(format!(
            "body eventId {body_event} does not match checkpoint event {event_id}"
        )));
    }
    run_check_in(&state, req, Some(event_id), handler_id).await
}

/// Check-in routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/check-in", post(check_in))
        .route("/events/{id}/check-in", post(check_in_at_event))
}

async fn run_check_in(
    state: &AppState,
    req: CheckInRequest,
    expected_event_id: Option<EventId>,
    handler_id: Option<HandlerId>,
) -> Result<Json<CheckInResponse>, GatewayError> {
    let receipt = state
        .check_in_service
        .check_in(CheckInCommand {
            token: req.token,
            expected_event_id,
            device_label: req.device_label,
            handler_id,
            scanned_at: req.scanned_at,
        })
        .await?;
    Ok(Json(CheckInResponse::from(receipt)))
}
