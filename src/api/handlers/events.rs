//! Event, participant and registration handlers plus attendance reports.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    AttendanceLogResponse, AttendanceSummaryResponse, CreateEventRequest,
    CreateParticipantRequest, PaginationParams, RegisterParticipantRequest, RegistrationResponse,
};
use crate::app_state::AppState;
use crate::domain::{Event, EventId, Participant};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::NewEvent;

/// `POST /events` — Create an event.
///
/// # Errors
///
/// Returns [`GatewayError`] on a blank title or an inverted window.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Invalid event", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let event = state
        .event_service
        .create_event(NewEvent {
            title: req.title,
            date: req.date,
            start_at: req.start_at,
            end_at: req.end_at,
            late_threshold_minutes: req.late_threshold_minutes,
            owner_id: req.owner_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /events/:id` — Get event details.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get event details",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = Event),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let event = state
        .event_service
        .get_event(EventId::from_uuid(id))
        .await?;
    Ok(Json(event))
}

/// `POST /participants` — Create a participant.
///
/// # Errors
///
/// Returns [`GatewayError`] on a blank name.
#[utoipa::path(
    post,
    path = "/api/v1/participants",
    tag = "Events",
    summary = "Create a participant",
    request_body = CreateParticipantRequest,
    responses(
        (status = 201, description = "Participant created", body = Participant),
        (status = 400, description = "Invalid participant", body = ErrorResponse),
    )
)]
pub async fn create_participant(
    State(state): State<AppState>,
    Json(req): Json<CreateParticipantRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let participant = state
        .event_service
        .create_participant(&req.name, req.code.as_deref(), req.email.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// `POST /events/:id/registrations` — Register a participant and issue a
/// scan token.
///
/// # Errors
///
/// Returns [`GatewayError`] if the event or participant is missing or the
/// participant is already registered.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/registrations",
    tag = "Events",
    summary = "Register a participant",
    description = "Creates the registration and returns the secret token to encode in the participant's QR code.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = RegisterParticipantRequest,
    responses(
        (status = 201, description = "Registration created", body = RegistrationResponse),
        (status = 404, description = "Event or participant not found", body = ErrorResponse),
        (status = 409, description = "Already registered", body = ErrorResponse),
    )
)]
pub async fn register_participant(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RegisterParticipantRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let registration = state
        .event_service
        .register_participant(EventId::from_uuid(id), req.participant_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse::from(registration)),
    ))
}

/// `GET /events/:id/attendance` — Attendance counts.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/attendance",
    tag = "Reports",
    summary = "Attendance summary",
    description = "Registered, attended and absent counts plus scan counts per classification.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Attendance counts", body = AttendanceSummaryResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn attendance_summary(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GatewayError> {
    let event_id = EventId::from_uuid(id);
    let event = state.event_service.get_event(event_id).await?;
    let summary = state.event_service.attendance_summary(event_id).await?;

    Ok(Json(AttendanceSummaryResponse {
        event_id,
        title: event.title,
        absent: summary.registered.saturating_sub(summary.attended),
        summary,
    }))
}

/// `GET /events/:id/attendance/log` — Paginated audit log.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/attendance/log",
    tag = "Reports",
    summary = "Attendance log",
    description = "Every recorded scan for the event, newest first.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        PaginationParams,
    ),
    responses(
        (status = 200, description = "Paginated log", body = AttendanceLogResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn attendance_log(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let params = params.clamped();
    let (data, total) = state
        .event_service
        .attendance_log(
            EventId::from_uuid(id),
            params.offset(),
            u64::from(params.per_page),
        )
        .await?;

    Ok(Json(AttendanceLogResponse {
        data,
        pagination: params.meta(total),
    }))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/{id}", get(get_event))
        .route("/participants", post(create_participant))
        .route("/events/{id}/registrations", post(register_participant))
        .route("/events/{id}/attendance", get(attendance_summary))
        .route("/events/{id}/attendance/log", get(attendance_log))
}
