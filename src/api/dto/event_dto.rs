//! Event, participant, registration and report DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::{EventId, ParticipantId, Registration, RegistrationId, RegistrationStatus};
use crate::persistence::{AttendanceSummary, LogEntryView};

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Display title.
    pub title: String,
    /// Listed date. Defaults to the date of `start_at`.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Window start (ISO-8601).
    pub start_at: DateTime<Utc>,
    /// Window end (ISO-8601).
    pub end_at: DateTime<Utc>,
    /// Minutes after the start that still count as on time.
    #[serde(default)]
    pub late_threshold_minutes: u32,
    /// Organizer account.
    pub owner_id: uuid::Uuid,
}

/// Request body for `POST /participants`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateParticipantRequest {
    /// Display name.
    pub name: String,
    /// Optional external code.
    #[serde(default)]
    pub code: Option<String>,
    /// Optional contact email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for `POST /events/{id}/registrations`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterParticipantRequest {
    /// Participant to register.
    pub participant_id: ParticipantId,
}

/// Response body for `POST /events/{id}/registrations` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResponse {
    /// Registration identifier.
    pub registration_id: RegistrationId,
    /// Event identifier.
    pub event_id: EventId,
    /// Participant identifier.
    pub participant_id: ParticipantId,
    /// Secret scan token to encode in the participant's QR code.
    pub qr_token: String,
    /// Registration status.
    pub status: RegistrationStatus,
}

impl From<Registration> for RegistrationResponse {
    fn from(r: Registration) -> Self {
        Self {
            registration_id: r.id,
            event_id: r.event_id,
            participant_id: r.participant_id,
            qr_token: r.qr_token,
            status: r.status,
        }
    }
}

/// Response body for `GET /events/{id}/attendance`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceSummaryResponse {
    /// Event identifier.
    pub event_id: EventId,
    /// Event title.
    pub title: String,
    /// Registrations without a recorded attendance.
    pub absent: u64,
    /// Counts.
    #[serde(flatten)]
    pub summary: AttendanceSummary,
}

/// Response body for `GET /events/{id}/attendance/log`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceLogResponse {
    /// Log entries, newest first.
    pub data: Vec<LogEntryView>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
