//! Database row models and their conversion into domain types.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{
    AttendanceLogEntry, Classification, Event, Participant, Registration, RegistrationStatus,
    RejectionCode, ResolvedRegistration,
};
use crate::error::GatewayError;

/// Row from the `events` table.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    /// Event ID.
    pub id: Uuid,
    /// Display title.
    pub title: String,
    /// Listed date.
    pub event_date: NaiveDate,
    /// Window start.
    pub start_at: DateTime<Utc>,
    /// Window end.
    pub end_at: DateTime<Utc>,
    /// On-time threshold in minutes (`CHECK >= 0`).
    pub late_threshold_minutes: i32,
    /// Organizer account.
    pub owner_id: Uuid,
}

impl TryFrom<EventRow> for Event {
    type Error = GatewayError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let late_threshold_minutes = u32::try_from(row.late_threshold_minutes).map_err(|_| {
            GatewayError::PersistenceError(format!(
                "event {} has negative late threshold",
                row.id
            ))
        })?;
        Ok(Self {
            id: row.id.into(),
            title: row.title,
            date: row.event_date,
            start_at: row.start_at,
            end_at: row.end_at,
            late_threshold_minutes,
            owner_id: row.owner_id,
        })
    }
}

/// Row from the `participants` table.
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantRow {
    /// Participant ID.
    pub id: Uuid,
    /// External code.
    pub code: Option<String>,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Self {
            id: row.id.into(),
            code: row.code,
            name: row.name,
            email: row.email,
        }
    }
}

/// Row from the `event_registrations` table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationRow {
    /// Registration ID.
    pub id: Uuid,
    /// Owning event.
    pub event_id: Uuid,
    /// Registered participant.
    pub participant_id: Uuid,
    /// Scan token.
    pub qr_token: String,
    /// `registered` or `attended`.
    pub status: String,
    /// First attendance instant.
    pub first_checked_in_at: Option<DateTime<Utc>>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = GatewayError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<RegistrationStatus>()
            .map_err(GatewayError::PersistenceError)?;
        Ok(Self {
            id: row.id.into(),
            event_id: row.event_id.into(),
            participant_id: row.participant_id.into(),
            qr_token: row.qr_token,
            status,
            first_checked_in_at: row.first_checked_in_at,
        })
    }
}

/// Registration joined with its event and participant, as returned by the
/// token lookup.
#[derive(Debug, Clone, FromRow)]
pub struct ResolvedRow {
    /// Registration columns.
    #[sqlx(flatten)]
    pub registration: RegistrationRow,
    /// Event title.
    pub event_title: String,
    /// Event date.
    pub event_date: NaiveDate,
    /// Event window start.
    pub start_at: DateTime<Utc>,
    /// Event window end.
    pub end_at: DateTime<Utc>,
    /// Event on-time threshold.
    pub late_threshold_minutes: i32,
    /// Event owner.
    pub owner_id: Uuid,
    /// Participant code.
    pub participant_code: Option<String>,
    /// Participant name.
    pub participant_name: String,
    /// Participant email.
    pub participant_email: Option<String>,
}

impl TryFrom<ResolvedRow> for ResolvedRegistration {
    type Error = GatewayError;

    fn try_from(row: ResolvedRow) -> Result<Self, Self::Error> {
        let event = Event::try_from(EventRow {
            id: row.registration.event_id,
            title: row.event_title,
            event_date: row.event_date,
            start_at: row.start_at,
            end_at: row.end_at,
            late_threshold_minutes: row.late_threshold_minutes,
            owner_id: row.owner_id,
        })?;
        let participant = Participant::from(ParticipantRow {
            id: row.registration.participant_id,
            code: row.participant_code,
            name: row.participant_name,
            email: row.participant_email,
        });
        Ok(Self {
            registration: Registration::try_from(row.registration)?,
            event,
            participant,
        })
    }
}

/// Row from the `attendance_logs` table.
#[derive(Debug, Clone, FromRow)]
pub struct LogEntryRow {
    /// Entry ID.
    pub id: Uuid,
    /// Registration the scan resolved to.
    pub registration_id: Uuid,
    /// Scan instant.
    pub checked_at: DateTime<Utc>,
    /// Classification label.
    pub classification: String,
    /// Device label.
    pub device_label: Option<String>,
    /// Handling account.
    pub handled_by: Option<Uuid>,
    /// Wire code of an audited rejection.
    pub rejection_code: Option<String>,
    /// Checkpoint event of an audited rejection.
    pub checkpoint_event_id: Option<Uuid>,
    /// Insert timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LogEntryRow> for AttendanceLogEntry {
    type Error = GatewayError;

    fn try_from(row: LogEntryRow) -> Result<Self, Self::Error> {
        let classification = row
            .classification
            .parse::<Classification>()
            .map_err(GatewayError::PersistenceError)?;
        let rejection = row
            .rejection_code
            .as_deref()
            .map(str::parse::<RejectionCode>)
            .transpose()
            .map_err(GatewayError::PersistenceError)?;
        Ok(Self {
            id: row.id.into(),
            registration_id: row.registration_id.into(),
            checked_at: row.checked_at,
            classification,
            device_label: row.device_label,
            handled_by: row.handled_by.map(Into::into),
            rejection,
            checkpoint_event_id: row.checkpoint_event_id.map(Into::into),
            created_at: row.created_at,
        })
    }
}

/// Log entry joined with participant display fields.
#[derive(Debug, Clone, FromRow)]
pub struct LogEntryViewRow {
    /// Entry columns.
    #[sqlx(flatten)]
    pub entry: LogEntryRow,
    /// Participant name.
    pub participant_name: String,
    /// Participant code.
    pub participant_code: Option<String>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn log_row(rejection_code: Option<&str>) -> LogEntryRow {
        LogEntryRow {
            id: Uuid::new_v4(),
            registration_id: Uuid::new_v4(),
            checked_at: Utc::now(),
            classification: "on_time".to_string(),
            device_label: None,
            handled_by: None,
            rejection_code: rejection_code.map(str::to_string),
            checkpoint_event_id: rejection_code.map(|_| Uuid::new_v4()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn audited_row_keeps_rejection_marker() {
        let Ok(entry) = AttendanceLogEntry::try_from(log_row(Some("WRONG_EVENT"))) else {
            panic!("row should convert");
        };
        assert_eq!(entry.rejection, Some(RejectionCode::WrongEvent));
        assert!(entry.checkpoint_event_id.is_some());
        assert_eq!(entry.classification, Classification::OnTime);
    }

    #[test]
    fn plain_row_has_no_marker() {
        let Ok(entry) = AttendanceLogEntry::try_from(log_row(None)) else {
            panic!("row should convert");
        };
        assert!(!entry.is_rejected());
    }

    #[test]
    fn unknown_rejection_code_is_persistence_error() {
        assert!(matches!(
            AttendanceLogEntry::try_from(log_row(Some("LOST"))),
            Err(GatewayError::PersistenceError(_))
        ));
    }
}
